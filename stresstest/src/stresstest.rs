//! Run workloads concurrently against the benchmark flow and print metrics.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use sketches_ddsketch::DDSketch;
use tokio::sync::Semaphore;
use yansi::Paint;

use crate::http::HttpRemote;
use crate::workload::Workload;

/// Pause of a virtual user after a skipped iteration.
const SKIP_INTERVAL: Duration = Duration::from_millis(10);

/// Request counts of a finished stresstest, summed over all workloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Requests answered with a success status.
    pub successes: u64,
    /// Requests that failed, including timeouts.
    pub failures: u64,
    /// Iterations that did not send a request because no target was configured.
    pub skipped: u64,
}

/// Runs the given workloads concurrently against the remote.
///
/// The function runs all workloads concurrently until `duration` elapsed, waits for outstanding
/// requests and then prints metrics per workload and in total.
pub async fn run(
    remote: HttpRemote,
    workloads: Vec<Workload>,
    duration: Duration,
) -> Result<Summary> {
    let remote = Arc::new(remote);
    let metric_name = remote.metric_name();

    let bar = ProgressBar::new_spinner()
        .with_style(ProgressStyle::with_template("{spinner} {msg} {elapsed}")?)
        .with_message("Running stresstest:");
    bar.enable_steady_tick(Duration::from_millis(100));

    // run the workloads concurrently
    let tasks: Vec<_> = workloads
        .into_iter()
        .map(|workload| {
            let remote = Arc::clone(&remote);
            tokio::spawn(run_workload(remote, workload, duration))
        })
        .collect();

    let finished_tasks = futures::future::join_all(tasks).await;
    bar.finish_and_clear();

    let mut total_metrics = WorkloadMetrics::default();
    for task in finished_tasks {
        let (workload, metrics) = task?;

        println!();
        println!(
            "{} {} (users: {})",
            "## Workload".bold(),
            workload.name.bold().blue(),
            workload.users.bold()
        );
        print_metrics(&metric_name, &metrics, duration);

        total_metrics.merge(&metrics)?;
    }

    println!();
    println!("{}", "## TOTALS".bold());
    print_metrics(&metric_name, &total_metrics, duration);
    println!();

    Ok(Summary {
        successes: total_metrics.successes,
        failures: total_metrics.failures,
        skipped: total_metrics.skipped,
    })
}

async fn run_workload(
    remote: Arc<HttpRemote>,
    workload: Workload,
    duration: Duration,
) -> (Workload, WorkloadMetrics) {
    let semaphore = Arc::new(Semaphore::new(workload.users));
    let deadline = tokio::time::Instant::now() + duration;

    let request = Arc::new(workload.request.clone());
    let metrics = Arc::new(Mutex::new(WorkloadMetrics::default()));

    // See <https://docs.rs/tokio/latest/tokio/time/struct.Sleep.html#examples>
    let sleep = tokio::time::sleep_until(deadline);
    tokio::pin!(sleep);

    loop {
        if deadline.elapsed() > Duration::ZERO {
            break;
        }
        tokio::select! {
            permit = semaphore.clone().acquire_owned() => {
                let remote = Arc::clone(&remote);
                let request = Arc::clone(&request);
                let metrics = Arc::clone(&metrics);

                let task = async move {
                    let start = Instant::now();
                    match remote.run(&request).await {
                        Some(Ok(bytes)) => {
                            let mut metrics = metrics.lock().unwrap();
                            metrics.timing.add(start.elapsed().as_secs_f64());
                            metrics.bytes_received += bytes;
                            metrics.successes += 1;
                        }
                        Some(Err(err)) => {
                            eprintln!("error running flow: {err}");
                            let mut metrics = metrics.lock().unwrap();
                            metrics.failures += 1;
                            if err.is_timeout() {
                                metrics.timeouts += 1;
                            }
                        }
                        None => {
                            metrics.lock().unwrap().skipped += 1;
                            tokio::time::sleep(SKIP_INTERVAL).await;
                        }
                    }
                    drop(permit);
                };
                tokio::spawn(task);
            }
            _ = &mut sleep => {
                break;
            }
        }
    }

    // by acquiring *all* the permits, we essentially wait for all outstanding requests to finish
    let _permits = semaphore.acquire_many(workload.users as u32).await;

    let metrics: WorkloadMetrics = {
        let mut metrics = metrics.lock().unwrap();
        std::mem::take(&mut metrics)
    };

    (workload, metrics)
}

fn print_metrics(name: &str, metrics: &WorkloadMetrics, duration: Duration) {
    let requests = metrics.successes + metrics.failures;
    if requests > 0 {
        print!("{} ({} ops", format!("{name}:").bold().green(), requests.bold());
        if metrics.failures > 0 {
            let failures = format!("{} FAILURES", metrics.failures);
            print!(", {}", failures.bold().red());
            if metrics.timeouts > 0 {
                print!(" ({} timeouts)", metrics.timeouts);
            }
        }
        println!(")");
    }

    if metrics.timing.count() > 0 {
        print_ops(&metrics.timing, duration);
        print_throughput(metrics.bytes_received, duration);
        print_percentiles(&metrics.timing, Duration::from_secs_f64);
    }

    if metrics.skipped > 0 {
        println!(
            "{}",
            format!("{} SKIPPED (no flow id or api key)", metrics.skipped)
                .bold()
                .yellow()
        );
    }
}

fn print_percentiles<T: fmt::Debug>(sketch: &DDSketch, map: impl Fn(f64) -> T) {
    let quantile = |q| map(sketch.quantile(q).ok().flatten().unwrap_or_default());

    let ops = sketch.count();
    let avg = map(sketch.sum().unwrap_or_default() / ops as f64);
    let p50 = quantile(0.5);
    let p90 = quantile(0.9);
    let p99 = quantile(0.99);
    println!(
        "  avg: {:.2?}; p50: {p50:.2?}; p90: {p90:.2?}; p99: {p99:.2?}",
        avg.bold()
    );
}

fn print_ops(sketch: &DDSketch, duration: Duration) {
    let ops = sketch.count();
    let ops_ps = ops as f64 / duration.as_secs_f64();
    print!("  {:.2} operations/s", ops_ps.bold());
}

fn print_throughput(total: u64, duration: Duration) {
    let throughput = (total as f64 / duration.as_secs_f64()) as u64;
    println!(", {} response bytes/s", throughput.bold());
}

#[derive(Default)]
struct WorkloadMetrics {
    timing: DDSketch,
    bytes_received: u64,

    successes: u64,
    failures: u64,
    timeouts: u64,
    skipped: u64,
}

impl WorkloadMetrics {
    fn merge(&mut self, other: &Self) -> Result<()> {
        self.timing.merge(&other.timing)?;
        self.bytes_received += other.bytes_received;
        self.successes += other.successes;
        self.failures += other.failures;
        self.timeouts += other.timeouts;
        self.skipped += other.skipped;
        Ok(())
    }
}
