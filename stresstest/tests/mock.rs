use std::time::Duration;

use flowbench_test::server::{Endpoint, MockTarget};
use flowbench_types::BenchmarkData;
use stresstest::Workload;
use stresstest::http::HttpRemote;

const DURATION: Duration = Duration::from_millis(300);

#[tokio::test]
async fn test_runs_flow_with_key() {
    let server = MockTarget::new().await;
    server.seed_api_key("benchmark_key", "sk-seeded");
    let flow_id = server.seed_flow();

    let target = BenchmarkData::new(flow_id, "sk-seeded").unwrap();
    let remote = HttpRemote::new(&server.url("/")).unwrap().with_target(target);
    assert_eq!(remote.metric_name(), "/api/v1/run/[flow_id]");

    let workload = Workload::builder("test").users(2).build();
    let summary = stresstest::run(remote, vec![workload], DURATION)
        .await
        .unwrap();

    assert!(summary.successes > 0, "{summary:?}");
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.skipped, 0);
    assert_eq!(server.hits(Endpoint::RunFlow) as u64, summary.successes);

    let body = &server.bodies(Endpoint::RunFlow)[0];
    assert_eq!(body["input_value"], "hello from stresstest");
}

#[tokio::test]
async fn test_counts_rejected_requests() {
    let server = MockTarget::new().await;
    let flow_id = server.seed_flow();

    let target = BenchmarkData::new(flow_id, "sk-unknown").unwrap();
    let remote = HttpRemote::new(&server.url("/")).unwrap().with_target(target);

    let workload = Workload::builder("test").users(1).build();
    let summary = stresstest::run(remote, vec![workload], DURATION)
        .await
        .unwrap();

    assert_eq!(summary.successes, 0);
    assert!(summary.failures > 0, "{summary:?}");
}

#[tokio::test]
async fn test_skips_without_target() {
    let server = MockTarget::new().await;
    let remote = HttpRemote::new(&server.url("/")).unwrap();
    assert!(!remote.has_target());

    let workloads = vec![
        Workload::builder("a").users(2).build(),
        Workload::builder("b").users(1).input_value("ping").build(),
    ];
    let summary = stresstest::run(remote, workloads, DURATION).await.unwrap();

    assert!(summary.skipped > 0, "{summary:?}");
    assert_eq!(summary.successes + summary.failures, 0);
    assert_eq!(server.total_hits(), 0);
}
