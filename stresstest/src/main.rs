//! This is a stresstest binary which runs [`Workload`]s against the run endpoint of a
//! benchmark flow.
//!
//! The flow identifier and API key are taken from the `FLOW_ID` and `API_KEY` environment
//! variables. Alternatively, the marker lines printed by `flowbench provision` can be passed
//! with `--data`, either as a file or as `-` for standard input:
//!
//! ```sh
//! flowbench provision | stresstest -c stresstest.yaml --data -
//! ```
//!
//! Without identifiers, the test still runs but skips every iteration.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use argh::FromArgs;
use flowbench_client::Client;
use flowbench_types::BenchmarkData;
use stresstest::Workload;
use stresstest::http::HttpRemote;

use crate::config::Config;

mod config;

/// Load generator for the Langflow benchmark flow
#[derive(Debug, FromArgs)]
pub struct Args {
    /// path to the yaml configuration file
    #[argh(option, short = 'c')]
    pub config: PathBuf,

    /// file with the marker lines of `flowbench provision`, or `-` for stdin
    #[argh(option)]
    pub data: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();

    let config_file = std::fs::File::open(&args.config).context("failed to open config file")?;
    let config: Config =
        serde_yaml::from_reader(config_file).context("failed to parse config YAML")?;

    let mut client = Client::builder(config.remote.as_str());
    if let Some(api_prefix) = config.api_prefix {
        client = client.api_prefix(api_prefix);
    }
    let mut remote = HttpRemote::with_client(client.build().context("invalid remote")?);

    match load_target(args.data.as_deref())? {
        Some(target) => remote = remote.with_target(target),
        None => eprintln!("FLOW_ID or API_KEY not set, all iterations will be skipped"),
    }

    let workloads = config
        .workloads
        .into_iter()
        .map(|w| {
            let mut builder = Workload::builder(w.name).users(w.users);
            if let Some(input_value) = w.input_value {
                builder = builder.input_value(input_value);
            }
            builder.build()
        })
        .collect();

    stresstest::run(remote, workloads, config.duration).await?;

    Ok(())
}

/// Reads the flow identifier and API key from the environment or the marker lines.
fn load_target(data: Option<&Path>) -> anyhow::Result<Option<BenchmarkData>> {
    let var = |name| std::env::var(name).unwrap_or_default();
    if let Some(target) = BenchmarkData::new(var("FLOW_ID"), var("API_KEY")) {
        return Ok(Some(target));
    }

    let Some(path) = data else {
        return Ok(None);
    };

    let output = if path == Path::new("-") {
        let mut output = String::new();
        std::io::stdin()
            .read_to_string(&mut output)
            .context("failed to read marker lines from stdin")?;
        output
    } else {
        std::fs::read_to_string(path).context("failed to read marker lines")?
    };

    let target = BenchmarkData::parse(&output).context("invalid marker lines")?;
    Ok(Some(target))
}
