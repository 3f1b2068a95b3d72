use std::io;
use std::path::PathBuf;

use anyhow::Result;
use argh::FromArgs;

use crate::config::Config;
use crate::{healthcheck, observability, provision, report};

/// Langflow benchmark fixture provisioner.
#[derive(Debug, FromArgs)]
struct Args {
    /// path to the YAML configuration file
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,

    #[argh(subcommand)]
    pub command: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
enum Command {
    Provision(ProvisionCommand),
    Healthcheck(HealthcheckCommand),
    Version(VersionCommand),
}

/// create the benchmark api key and flow, and print their identifiers
///
/// On success, exactly two marker lines are written to standard output. Everything else goes to
/// standard error.
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "provision")]
struct ProvisionCommand {}

/// check that the configured Langflow instance is healthy
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "healthcheck")]
struct HealthcheckCommand {}

/// print the flowbench version
#[derive(Default, Debug, FromArgs)]
#[argh(subcommand, name = "version")]
struct VersionCommand {}

/// Bootstrap the runtime and execute the CLI command.
pub fn execute() -> Result<()> {
    let args: Args = argh::from_env();

    // Special switch to just print the version and exit.
    if let Command::Version(_) = args.command {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load(args.config.as_deref())?;

    // Sentry should be initialized before creating the async runtime.
    let _sentry_guard = observability::init_sentry(&config);

    // All requests are sequential, a single thread is enough.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let _runtime_guard = runtime.enter();

    observability::init_tracing(&config);
    tracing::debug!(?config);

    runtime.block_on(async move {
        match args.command {
            Command::Provision(ProvisionCommand {}) => {
                let data = provision::run(&config).await.inspect_err(|error| {
                    sentry::capture_error(error);
                })?;
                report::write_markers(&mut io::stdout().lock(), &data)?;
                Ok(())
            }
            Command::Healthcheck(HealthcheckCommand {}) => healthcheck::healthcheck(&config).await,
            Command::Version(VersionCommand {}) => unreachable!(),
        }
    })
}
