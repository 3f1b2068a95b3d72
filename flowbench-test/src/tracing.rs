use tracing_subscriber::EnvFilter;

const CRATE_NAMES: &[&str] = &[
    "flowbench",
    "flowbench_client",
    "flowbench_provision",
    "stresstest",
];

/// Installs a test subscriber showing the logs of the flowbench crates.
///
/// Provisioning steps report which API key was reused or created and which flow was created
/// only through `tracing`. With this subscriber, those lines show up in the output of a failing
/// test, captured per test by the test runner. Everything outside the flowbench crates is
/// limited to errors. Calling it more than once is fine.
///
/// # Example
///
/// ```
/// flowbench_test::tracing::init();
/// flowbench_test::tracing::init();
/// ```
pub fn init() {
    let mut env_filter = EnvFilter::new("ERROR");

    for name in CRATE_NAMES {
        env_filter = env_filter.add_directive(format!("{name}=TRACE").parse().unwrap());
    }

    tracing_subscriber::fmt::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_test_writer()
        .compact()
        .try_init()
        .ok();
}
