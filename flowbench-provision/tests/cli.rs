//! Runs the `flowbench` binary against the mock service and checks its output contract.

use std::process::Output;

use flowbench_test::server::{ACCESS_TOKEN, Endpoint, MockTarget, SUPERUSER, SUPERUSER_PASSWORD};
use serde_json::json;
use tokio::process::Command;

const FLOWBENCH_EXE: &str = env!("CARGO_BIN_EXE_flowbench");

async fn provision(vars: &[(&str, &str)]) -> Output {
    Command::new(FLOWBENCH_EXE)
        .arg("provision")
        .env_clear()
        .env("FLOWBENCH__LOGGING__FORMAT", "simplified")
        .envs(vars.iter().copied())
        .output()
        .await
        .expect("Failed to run flowbench")
}

#[tokio::test]
async fn test_prints_exactly_two_marker_lines() {
    let server = MockTarget::new().await;
    let url = server.url("/");

    let output = provision(&[
        ("LANGFLOW_URL", url.as_str()),
        ("LANGFLOW_SUPERUSER", SUPERUSER),
        ("LANGFLOW_SUPERUSER_PASSWORD", SUPERUSER_PASSWORD),
    ])
    .await;

    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "{stdout}");
    assert!(lines[0].starts_with("BENCHMARK_DATA:FLOW_ID="));
    assert_eq!(lines[1], "BENCHMARK_DATA:API_KEY=sk-mock-1");

    let data = flowbench_types::BenchmarkData::parse(&stdout).unwrap();
    assert_eq!(data.api_key(), "sk-mock-1");
}

#[tokio::test]
async fn test_rejected_login_fails_with_diagnostic() {
    let server = MockTarget::new().await;
    let url = server.url("/");

    let output = provision(&[
        ("LANGFLOW_URL", url.as_str()),
        ("LANGFLOW_SUPERUSER", SUPERUSER),
        ("LANGFLOW_SUPERUSER_PASSWORD", "wrong"),
    ])
    .await;

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error: login failed"), "{stderr}");
    assert!(!stderr.contains("wrong"), "{stderr}");
}

#[tokio::test]
async fn test_missing_credentials() {
    let server = MockTarget::new().await;
    let url = server.url("/");

    let output = provision(&[("LANGFLOW_URL", url.as_str())]).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert_eq!(server.total_hits(), 0);

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("missing superuser credentials"), "{stderr}");
}

#[tokio::test]
async fn test_scripted_end_to_end_output() {
    let server = MockTarget::new().await;
    server.respond(Endpoint::CreateApiKey, 200, json!({ "api_key": "key-abc" }));
    server.respond(Endpoint::CreateFlow, 201, json!({ "id": "flow-xyz" }));
    let url = server.url("/");

    let output = provision(&[
        ("LANGFLOW_URL", url.as_str()),
        ("LANGFLOW_SUPERUSER", SUPERUSER),
        ("LANGFLOW_SUPERUSER_PASSWORD", SUPERUSER_PASSWORD),
    ])
    .await;

    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "BENCHMARK_DATA:FLOW_ID=flow-xyz\nBENCHMARK_DATA:API_KEY=key-abc\n"
    );
}

#[tokio::test]
async fn test_key_without_secret_fails() {
    let server = MockTarget::new().await;
    server.respond(Endpoint::CreateApiKey, 200, json!({ "name": "benchmark_key" }));
    let url = server.url("/");

    let output = provision(&[
        ("LANGFLOW_URL", url.as_str()),
        ("LANGFLOW_SUPERUSER", SUPERUSER),
        ("LANGFLOW_SUPERUSER_PASSWORD", SUPERUSER_PASSWORD),
    ])
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error: could not obtain credential value"), "{stderr}");
}

#[tokio::test]
async fn test_numeric_password_is_sent_verbatim() {
    let server = MockTarget::new().await;
    server.respond(Endpoint::Login, 200, json!({ "access_token": ACCESS_TOKEN }));
    let url = server.url("/");

    let output = provision(&[
        ("LANGFLOW_URL", url.as_str()),
        ("LANGFLOW_SUPERUSER", "1000"),
        ("LANGFLOW_SUPERUSER_PASSWORD", "007"),
    ])
    .await;

    assert!(output.status.success(), "{output:?}");

    let form = &server.bodies(Endpoint::Login)[0];
    assert_eq!(form["username"], "1000");
    assert_eq!(form["password"], "007");
}
