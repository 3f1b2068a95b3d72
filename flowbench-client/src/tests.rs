use std::time::Duration;

use flowbench_test::server::{ACCESS_TOKEN, Endpoint, MockTarget, SUPERUSER, SUPERUSER_PASSWORD};
use flowbench_types::flow::{FlowData, NewFlow, RunRequest};
use serde_json::json;

use super::*;

async fn login(server: &MockTarget) -> Session {
    let client = Client::builder(server.url("/")).build().unwrap();
    client.login(SUPERUSER, SUPERUSER_PASSWORD).await.unwrap()
}

fn empty_flow(name: &str) -> NewFlow {
    NewFlow {
        name: name.into(),
        description: None,
        data: FlowData::default(),
    }
}

#[tokio::test]
async fn logs_in_with_password_grant() {
    let server = MockTarget::new().await;
    let session = login(&server).await;

    assert_eq!(server.hits(Endpoint::Login), 1);
    let form = &server.bodies(Endpoint::Login)[0];
    assert_eq!(form["username"], SUPERUSER);
    assert_eq!(form["grant_type"], "password");

    assert!(!format!("{session:?}").contains(ACCESS_TOKEN));
}

#[tokio::test]
async fn rejected_login_surfaces_status() {
    let server = MockTarget::new().await;
    let client = Client::builder(server.url("/")).build().unwrap();

    let err = client.login(SUPERUSER, "wrong").await.unwrap_err();
    let Error::Status { status, body } = err else {
        panic!("expected status error, got {err:?}");
    };
    assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
    assert!(body.contains("Incorrect username or password"));
}

#[tokio::test]
async fn login_without_token_is_missing_field() {
    let server = MockTarget::new().await;
    server.respond(Endpoint::Login, 200, json!({ "token_type": "bearer" }));
    let client = Client::builder(server.url("/")).build().unwrap();

    let err = client
        .login(SUPERUSER, SUPERUSER_PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::MissingField {
            field: "access_token"
        }
    ));
}

#[tokio::test]
async fn creates_and_lists_api_keys() {
    let server = MockTarget::new().await;
    let session = login(&server).await;

    assert!(session.list_api_keys().await.unwrap().is_empty());

    let created = session.create_api_key("benchmark_key").await.unwrap();
    assert_eq!(created.name.as_deref(), Some("benchmark_key"));
    let secret = created.secret.unwrap();

    let listed = session.list_api_keys().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].secret.as_deref(), Some(secret.as_str()));
    assert_eq!(
        server.bodies(Endpoint::CreateApiKey),
        vec![json!({ "name": "benchmark_key" })]
    );
}

#[tokio::test]
async fn creates_flow() {
    let server = MockTarget::new().await;
    let session = login(&server).await;

    let created = session.create_flow(&empty_flow("bench")).await.unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(server.bodies(Endpoint::CreateFlow)[0]["name"], "bench");
}

#[tokio::test]
async fn flow_without_id_is_missing_field() {
    let server = MockTarget::new().await;
    server.respond(Endpoint::CreateFlow, 201, json!({ "name": "bench" }));
    let session = login(&server).await;

    let err = session.create_flow(&empty_flow("bench")).await.unwrap_err();
    assert!(matches!(err, Error::MissingField { field: "id" }));
}

#[tokio::test]
async fn malformed_body_is_json_error() {
    let server = MockTarget::new().await;
    server.respond(Endpoint::ListApiKeys, 200, json!("not a listing"));
    let session = login(&server).await;

    let err = session.list_api_keys().await.unwrap_err();
    assert!(matches!(err, Error::Json(_)), "{err:?}");
}

#[tokio::test]
async fn runs_flow_with_api_key() {
    let server = MockTarget::new().await;
    server.seed_api_key("benchmark_key", "key-abc");
    let flow_id = server.seed_flow();
    let client = Client::builder(server.url("/")).build().unwrap();

    let bytes = client
        .run_flow(&flow_id, "key-abc", &RunRequest::default())
        .await
        .unwrap();
    assert!(bytes > 0);
    assert_eq!(server.run_queries(), ["stream=false"]);
    assert_eq!(
        server.bodies(Endpoint::RunFlow)[0]["input_value"],
        "hello from stresstest"
    );

    let err = client
        .run_flow(&flow_id, "wrong", &RunRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Status { status, .. } if status.as_u16() == 403));
}

#[tokio::test]
async fn honors_api_prefix_and_health() {
    let server = MockTarget::new().await;
    let client = Client::builder(server.url("/"))
        .api_prefix("api/v1/")
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    assert_eq!(client.api_prefix(), "/api/v1");
    assert_eq!(
        client.api_url("/flows/").unwrap().as_str(),
        server.url("/api/v1/flows/")
    );

    client.health().await.unwrap();
    assert_eq!(server.hits(Endpoint::Health), 1);
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    let client = Client::builder("http://127.0.0.1:1/")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let err = client.login(SUPERUSER, SUPERUSER_PASSWORD).await.unwrap_err();
    assert!(matches!(err, Error::Reqwest(_)), "{err:?}");
}

#[tokio::test]
async fn foreign_token_is_rejected() {
    let server = MockTarget::new().await;
    let client = Client::builder(server.url("/")).build().unwrap();
    let session = Session::with_token(client, "not-a-token");
    assert_eq!(session.client().api_prefix(), "/api/v1");

    let err = session.list_api_keys().await.unwrap_err();
    assert!(
        matches!(&err, Error::Status { status, .. } if *status == reqwest::StatusCode::UNAUTHORIZED),
        "{err:?}"
    );
    assert_eq!(server.hits(Endpoint::Login), 0);
}
