//! Endpoint contract tests for the sample application.

mod common;

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use rust_sample_app::config::Settings;

/// `1-{8 hex}-{24 hex}`, lowercase.
fn is_xray_trace_id(value: &str) -> bool {
    let lower_hex = |s: &str| {
        s.chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    };
    let parts: Vec<&str> = value.split('-').collect();
    parts.len() == 3
        && parts[0] == "1"
        && parts[1].len() == 8
        && parts[2].len() == 24
        && lower_hex(parts[1])
        && lower_hex(parts[2])
}

async fn fetch_trace_id(client: &reqwest::Client, url: &str) -> String {
    let response = client.get(url).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    body["traceId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn root_returns_confirmation_text() {
    let backend: SocketAddr = "127.0.0.1:28311".parse().unwrap();
    let app: SocketAddr = "127.0.0.1:28312".parse().unwrap();
    common::start_mock_backend(backend).await;
    let shutdown = common::start_sample_server(
        app,
        Settings::default(),
        Arc::new(common::StubStore { fail: false }),
        &format!("http://{backend}"),
    )
    .await;

    let body = reqwest::get(format!("http://{app}/"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "healthcheck");

    shutdown.trigger();
}

#[tokio::test]
async fn outgoing_http_call_returns_distinct_trace_ids() {
    let backend: SocketAddr = "127.0.0.1:28321".parse().unwrap();
    let app: SocketAddr = "127.0.0.1:28322".parse().unwrap();
    let hits = common::start_mock_backend(backend).await;
    let shutdown = common::start_sample_server(
        app,
        Settings::default(),
        Arc::new(common::StubStore { fail: false }),
        &format!("http://{backend}"),
    )
    .await;

    let client = reqwest::Client::new();
    let url = format!("http://{app}/outgoing-http-call");
    let first = fetch_trace_id(&client, &url).await;
    let second = fetch_trace_id(&client, &url).await;

    assert!(is_xray_trace_id(&first), "malformed trace id {first:?}");
    assert!(is_xray_trace_id(&second), "malformed trace id {second:?}");
    assert_ne!(first, second, "trace ids must be distinct per request");
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    shutdown.trigger();
}

#[tokio::test]
async fn aws_sdk_call_returns_trace_id() {
    let backend: SocketAddr = "127.0.0.1:28331".parse().unwrap();
    let app: SocketAddr = "127.0.0.1:28332".parse().unwrap();
    common::start_mock_backend(backend).await;
    let shutdown = common::start_sample_server(
        app,
        Settings::default(),
        Arc::new(common::StubStore { fail: false }),
        &format!("http://{backend}"),
    )
    .await;

    let client = reqwest::Client::new();
    let trace_id = fetch_trace_id(&client, &format!("http://{app}/aws-sdk-call")).await;
    assert!(is_xray_trace_id(&trace_id));

    shutdown.trigger();
}

#[tokio::test]
async fn failed_outbound_call_yields_server_error_and_process_survives() {
    let app: SocketAddr = "127.0.0.1:28341".parse().unwrap();
    // Nothing listens on the external target: the fetch fails outright.
    let shutdown = common::start_sample_server(
        app,
        Settings::default(),
        Arc::new(common::StubStore { fail: true }),
        "http://127.0.0.1:28342",
    )
    .await;

    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{app}/outgoing-http-call"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_server_error());

    let response = client
        .get(format!("http://{app}/aws-sdk-call"))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_server_error());

    // The failures stayed scoped to their requests.
    let body = client
        .get(format!("http://{app}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "healthcheck");

    shutdown.trigger();
}

#[tokio::test]
async fn fan_out_without_ports_issues_one_fallback_call() {
    let backend: SocketAddr = "127.0.0.1:28351".parse().unwrap();
    let app: SocketAddr = "127.0.0.1:28352".parse().unwrap();
    let hits = common::start_mock_backend(backend).await;
    let shutdown = common::start_sample_server(
        app,
        Settings::default(),
        Arc::new(common::StubStore { fail: false }),
        &format!("http://{backend}"),
    )
    .await;

    let client = reqwest::Client::new();
    let url = format!("http://{app}/outgoing-sampleapp");
    let first = fetch_trace_id(&client, &url).await;
    assert!(is_xray_trace_id(&first));
    assert_eq!(hits.load(Ordering::SeqCst), 1, "exactly one fallback call");

    let second = fetch_trace_id(&client, &url).await;
    assert_ne!(first, second, "parent trace id is distinct per request");

    shutdown.trigger();
}

#[tokio::test]
async fn fan_out_calls_configured_ports_in_listed_order() {
    let downstream_a: SocketAddr = "127.0.0.1:28361".parse().unwrap();
    let downstream_b: SocketAddr = "127.0.0.1:28362".parse().unwrap();
    let backend: SocketAddr = "127.0.0.1:28363".parse().unwrap();
    let app: SocketAddr = "127.0.0.1:28364".parse().unwrap();

    let call_log = Arc::new(Mutex::new(Vec::new()));
    common::start_downstream_backend(downstream_a, call_log.clone()).await;
    common::start_downstream_backend(downstream_b, call_log.clone()).await;
    let external_hits = common::start_mock_backend(backend).await;

    let settings = Settings {
        sample_app_ports: vec![downstream_a.port(), downstream_b.port()],
        ..Settings::default()
    };
    let shutdown = common::start_sample_server(
        app,
        settings,
        Arc::new(common::StubStore { fail: false }),
        &format!("http://{backend}"),
    )
    .await;

    let client = reqwest::Client::new();
    let trace_id = fetch_trace_id(&client, &format!("http://{app}/outgoing-sampleapp")).await;
    assert!(is_xray_trace_id(&trace_id));

    let calls = call_log.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![downstream_a.port(), downstream_b.port()],
        "downstream calls must be sequential, in listed order"
    );
    assert_eq!(
        external_hits.load(Ordering::SeqCst),
        0,
        "no fallback call when ports are configured"
    );

    shutdown.trigger();
}
