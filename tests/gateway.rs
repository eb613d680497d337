//! End-to-end tests for the audited gateway.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use strapi_hook::GatewayConfig;

mod common;

use common::{client, start_gateway, start_mock_target, start_slow_target, MemorySink};

fn config_for(target: SocketAddr) -> GatewayConfig {
    GatewayConfig {
        target: format!("http://{}/api", target),
        ..GatewayConfig::default()
    }
}

#[tokio::test]
async fn test_post_json_is_relayed_and_audited() {
    let (target, received) = start_mock_target(201, r#"{"ok":true}"#).await;
    let sink = Arc::new(MemorySink::default());
    let (gateway, shutdown) = start_gateway(config_for(target), sink.clone()).await;

    let payload = r#"{"event":"entry.create","model":"article","entry":{"id":3}}"#;
    let res = client()
        .post(format!("http://{}/strapi?source=cms", gateway))
        .header("content-type", "application/json")
        .header("user-agent", "strapi-webhook")
        .body(payload)
        .send()
        .await
        .expect("Gateway unreachable");

    assert_eq!(res.status(), 201);
    assert_eq!(res.headers().get("x-target").unwrap(), "mock");
    assert_eq!(res.text().await.unwrap(), r#"{"ok":true}"#);

    let received = received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(&received[0].body[..], payload.as_bytes());
    assert_eq!(received[0].headers.get("x-forwarded-for").unwrap(), "127.0.0.1");

    let records = sink.records.lock().unwrap().clone();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.method, "POST");
    assert_eq!(record.url, "/strapi?source=cms");
    assert_eq!(record.host, gateway.to_string());
    assert_eq!(record.user_agent, "strapi-webhook");
    assert_eq!(record.protocol, "HTTP/1.1");
    assert_eq!(record.remote_ip, "127.0.0.1");
    assert_eq!(record.server_ip, "127.0.0.1");
    assert_eq!(record.status, StatusCode::CREATED);
    assert_eq!(&record.request_body[..], payload.as_bytes());
    assert_eq!(&record.response_body[..], br#"{"ok":true}"#);

    shutdown.trigger();
}

#[tokio::test]
async fn test_non_json_body_is_relayed_unchanged() {
    let (target, received) = start_mock_target(200, "{}").await;
    let sink = Arc::new(MemorySink::default());
    let (gateway, shutdown) = start_gateway(config_for(target), sink.clone()).await;

    let res = client()
        .post(format!("http://{}/strapi", gateway))
        .body("id=3&event=\"publish\"")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let received = received.lock().unwrap().clone();
    assert_eq!(&received[0].body[..], b"id=3&event=\"publish\"");

    let records = sink.records.lock().unwrap().clone();
    assert_eq!(&records[0].request_body[..], br#""id=3&event=\"publish\"""#);

    shutdown.trigger();
}

#[tokio::test]
async fn test_rejected_methods_are_audited() {
    let (target, received) = start_mock_target(200, "{}").await;
    let sink = Arc::new(MemorySink::default());
    let (gateway, shutdown) = start_gateway(config_for(target), sink.clone()).await;
    let url = format!("http://{}/strapi", gateway);
    let client = client();

    for res in [
        client.get(&url).send().await.unwrap(),
        client.put(&url).send().await.unwrap(),
        client.delete(&url).send().await.unwrap(),
    ] {
        assert_eq!(res.status(), 403);
        assert_eq!(res.text().await.unwrap(), "Forbidden\n");
    }

    let res = client.patch(&url).send().await.unwrap();
    assert_eq!(res.status(), 501);
    assert_eq!(res.text().await.unwrap(), "Not Implemented\n");

    assert!(received.lock().unwrap().is_empty());

    let records = sink.records.lock().unwrap().clone();
    let statuses: Vec<u16> = records.iter().map(|r| r.status.as_u16()).collect();
    assert_eq!(statuses, vec![403, 403, 403, 501]);
    assert_eq!(&records[0].response_body[..], b"Forbidden\n");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_target_is_bad_gateway() {
    let unused = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let sink = Arc::new(MemorySink::default());
    let (gateway, shutdown) = start_gateway(config_for(unused), sink.clone()).await;

    let res = client()
        .post(format!("http://{}/strapi", gateway))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);

    let records = sink.records.lock().unwrap().clone();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, StatusCode::BAD_GATEWAY);

    shutdown.trigger();
}

#[tokio::test]
async fn test_custom_path() {
    let (target, _) = start_mock_target(200, "{}").await;
    let sink = Arc::new(MemorySink::default());
    let config = GatewayConfig {
        path: "/hooks".into(),
        ..config_for(target)
    };
    let (gateway, shutdown) = start_gateway(config, sink.clone()).await;
    let client = client();

    let res = client.post(format!("http://{}/hooks", gateway)).body("{}").send().await.unwrap();
    assert_eq!(res.status(), 200);

    let res = client.post(format!("http://{}/strapi", gateway)).body("{}").send().await.unwrap();
    assert_eq!(res.status(), 404);

    assert_eq!(sink.records.lock().unwrap().len(), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_never_reaches_target() {
    let (target, received) = start_mock_target(200, "{}").await;
    let sink = Arc::new(MemorySink::default());
    let mut config = config_for(target);
    config.limits.max_body_size = 1024;
    let (gateway, shutdown) = start_gateway(config, sink.clone()).await;

    let res = client()
        .post(format!("http://{}/strapi", gateway))
        .body("x".repeat(4096))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 413);
    assert!(received.lock().unwrap().is_empty());

    let records = sink.records.lock().unwrap().clone();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(sink.errors.lock().unwrap().len(), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_deadline_is_audited() {
    let target = start_slow_target(Duration::from_secs(3)).await;
    let sink = Arc::new(MemorySink::default());
    let mut config = config_for(target);
    config.timeouts.request_secs = 1;
    config.timeouts.upstream_secs = 5;
    let (gateway, shutdown) = start_gateway(config, sink.clone()).await;

    let res = client()
        .post(format!("http://{}/strapi", gateway))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 408);

    let records = sink.records.lock().unwrap().clone();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(&records[0].request_body[..], b"{}");

    shutdown.trigger();
}
