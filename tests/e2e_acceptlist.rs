//! E2E tests for the accept list endpoints

mod common;

use common::TestServer;
use serde_json::json;

const ACCEPT_LIST: &str = "/services/orb/acceptlist";

async fn post(server: &TestServer, body: &str) -> reqwest::Response {
    server
        .client
        .post(server.url(ACCEPT_LIST))
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_add_and_read_by_type() {
    let server = TestServer::new().await;

    let response = post(
        &server,
        r#"[
            {"type": "follow", "add": ["https://domain1.com", "https://domain2.com"]},
            {"type": "invite-witness", "add": ["https://domain3.com"]}
        ]"#,
    )
    .await;
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().is_empty());

    let follow = server
        .get_json(&format!("{ACCEPT_LIST}?type=follow"))
        .await;
    assert_eq!(
        follow,
        json!({
            "type": "follow",
            "url": ["https://domain1.com/", "https://domain2.com/"]
        })
    );
}

#[tokio::test]
async fn test_read_all() {
    let server = TestServer::new().await;

    post(
        &server,
        r#"[
            {"type": "follow", "add": ["https://domain1.com"]},
            {"type": "invite-witness", "add": ["https://domain2.com"]}
        ]"#,
    )
    .await;

    let all = server.get_json(ACCEPT_LIST).await;
    assert_eq!(
        all,
        json!([
            {"type": "follow", "url": ["https://domain1.com/"]},
            {"type": "invite-witness", "url": ["https://domain2.com/"]}
        ])
    );
}

#[tokio::test]
async fn test_add_is_idempotent_and_remove_applies() {
    let server = TestServer::new().await;

    let body = r#"[{"type": "follow", "add": ["https://domain1.com", "https://domain2.com"]}]"#;
    assert_eq!(post(&server, body).await.status(), 200);
    assert_eq!(post(&server, body).await.status(), 200);

    let response = post(
        &server,
        r#"[{"type": "follow", "remove": ["https://domain1.com", "https://unknown.com"]}]"#,
    )
    .await;
    assert_eq!(response.status(), 200);

    let follow = server
        .get_json(&format!("{ACCEPT_LIST}?type=follow"))
        .await;
    assert_eq!(follow["url"], json!(["https://domain2.com/"]));
}

#[tokio::test]
async fn test_null_lists_are_accepted() {
    let server = TestServer::new().await;

    let response = post(
        &server,
        r#"[{"type": "follow", "add": ["https://d1.com"], "remove": null}]"#,
    )
    .await;
    assert_eq!(response.status(), 200);

    let follow = server
        .get_json(&format!("{ACCEPT_LIST}?type=follow"))
        .await;
    assert_eq!(follow["url"], json!(["https://d1.com/"]));
}

#[tokio::test]
async fn test_unknown_type_reads_empty() {
    let server = TestServer::new().await;

    let body = server
        .get_json(&format!("{ACCEPT_LIST}?type=unknown"))
        .await;

    assert_eq!(body, json!({"type": "unknown", "url": []}));
}

#[tokio::test]
async fn test_read_all_when_empty() {
    let server = TestServer::new().await;

    let body = server.get_json(ACCEPT_LIST).await;

    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let server = TestServer::new().await;

    let response = post(&server, "{not json").await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_invalid_entries_are_bad_request() {
    let server = TestServer::new().await;

    for body in [
        r#"[{"type": "", "add": ["https://domain1.com"]}]"#,
        r#"[{"type": "follow", "add": ["not a url"]}]"#,
    ] {
        let response = post(&server, body).await;
        assert_eq!(response.status(), 400, "body: {body}");
    }
}

#[tokio::test]
async fn test_invalid_batch_applies_nothing() {
    let server = TestServer::new().await;

    let response = post(
        &server,
        r#"[
            {"type": "follow", "add": ["https://domain1.com"]},
            {"type": "follow", "add": ["://bad"]}
        ]"#,
    )
    .await;
    assert_eq!(response.status(), 400);

    let all = server.get_json(ACCEPT_LIST).await;
    assert_eq!(all, json!([]));
}
