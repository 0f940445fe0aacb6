//! HTTP surface of the interactive server, driven over a real socket.

use schemamap::layout::LayoutFuture;
use schemamap::server::{AppState, PageOptions, router};
use schemamap::{
    DisplayOptions, LayoutBackend, LayoutEngine, LayoutSettings, StaticProvider, Voyager,
    VoyagerHandle,
};
use serde_json::{Value, json};
use std::sync::Arc;

/// Two fixed boxes, enough for hit-testing the blog schema.
struct FixedBackend;

impl LayoutBackend for FixedBackend {
    fn layout(&self, _dot: String) -> LayoutFuture {
        Box::pin(async {
            Ok(r#"<svg viewBox="0.00 0.00 300.00 100.00">
<g id="graph0" class="graph" transform="translate(4 96)">
<g id="Query" class="node">
<polygon points="0,-20 0,-80 100,-80 100,-20 0,-20"/>
</g>
<g id="User" class="node">
<polygon points="200,-20 200,-80 290,-80 290,-20 200,-20"/>
</g>
<g id="FIELD_EDGE::Query::user::User" class="edge">
<path fill="none" stroke="black" d="M100,-50C140,-50 160,-50 200,-50"/>
</g>
</g>
</svg>
"#
            .to_string())
        })
    }
}

async fn start() -> (String, VoyagerHandle) {
    let blog: Value = serde_json::from_str(include_str!("fixtures/blog.json")).unwrap();
    let engine = LayoutEngine::spawn(Arc::new(FixedBackend), LayoutSettings::default());
    let handle = Voyager::spawn(
        Arc::new(StaticProvider::new(blog)),
        engine,
        DisplayOptions::default(),
    );
    handle
        .wait_for(|s| s.render.is_some() && !s.rendering)
        .await
        .unwrap();

    let page = PageOptions {
        endpoint_url: Some("https://api.example.com/graphql".to_string()),
        ..Default::default()
    };
    let app = router(Arc::new(AppState {
        handle: handle.clone(),
        page,
    }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base, handle)
}

#[tokio::test]
async fn test_index_serves_page() {
    let (base, _handle) = start().await;

    let response = reqwest::get(&base).await.unwrap();
    assert!(response.status().is_success());
    let body = response.text().await.unwrap();
    assert!(body.contains("<title>https://api.example.com/graphql</title>"));
    assert!(body.contains("new EventSource('/api/events')"));
}

#[tokio::test]
async fn test_snapshot_reports_render() {
    let (base, _handle) = start().await;

    let snapshot: Value = reqwest::get(format!("{}/api/snapshot", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(snapshot["state"]["status"], "ready");
    assert_eq!(snapshot["render"]["width"], 300.0);
    assert_eq!(snapshot["graph"]["metadata"]["root"], "Query");
    assert!(snapshot["render"]["markup"].as_str().unwrap().contains("<svg"));
    assert!(snapshot["viewport"]["transform"]["zoom"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_click_selects_edge_and_source() {
    let (base, handle) = start().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/click", base))
        .json(&json!({ "id": "FIELD_EDGE::Query::user::User" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

    let snapshot = handle
        .wait_for(|s| s.selection.selected_edge_id.is_some())
        .await
        .unwrap();
    assert_eq!(snapshot.selection.selected_type_id.as_deref(), Some("Query"));

    // Background clicks leave the selection alone
    client
        .post(format!("{}/api/click", base))
        .json(&json!({ "id": "graph0" }))
        .send()
        .await
        .unwrap();
    let after = handle.snapshot();
    assert_eq!(after.selection.selected_type_id.as_deref(), Some("Query"));
}

#[tokio::test]
async fn test_options_patch_rerenders() {
    let (base, handle) = start().await;
    let before = handle.snapshot().render.as_ref().unwrap().generation;

    let response = reqwest::Client::new()
        .post(format!("{}/api/options", base))
        .json(&json!({ "hideRoot": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

    let snapshot = handle
        .wait_for(|s| {
            s.options.hide_root
                && !s.rendering
                && s.render.as_ref().is_some_and(|r| r.generation != before)
        })
        .await
        .unwrap();
    assert!(!snapshot.render.as_ref().unwrap().graph().contains_node("Query"));
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let (base, _handle) = start().await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/zoom", base))
        .json(&json!({ "factor": "big" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}
