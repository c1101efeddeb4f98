use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tubefetch::{
    api::{self, AppState},
    history::HistoryStore,
    network::HttpClient,
    resolver::ResolverClient,
    search::SearchClient,
};
use url::Url;

fn sample_video() -> Value {
    json!({
        "status": true,
        "creator": "X",
        "title": "T",
        "thumbnail": "u1",
        "audio": "u2",
        "videos": {"720": "u3"}
    })
}

async fn resolve(Query(params): Query<HashMap<String, String>>) -> Response {
    let target = params.get("url").cloned().unwrap_or_default();
    if target.contains("missing") {
        (StatusCode::NOT_FOUND, Json(json!({"error": "no such video"}))).into_response()
    } else if target.contains("broken") {
        Json(json!({"status": true, "title": "T"})).into_response()
    } else if target.contains("html") {
        Html("<html><body>Worker exceeded resource limits</body></html>").into_response()
    } else {
        Json(sample_video()).into_response()
    }
}

async fn info(Path(video_id): Path<String>) -> Json<Value> {
    Json(json!({"id": video_id, "formats": [1, 2, 3]}))
}

async fn invidious_search(
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if params.get("q").map(String::as_str) == Some("explode") {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "down"})));
    }
    let items = (0..12)
        .map(|i| {
            json!({
                "type": "video",
                "videoId": format!("vid{i}"),
                "title": format!("result {i}"),
                "author": "Channel",
                "lengthSeconds": 61,
                "viewCount": 1000 + i,
                "videoThumbnails": [{"quality": "high", "url": format!("/vi/vid{i}/hq.jpg")}]
            })
        })
        .collect::<Vec<_>>();
    (StatusCode::OK, Json(Value::Array(items)))
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

struct TestApp {
    base: String,
    client: reqwest::Client,
}

impl TestApp {
    async fn start() -> Self {
        let upstream = spawn(
            Router::new()
                .route("/", get(resolve))
                .route("/api/v1/search", get(invidious_search))
                .route("/:video_id", get(info)),
        )
        .await;
        let upstream_url = Url::parse(&format!("http://{upstream}")).unwrap();

        let http = HttpClient::new();
        let state = AppState::new(
            ResolverClient::new(http.clone(), upstream_url.clone()),
            SearchClient::new(http, upstream_url),
            Arc::new(HistoryStore::new()),
        );
        let addr = spawn(api::router(state)).await;

        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .expect("request");
        (resp.status().as_u16(), resp.json().await.expect("json body"))
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self
            .client
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .expect("request");
        (resp.status().as_u16(), resp.json().await.expect("json body"))
    }

    async fn delete(&self, path: &str) -> (u16, Value) {
        let resp = self
            .client
            .delete(format!("{}{path}", self.base))
            .send()
            .await
            .expect("request");
        (resp.status().as_u16(), resp.json().await.expect("json body"))
    }
}

fn error_fields(body: &Value) -> Vec<String> {
    body["fields"]
        .as_array()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|f| f["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn fetch_returns_resolver_object() {
    let app = TestApp::start().await;
    let (status, body) = app
        .post("/api/youtube/fetch", json!({"url": "https://youtu.be/abc123"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body, sample_video());
}

#[tokio::test]
async fn fetch_rejects_invalid_url() {
    let app = TestApp::start().await;
    let (status, body) = app
        .post("/api/youtube/fetch", json!({"url": "not-a-url"}))
        .await;
    assert_eq!(status, 400);
    assert_eq!(error_fields(&body), vec!["url"]);
    assert!(body["error"].as_str().unwrap().contains("url"));
}

#[tokio::test]
async fn fetch_forwards_upstream_status() {
    let app = TestApp::start().await;
    let (status, body) = app
        .post("/api/youtube/fetch", json!({"url": "https://youtu.be/missing"}))
        .await;
    assert_eq!(status, 404);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn fetch_reports_schema_mismatch_separately() {
    let app = TestApp::start().await;
    let (status, body) = app
        .post("/api/youtube/fetch", json!({"url": "https://youtu.be/broken"}))
        .await;
    assert_eq!(status, 502);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("creator"), "{message}");
}

#[tokio::test]
async fn non_json_resolver_body_is_a_schema_mismatch() {
    let app = TestApp::start().await;
    let (status, body) = app
        .post("/api/youtube/fetch", json!({"url": "https://youtu.be/html"}))
        .await;
    assert_eq!(status, 502);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("not valid JSON"), "{message}");
}

#[tokio::test]
async fn malformed_json_body_is_a_validation_error() {
    let app = TestApp::start().await;
    let resp = app
        .client
        .post(format!("{}/api/youtube/fetch", app.base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(error_fields(&body), vec!["body"]);
}

#[tokio::test]
async fn history_add_then_list() {
    let app = TestApp::start().await;
    let before = Utc::now().timestamp_millis();
    let (status, created) = app
        .post(
            "/api/download-history",
            json!({"title": "T", "thumbnail": "u1", "quality": "720", "downloadUrl": "u3"}),
        )
        .await;
    assert_eq!(status, 200);
    assert!(!created["id"].as_str().unwrap().is_empty());
    let timestamp = created["timestamp"].as_i64().unwrap();
    assert!(timestamp >= before && timestamp - before < 60_000);
    assert_eq!(created["downloadUrl"], "u3");

    let (status, listed) = app.get("/api/download-history").await;
    assert_eq!(status, 200);
    assert_eq!(listed, json!([created]));
}

#[tokio::test]
async fn history_rejects_bad_payload() {
    let app = TestApp::start().await;
    let (status, body) = app
        .post(
            "/api/download-history",
            json!({"title": "T", "thumbnail": "", "quality": "720", "downloadUrl": "u3", "extra": 1}),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(error_fields(&body), vec!["thumbnail", "extra"]);

    let (_, listed) = app.get("/api/download-history").await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn history_delete_then_list_is_empty() {
    let app = TestApp::start().await;
    for quality in ["720", "MP3"] {
        app.post(
            "/api/download-history",
            json!({"title": "T", "thumbnail": "u1", "quality": quality, "downloadUrl": "u3"}),
        )
        .await;
    }
    let (_, listed) = app.get("/api/download-history").await;
    assert_eq!(listed.as_array().unwrap().len(), 2);
    assert_eq!(listed[0]["quality"], "MP3");

    let (status, body) = app.delete("/api/download-history").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"success": true}));

    let (status, listed) = app.get("/api/download-history").await;
    assert_eq!(status, 200);
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn search_caps_results_at_ten() {
    let app = TestApp::start().await;
    let (status, body) = app
        .post("/api/youtube/search", json!({"query": "lofi"}))
        .await;
    assert_eq!(status, 200);
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 10);
    assert_eq!(results[0]["id"], "vid0");
    assert_eq!(results[0]["duration"], "1:01");
    assert_eq!(results[0]["url"], "https://www.youtube.com/watch?v=vid0");
    assert!(results[0].get("channel").is_none());
}

#[tokio::test]
async fn search_requires_query() {
    let app = TestApp::start().await;
    let (status, body) = app.post("/api/youtube/search", json!({"query": ""})).await;
    assert_eq!(status, 400);
    assert_eq!(error_fields(&body), vec!["query"]);
}

#[tokio::test]
async fn alternate_search_route() {
    let app = TestApp::start().await;

    let (status, body) = app.get("/api/search?q=lofi%20beats").await;
    assert_eq!(status, 200);
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 10);
    assert_eq!(results[3]["channel"], "Channel");
    assert_eq!(results[3]["views"], 1003);
    assert!(results[3]["thumbnail"]
        .as_str()
        .unwrap()
        .ends_with("/vi/vid3/hq.jpg"));

    let (status, body) = app.get("/api/search").await;
    assert_eq!(status, 400);
    assert_eq!(error_fields(&body), vec!["q"]);

    let (status, _) = app.get("/api/search?q=explode").await;
    assert_eq!(status, 500);
}

#[tokio::test]
async fn video_info_passes_upstream_json_through() {
    let app = TestApp::start().await;
    let (status, body) = app.get("/api/video-info?videoId=abc123").await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"id": "abc123", "formats": [1, 2, 3]}));

    let (status, body) = app.get("/api/video-info").await;
    assert_eq!(status, 400);
    assert_eq!(error_fields(&body), vec!["videoId"]);
}

#[tokio::test]
async fn health_responds() {
    let app = TestApp::start().await;
    let resp = app
        .client
        .get(format!("{}/health", app.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");
}
