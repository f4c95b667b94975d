use crate::helpers::spawn_app;
use serde_json::{json, Value};

#[tokio::test]
async fn news_is_an_empty_list_before_any_feed_is_ingested() {
    let app = spawn_app().await;
    let response = app.get("/api/news", None).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn news_is_served_verbatim_without_credentials() {
    let app = spawn_app().await;
    let news = json!([
        {"title": "Riksdagen röstar", "category": "politik", "link": "https://example.com/1"},
        {"title": "Ny forskning", "category": "vetenskap", "link": "https://example.com/2"},
    ]);
    app.documents.set("news", &news).await.unwrap();

    let response = app.get("/api/news", None).await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.json::<Value>().await.unwrap(), news);
}

#[tokio::test]
async fn malformed_news_returns_500_with_an_error() {
    let app = spawn_app().await;
    tokio::fs::create_dir_all(app.documents.directory()).await.unwrap();
    tokio::fs::write(app.documents.directory().join("news.json"), "[{")
        .await
        .unwrap();

    let response = app.get("/api/news", None).await;
    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}
