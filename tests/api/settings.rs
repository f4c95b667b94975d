use crate::helpers::spawn_app;
use omvarldskollen::routes::MAX_BODY_BYTES;
use serde_json::{json, Value};

#[tokio::test]
async fn update_settings_with_the_shared_secret_replaces_the_document() {
    let app = spawn_app().await;
    app.documents
        .set("settings", &json!({"lang": "en", "categories": ["tech"]}))
        .await
        .unwrap();

    let response = app.admin_post("/api/update-settings", &json!({"lang": "sv"})).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].is_string());

    let settings: Value = app.get("/api/settings", None).await.json().await.unwrap();
    assert_eq!(settings, json!({"lang": "sv"}));
}

#[tokio::test]
async fn update_settings_rejects_missing_or_wrong_credentials() {
    let app = spawn_app().await;
    let bearer = format!("Bearer {}", app.shared_secret);
    let test_cases = vec![
        (None, "no credential"),
        (Some("not-the-secret"), "a wrong credential"),
        (Some(bearer.as_str()), "a bearer-style credential"),
    ];
    for (credential, description) in test_cases {
        let response = app
            .post("/api/update-settings", &json!({"lang": "sv"}), credential)
            .await;
        assert_eq!(
            401,
            response.status().as_u16(),
            "The API did not fail with 401 when the request carried {}",
            description
        );
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    let settings: Value = app.get("/api/settings", None).await.json().await.unwrap();
    assert_eq!(settings, json!([]), "Settings changed without authorization");
}

#[tokio::test]
async fn unauthorized_callers_get_401_even_with_a_broken_body() {
    let app = spawn_app().await;
    let response = app
        .api_client
        .post(&format!("{}/api/update-settings", app.address))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn update_settings_with_invalid_json_returns_400() {
    let app = spawn_app().await;
    let response = app
        .api_client
        .post(&format!("{}/api/update-settings", app.address))
        .header("Authorization", &app.shared_secret)
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn an_oversized_body_is_rejected_with_the_error_envelope() {
    let app = spawn_app().await;
    let oversized = json!({ "lang": "x".repeat(MAX_BODY_BYTES) });

    let response = app.post("/api/update-settings", &oversized, None).await;
    assert_eq!(response.status().as_u16(), 401);

    let response = app.admin_post("/api/update-settings", &oversized).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("larger than"));

    let settings: Value = app.get("/api/settings", None).await.json().await.unwrap();
    assert_eq!(settings, json!([]));
}
