use crate::helpers::{spawn_app_with, TestApp};
use omvarldskollen::configuration::RegistryBackendKind;
use secrecy::Secret;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn spawn_app_on_sheet(mock_server: &MockServer, token: Option<&str>) -> TestApp {
    let base_url = mock_server.uri();
    let token = token.map(|t| Secret::new(t.to_string()));
    spawn_app_with(move |c| {
        c.registry.backend = RegistryBackendKind::Spreadsheet;
        c.registry.spreadsheet.base_url = base_url;
        c.registry.spreadsheet.spreadsheet_id = "sheet-id".into();
        c.registry.spreadsheet.sheet_name = "Subscribers".into();
        c.registry.spreadsheet.sheet_id = 0;
        c.registry.spreadsheet.access_token = token;
        c.registry.spreadsheet.access_token_file = None;
    })
    .await
}

async fn mount_sheet(mock_server: &MockServer, rows: Value) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/v4/spreadsheets/sheet-id/values/.+$"))
        .and(header("Authorization", "Bearer sheet-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Subscribers!A1:C",
            "majorDimension": "ROWS",
            "values": rows,
        })))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn subscribe_appends_a_row_to_the_sheet() {
    let mock_server = MockServer::start().await;
    mount_sheet(&mock_server, json!([["name", "email", "categories"]])).await;
    Mock::given(method("POST"))
        .and(path_regex(r":append$"))
        .and(body_json(json!({
            "range": "Subscribers!A1:C",
            "majorDimension": "ROWS",
            "values": [["A", "a@x.com", "tech, sport"]],
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    let app = spawn_app_on_sheet(&mock_server, Some("sheet-token")).await;

    let response = app
        .post_subscriptions(&json!({
            "name": "A",
            "email": "a@x.com",
            "categories": ["tech", "sport"],
        }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn the_first_subscriber_of_an_empty_sheet_lands_below_a_new_header() {
    let mock_server = MockServer::start().await;
    mount_sheet(&mock_server, json!([])).await;
    Mock::given(method("PUT"))
        .and(body_json(json!({
            "range": "Subscribers!A1:C2",
            "majorDimension": "ROWS",
            "values": [["name", "email", "categories"], ["A", "a@x.com", "tech"]],
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    let app = spawn_app_on_sheet(&mock_server, Some("sheet-token")).await;

    let response = app
        .post_subscriptions(&json!({
            "name": "A",
            "email": "a@x.com",
            "categories": ["tech"],
        }))
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn listing_follows_the_header_of_a_reordered_sheet() {
    let mock_server = MockServer::start().await;
    mount_sheet(
        &mock_server,
        json!([
            ["Email", "Categories", "Name"],
            ["a@x.com", "tech", "A"],
        ]),
    )
    .await;
    let app = spawn_app_on_sheet(&mock_server, Some("sheet-token")).await;

    let subscribers = app.subscribers().await;
    assert_eq!(
        subscribers,
        vec![json!({"name": "A", "email": "a@x.com", "categories": ["tech"]})]
    );
}

#[tokio::test]
async fn subscribe_does_not_append_an_email_already_in_the_sheet() {
    let mock_server = MockServer::start().await;
    mount_sheet(
        &mock_server,
        json!([["name", "email", "categories"], ["A", "a@x.com", "tech"]]),
    )
    .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    let app = spawn_app_on_sheet(&mock_server, Some("sheet-token")).await;

    let response = app
        .post_subscriptions(&json!({
            "name": "B",
            "email": "A@X.COM",
            "categories": ["sport"],
        }))
        .await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn listing_splits_the_categories_cell() {
    let mock_server = MockServer::start().await;
    mount_sheet(
        &mock_server,
        json!([
            ["name", "email", "categories"],
            ["A", "a@x.com", "tech,  sport, "],
            ["B", "b@x.com", ""],
        ]),
    )
    .await;
    let app = spawn_app_on_sheet(&mock_server, Some("sheet-token")).await;

    let subscribers = app.subscribers().await;
    assert_eq!(
        subscribers,
        vec![
            json!({"name": "A", "email": "a@x.com", "categories": ["tech", "sport"]}),
            json!({"name": "B", "email": "b@x.com", "categories": []}),
        ]
    );
}

#[tokio::test]
async fn update_rewrites_the_row_of_the_subscriber() {
    let mock_server = MockServer::start().await;
    mount_sheet(
        &mock_server,
        json!([
            ["name", "email", "categories"],
            ["A", "a@x.com", "tech"],
            ["B", "b@x.com", "tech"],
        ]),
    )
    .await;
    Mock::given(method("PUT"))
        .and(body_json(json!({
            "range": "Subscribers!A3:C3",
            "majorDimension": "ROWS",
            "values": [["Bee", "bee@x.com", "culture"]],
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    let app = spawn_app_on_sheet(&mock_server, Some("sheet-token")).await;

    let response = app
        .admin_post(
            "/api/update-subscriber",
            &json!({
                "old_email": "b@X.com",
                "name": "Bee",
                "email": "bee@x.com",
                "categories": ["culture"],
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn delete_removes_the_row_of_the_subscriber() {
    let mock_server = MockServer::start().await;
    mount_sheet(
        &mock_server,
        json!([
            ["name", "email", "categories"],
            ["A", "a@x.com", "tech"],
            ["B", "b@x.com", "tech"],
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet-id:batchUpdate"))
        .and(body_json(json!({
            "requests": [{"deleteDimension": {"range": {
                "sheetId": 0, "dimension": "ROWS", "startIndex": 1, "endIndex": 2
            }}}]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    let app = spawn_app_on_sheet(&mock_server, Some("sheet-token")).await;

    let response = app
        .admin_post("/api/delete-subscriber", &json!({"email": "A@x.com"}))
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn delete_of_an_email_missing_from_the_sheet_returns_404() {
    let mock_server = MockServer::start().await;
    mount_sheet(&mock_server, json!([["name", "email", "categories"]])).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    let app = spawn_app_on_sheet(&mock_server, Some("sheet-token")).await;

    let response = app
        .admin_post("/api/delete-subscriber", &json!({"email": "a@x.com"}))
        .await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn missing_sheet_credentials_return_500() {
    let mock_server = MockServer::start().await;
    let app = spawn_app_on_sheet(&mock_server, None).await;

    let response = app.admin_get("/api/subscribers").await;
    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "No credentials are configured for the spreadsheet service."
    );
}

#[tokio::test]
async fn a_failing_sheet_returns_500() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    let app = spawn_app_on_sheet(&mock_server, Some("sheet-token")).await;

    let response = app.admin_get("/api/subscribers-csv").await;
    assert_eq!(response.status().as_u16(), 500);
}
