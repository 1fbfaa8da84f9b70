use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database};
use serde_json::{Value, json};
use server::ServerConfig;
use tower::ServiceExt;

const EMAIL: &str = "alice@example.com";
const PASSWORD: &str = "correct horse";

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder().database(db).build().await.unwrap();
    server::app(engine, &ServerConfig::default())
}

fn basic(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{password}")))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<String>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn registered_app() -> Router {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "email": EMAIL, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    app
}

fn alice() -> Option<String> {
    Some(basic(EMAIL, PASSWORD))
}

fn multipart_upload(file_name: &str, content: &str) -> Request<Body> {
    let boundary = "dompet-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
Content-Type: application/octet-stream\r\n\r\n\
{content}\r\n\
--{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/api/import")
        .header(header::AUTHORIZATION, basic(EMAIL, PASSWORD))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn protected_routes_require_credentials() {
    let app = registered_app().await;

    let (status, body) = send(&app, "GET", "/api/wallets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let wrong = Some(basic(EMAIL, "wrong horse"));
    let (status, _) = send(&app, "GET", "/api/me", wrong, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let unknown = Some(basic("bob@example.com", PASSWORD));
    let (status, _) = send(&app, "GET", "/api/me", unknown, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_seeds_categories_and_rejects_duplicates() {
    let app = registered_app().await;

    let (status, me) = send(&app, "GET", "/api/me", alice(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], EMAIL);

    let (_, list) = send(&app, "GET", "/api/categories", alice(), None).await;
    assert_eq!(
        list["categories"].as_array().unwrap().len(),
        engine::DEFAULT_CATEGORIES.len()
    );

    let (status, _) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "email": "ALICE@example.com", "password": "another one" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "email": "bob@example.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_category_seed_leaves_no_user_behind() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let app = server::app(engine, &ServerConfig::default());
    db.execute_unprepared(
        "CREATE TRIGGER reject_categories BEFORE INSERT ON categories \
         BEGIN SELECT RAISE(ABORT, 'categories rejected'); END;",
    )
    .await
    .unwrap();

    let register = json!({ "email": EMAIL, "password": PASSWORD });
    let (status, _) = send(&app, "POST", "/api/register", None, Some(register.clone())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = send(&app, "GET", "/api/me", alice(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    db.execute_unprepared("DROP TRIGGER reject_categories;")
        .await
        .unwrap();
    let (status, _) = send(&app, "POST", "/api/register", None, Some(register)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, list) = send(&app, "GET", "/api/categories", alice(), None).await;
    assert_eq!(
        list["categories"].as_array().unwrap().len(),
        engine::DEFAULT_CATEGORIES.len()
    );
}

#[tokio::test]
async fn wallet_and_transaction_lifecycle() {
    let app = registered_app().await;

    let (status, cash) = send(
        &app,
        "POST",
        "/api/wallets",
        alice(),
        Some(json!({ "name": "Cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let cash_id = cash["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/api/wallets",
        alice(),
        Some(json!({ "name": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, categories) = send(&app, "GET", "/api/categories", alice(), None).await;
    let food_id = categories["categories"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Food")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, created) = send(
        &app,
        "POST",
        "/api/transactions",
        alice(),
        Some(json!({
            "type": "expense",
            "amount": "12.50",
            "description": "Lunch",
            "date": "2025-03-10T12:00:00+02:00",
            "categoryId": food_id,
            "walletId": cash_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tx = &created["transactions"][0];
    assert_eq!(tx["amount"], "12.50");
    assert_eq!(tx["type"], "expense");
    let tx_id = tx["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/api/transactions",
        alice(),
        Some(json!({
            "type": "expense",
            "amount": "0",
            "description": "Nothing",
            "date": "2025-03-10T12:00:00Z",
            "categoryId": food_id,
            "walletId": cash_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/transactions/{tx_id}"),
        alice(),
        Some(json!({ "description": "Team lunch" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "Team lunch");

    let (status, _) = send(&app, "DELETE", &format!("/api/wallets/{cash_id}"), alice(), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/transactions/{tx_id}"),
        alice(),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/transactions/{tx_id}"),
        alice(),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/api/wallets/{cash_id}"), alice(), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn transfers_show_up_in_the_dashboard() {
    let app = registered_app().await;

    let (_, cash) = send(&app, "POST", "/api/wallets", alice(), Some(json!({ "name": "Cash" }))).await;
    let (_, bank) = send(&app, "POST", "/api/wallets", alice(), Some(json!({ "name": "Bank" }))).await;
    let (_, categories) = send(&app, "GET", "/api/categories", alice(), None).await;
    let category_id = categories["categories"][0]["id"].clone();

    let (status, created) = send(
        &app,
        "POST",
        "/api/transactions",
        alice(),
        Some(json!({
            "type": "transfer",
            "amount": "100",
            "date": "2025-05-01T09:00:00Z",
            "categoryId": category_id,
            "walletId": cash["id"],
            "destinationWalletId": bank["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let legs = created["transactions"].as_array().unwrap();
    assert_eq!(legs.len(), 2);
    assert_eq!(legs[0]["transferId"], legs[1]["transferId"]);

    let (status, dashboard) = send(
        &app,
        "GET",
        &format!("/api/dashboard?year=2025&month=all&walletId={}", bank["id"].as_str().unwrap()),
        alice(),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["totalIncome"], "100.00");
    assert_eq!(dashboard["totalExpenses"], "0.00");
    assert_eq!(dashboard["monthly"].as_array().unwrap().len(), 12);
    assert_eq!(dashboard["years"], json!([2025]));

    let (status, _) = send(&app, "GET", "/api/dashboard?month=13", alice(), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn import_then_export_csv() {
    let app = registered_app().await;
    send(&app, "POST", "/api/wallets", alice(), Some(json!({ "name": "Cash" }))).await;

    let response = app
        .clone()
        .oneshot(multipart_upload("notes.txt", "hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let csv = "Date,Type,Amount,Description,Category,Wallet\n\
2025-02-01,expense,7.25,Coffee beans,Food,Cash\n\
2025-02-02,expense,3,Mystery,Nope,Cash\n";
    let response = app
        .clone()
        .oneshot(multipart_upload("bank.CSV", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let report: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["imported"], 1);
    assert_eq!(report["errors"], json!(["Row 2: Category \"Nope\" not found"]));

    let request = Request::builder()
        .uri("/api/export?format=csv&year=2025&month=2&walletId=all")
        .header(header::AUTHORIZATION, basic(EMAIL, PASSWORD))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=transactions.csv"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("ID,Date,Type,Amount"));
    assert!(text.contains("Coffee beans"));

    let (status, _) = send(&app, "GET", "/api/export?format=pdf", alice(), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
