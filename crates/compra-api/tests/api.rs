use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use compra_api::{create_router, AppConfig, AppState, CredentialStrategy};
use compra_core::{InMemoryTransactionStore, PurchaseWorkflow, TransactionStore};
use compra_gateway::{GatewayConfig, HttpPaymentGateway};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    router: Router,
    store: Arc<InMemoryTransactionStore>,
    _gateway: MockServer,
}

async fn gateway_answering(status: u16, body: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment/process"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    server
}

async fn app_with(config: AppConfig, gateway: MockServer) -> TestApp {
    let store = Arc::new(InMemoryTransactionStore::new());
    let client = HttpPaymentGateway::new(
        GatewayConfig::new(gateway.uri()).with_timeout(Duration::from_secs(2)),
    )
    .unwrap();

    let workflow = PurchaseWorkflow::new(store.clone(), Arc::new(client));
    let router = create_router(AppState::new(config, workflow));

    TestApp {
        router,
        store,
        _gateway: gateway,
    }
}

async fn app(gateway_status: u16) -> TestApp {
    let gateway = gateway_answering(gateway_status, json!({"ok": gateway_status < 400})).await;
    app_with(AppConfig::default(), gateway).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_accepted_purchase_is_processing() {
    let app = app(200).await;

    let (status, body) = send(
        &app.router,
        post_json("/api/compra", json!({"Cedula": "1001", "Precio_total": 100.5})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "PROCESSING");
    assert_eq!(body["data"]["cedula"], "1001");
    assert_eq!(body["data"]["amount"], 100.5);
    assert_eq!(body["data"]["paymentGateway"]["status"], 200);
    assert!(body.get("warnings").is_none());

    let id: Uuid = body["data"]["transactionId"].as_str().unwrap().parse().unwrap();
    let stored = app.store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.status.as_str(), "PROCESSING");
}

#[tokio::test]
async fn test_rejected_purchase_is_failed() {
    let app = app(500).await;

    let (status, body) = send(
        &app.router,
        post_json("/api/compra", json!({"Cedula": 1001, "Precio_total": "25"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Payment gateway error");
    assert_eq!(body["data"]["status"], "FAILED");
    assert_eq!(
        body["data"]["paymentGateway"]["error"],
        "Request failed with status code 500"
    );

    let id: Uuid = body["data"]["transactionId"].as_str().unwrap().parse().unwrap();
    let stored = app.store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.status.as_str(), "FAILED");
}

#[tokio::test]
async fn test_invalid_purchases_write_nothing() {
    let app = app(200).await;

    let cases = [
        (json!({"Precio_total": 10}), "Missing required fields"),
        (json!({"Cedula": "", "Precio_total": 10}), "Missing required fields"),
        (json!({"Cedula": "12a4", "Precio_total": 10}), "Invalid Cedula format"),
        (
            json!({"Cedula": "9".repeat(300), "Precio_total": 10}),
            "Invalid Cedula format",
        ),
        (json!({"Cedula": "1001", "Precio_total": -3}), "Invalid price"),
        (json!({"Cedula": "1001", "Precio_total": "abc"}), "Invalid price"),
        (
            json!({"Cedula": "1001", "Precio_total": 10, "Bank": "x"}),
            "Invalid bank details",
        ),
    ];

    for (input, expected) in cases {
        let (status, body) = send(&app.router, post_json("/api/compra", input.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "input: {}", input);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], expected, "input: {}", input);
        assert!(body["timestamp"].is_string());
    }

    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app(200).await;

    let request = Request::post("/api/compra")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"Cedula\": "))
        .unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_transaction_lookup() {
    let app = app(200).await;

    let (_, created) = send(
        &app.router,
        post_json("/api/compra", json!({"Cedula": "42", "Precio_total": 9.99})),
    )
    .await;
    let id = created["data"]["transactionId"].as_str().unwrap().to_string();

    let uri = format!("/api/transaction/{}", id);
    let (status, first) = send(&app.router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "Transaction found");
    assert_eq!(first["data"]["transactionId"], id.as_str());
    assert_eq!(first["data"]["status"], "PROCESSING");
    assert_eq!(first["data"]["amount"], 9.99);

    // Lookups do not change anything
    let (_, second) = send(&app.router, get(&uri)).await;
    assert_eq!(first["data"], second["data"]);
}

#[tokio::test]
async fn test_unknown_transaction_is_not_found() {
    let app = app(200).await;

    for id in [Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let (status, body) = send(&app.router, get(&format!("/api/transaction/{}", id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Transaction not found");
        assert_eq!(
            body["message"],
            format!("No transaction found with ID: {}", id)
        );
    }
}

#[tokio::test]
async fn test_unknown_route_lists_endpoints() {
    let app = app(200).await;

    let (status, body) = send(&app.router, get("/api/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
    assert_eq!(body["path"], "/api/nope");
    assert_eq!(body["method"], "GET");
    let endpoints = body["available_endpoints"].as_array().unwrap();
    assert!(endpoints.contains(&json!("POST /api/compra")));
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let app = app(200).await;

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "SAMEORIGIN");

    let (_, body) = send(&app.router, get("/health")).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "development");
}

#[tokio::test]
async fn test_gateway_probes() {
    let app = app(200).await;

    let (status, body) = send(&app.router, get("/api/test/payment-gateway")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Payment gateway is reachable and responding");
    assert_eq!(body["gateway"]["status"], 200);

    let (status, body) = send(
        &app.router,
        post_json("/api/test/payment-gateway", json!({"Cedula": "555"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["test"]["input"]["Cedula"], "555");
    assert_eq!(body["test"]["input"]["Precio_total"], 100.0);

    let (status, _) = send(
        &app.router,
        post_json("/api/test/payment-gateway", json!({"Cedula": "5x5"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Probes never persist anything
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_gateway_probe_reports_failure() {
    let app = app(503).await;

    let (status, body) = send(&app.router, get("/api/test/payment-gateway")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Payment gateway connection failed");
}

#[tokio::test]
async fn test_database_and_status_probes() {
    let app = app(200).await;

    let (status, body) = send(&app.router, get("/api/test/database")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"]["transaction_count"], 0);
    assert!(body["database"]["pool"].is_object());

    let (status, body) = send(&app.router, get("/api/test/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["system"]["environment"], "development");
    assert!(body["system"]["payment_gateway_url"].is_string());
}

#[tokio::test]
async fn test_bearer_token_required_when_enabled() {
    let config = AppConfig {
        auth: CredentialStrategy::BearerToken("s3cret".into()),
        ..AppConfig::default()
    };
    let app = app_with(config, gateway_answering(200, json!({"ok": true})).await).await;
    let body = json!({"Cedula": "1001", "Precio_total": 10});

    let (status, resp) = send(&app.router, post_json("/api/compra", body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp["error"], "Authentication required");

    let mut request = post_json("/api/compra", body.clone());
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer wrong".parse().unwrap());
    let (status, resp) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(resp["error"], "Invalid token");
    assert!(app.store.is_empty());

    let mut request = post_json("/api/compra", body);
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, "Bearer s3cret".parse().unwrap());
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::CREATED);

    // Health stays open
    let (status, _) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit() {
    let config = AppConfig {
        rate_limit_max: 2,
        ..AppConfig::default()
    };
    let app = app_with(config, gateway_answering(200, json!({"ok": true})).await).await;

    for _ in 0..2 {
        let (status, _) = send(&app.router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
}
