use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use creditbank_adapters::ConfigBackendConfig;
use creditbank_service::{build_router, ServiceSettings, ServiceState};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BANK_ID: &str = "bank-vbank";
const PASSWORD: &str = "0123456789";
const VALID_QUERY: &str = "amountInEuros=10000&termInMonths=6&ratingLevel=A&delayInMilliseconds=0&username=LoanBrokerGruppe01&password=0123456789";

fn app(server: &MockServer, max_retries: u32) -> Router {
    let address = server.address();
    let mut settings = ServiceSettings::default();
    settings.bank.id = BANK_ID.to_string();
    settings.bank.name = "vbank".to_string();
    settings.config_backend = ConfigBackendConfig {
        host: address.ip().to_string(),
        port: address.port(),
        max_retries,
        backoff_initial_ms: 0,
        ..ConfigBackendConfig::default()
    };

    let state = ServiceState::bootstrap(&settings).unwrap();
    build_router(state, &settings.server.api_version)
}

fn bank() -> Value {
    json!({
        "_id": BANK_ID,
        "name": "vbank",
        "thumbnailUrl": null,
        "isAsync": false,
        "isActive": true,
        "creditConfiguration": {
            "minAmountInEuros": 10000,
            "maxAmountInEuros": 50000,
            "minTermInMonths": 6,
            "maxTermInMonths": 36,
            "minSchufaRating": "A",
            "maxSchufaRating": "P"
        }
    })
}

fn group(index: u32, vbank: u64) -> Value {
    json!({
        "_id": format!("group-{index:02}"),
        "username": format!("LoanBrokerGruppe{index:02}"),
        "password": PASSWORD,
        "jmsQueue": format!("queue{index:02}"),
        "students": [],
        "stats": { "schufa": 3, "vbank": vbank, "jmsBankA": 1 },
        "hasPassed": false
    })
}

async fn mount_bank(server: &MockServer, expected_reads: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/banks/{BANK_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(bank()))
        .expect(expected_reads)
        .mount(server)
        .await;
}

async fn get(app: Router, query: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/credit?{query}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn valid_request_is_quoted_and_counted() {
    let server = MockServer::start().await;
    mount_bank(&server, 2).await;
    Mock::given(method("GET"))
        .and(path("/v1/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            group(1, 7),
            group(2, 0),
            group(3, 0)
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/groups/group-01"))
        .and(body_json(group(1, 8)))
        .respond_with(ResponseTemplate::new(200).set_body_json(group(1, 8)))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(app(&server, 2), VALID_QUERY).await;

    assert_eq!(status, StatusCode::OK);
    let rate = body["lendingRateInPercent"].as_f64().unwrap();
    assert!((0.0..10.0).contains(&rate));
}

#[tokio::test]
async fn missing_password_never_reaches_groups() {
    let server = MockServer::start().await;
    mount_bank(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let query = VALID_QUERY.replace("&password=0123456789", "");
    let (status, body) = get(app(&server, 2), &query).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reasons"], json!(["password is required"]));
    assert_eq!(body["status"], "BAD_REQUEST");
    assert_eq!(body["code"], 400);
    assert!(body["dateTime"].is_string());
}

#[tokio::test]
async fn out_of_range_values_report_bank_bounds() {
    let server = MockServer::start().await;
    mount_bank(&server, 1).await;

    let query = VALID_QUERY
        .replace("amountInEuros=10000", "amountInEuros=9999")
        .replace("ratingLevel=A", "ratingLevel=Z");
    let (status, body) = get(app(&server, 2), &query).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let reasons = body["reasons"].as_array().unwrap();
    assert_eq!(reasons.len(), 2);
    assert!(reasons[0].as_str().unwrap().starts_with("amountInEuros"));
    assert!(reasons[1].as_str().unwrap().starts_with("ratingLevel"));
}

#[tokio::test]
async fn bank_without_credit_configuration_is_not_found() {
    let server = MockServer::start().await;
    let mut bank = bank();
    bank.as_object_mut().unwrap().remove("creditConfiguration");
    Mock::given(method("GET"))
        .and(path(format!("/v1/banks/{BANK_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(bank))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(app(&server, 2), VALID_QUERY).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reasons"], json!(["[creditConfiguration not found]"]));
}

#[tokio::test]
async fn bank_missing_from_group_stats_is_internal_error() {
    let server = MockServer::start().await;
    mount_bank(&server, 2).await;
    let mut stray = group(1, 0);
    stray["stats"] = json!({ "schufa": 3 });
    Mock::given(method("GET"))
        .and(path("/v1/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stray])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = get(app(&server, 2), VALID_QUERY).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["reasons"], json!(["bank not found in stats"]));
}

#[tokio::test]
async fn rejected_backend_call_is_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/banks/{BANK_ID}")))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let (status, _) = get(app(&server, 2), VALID_QUERY).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn unavailable_backend_is_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/banks/{BANK_ID}")))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let (status, body) = get(app(&server, 2), VALID_QUERY).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn failed_group_update_returns_no_quote() {
    let server = MockServer::start().await;
    mount_bank(&server, 2).await;
    Mock::given(method("GET"))
        .and(path("/v1/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([group(1, 0)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/groups/group-01"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let (status, body) = get(app(&server, 1), VALID_QUERY).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.get("lendingRateInPercent").is_none());
}
