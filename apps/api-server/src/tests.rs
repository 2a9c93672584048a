use std::sync::{Arc, Mutex};

use actix_web::{App, http::StatusCode, test, web};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use uuid::Uuid;

use onboard_core::domain::Coupon;
use onboard_core::ports::{
    BaseRepository, CouponRepository, ErrorReport, ErrorReporter, ReportError, Severity,
};
use onboard_core::{ExceptionRouter, RepoError};
use onboard_infra::{AccessClaims, InMemoryRedemptionRepository, JwtConfig, JwtVerifier};

use crate::handlers;
use crate::middleware::error::{ExceptionRouting, REQUEST_ID_HEADER};
use crate::state::AppState;

#[derive(Default)]
struct RecordingReporter {
    reports: Mutex<Vec<ErrorReport>>,
}

impl RecordingReporter {
    fn reports(&self) -> Vec<ErrorReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn capture_exception(&self, report: ErrorReport) -> Result<(), ReportError> {
        self.reports.lock().unwrap().push(report);
        Ok(())
    }
}

/// Coupon storage that is always down.
struct UnavailableCoupons;

#[async_trait]
impl BaseRepository<Coupon, Uuid> for UnavailableCoupons {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Coupon>, RepoError> {
        Err(RepoError::Unavailable("connection refused".into()))
    }

    async fn save(&self, _coupon: Coupon) -> Result<Coupon, RepoError> {
        Err(RepoError::Unavailable("connection refused".into()))
    }
}

#[async_trait]
impl CouponRepository for UnavailableCoupons {
    async fn list(&self) -> Result<Vec<Coupon>, RepoError> {
        Err(RepoError::Unavailable("connection refused".into()))
    }

    async fn list_available(&self) -> Result<Vec<Coupon>, RepoError> {
        Err(RepoError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
        Err(RepoError::Unavailable("connection refused".into()))
    }
}

const TEST_SECRET: &str = "test-secret";

fn verifier() -> Arc<JwtVerifier> {
    Arc::new(JwtVerifier::new(&JwtConfig {
        secret: TEST_SECRET.to_string(),
        ..JwtConfig::default()
    }))
}

/// Authorization header carrying an access token as the identity provider would sign it.
fn bearer(user_id: Uuid, roles: &[&str]) -> (&'static str, String) {
    let claims = AccessClaims {
        sub: user_id,
        email: "user@example.com".to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        token_type: "access".to_string(),
        iss: JwtConfig::default().issuer,
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();
    ("Authorization", format!("Bearer {token}"))
}

fn new_coupon(code: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/coupons")
        .insert_header(bearer(Uuid::new_v4(), &["staff"]))
        .set_json(json!({"code": code, "description": "Created in tests"}))
}

macro_rules! init_app {
    ($state:expr, $reporter:expr) => {
        test::init_service(
            App::new()
                .wrap(ExceptionRouting::new(Arc::new(ExceptionRouter::new(
                    $reporter.clone(),
                ))))
                .app_data(web::Data::new($state))
                .configure(handlers::configure_routes),
        )
        .await
    };
}

fn setup() -> (AppState, Arc<RecordingReporter>) {
    let state = AppState::in_memory(verifier());
    (state, Arc::new(RecordingReporter::default()))
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);

    let req = test::TestRequest::get().uri("/api/nope").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"code": "not_found", "message": "Requested resource was not found."})
    );
    assert!(reporter.reports().is_empty());
}

#[actix_web::test]
async fn test_client_request_id_is_echoed() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header((REQUEST_ID_HEADER, "lb-1234"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(REQUEST_ID_HEADER).unwrap(), "lb-1234");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert!(body.get("coupons").is_none());
}

#[actix_web::test]
async fn test_missing_token_is_not_authenticated() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);

    let req = test::TestRequest::get().uri("/api/coupons").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"code": "not_authenticated", "message": "Missing authorization header"})
    );
}

#[actix_web::test]
async fn test_me_returns_identity() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);
    let user_id = Uuid::new_v4();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(user_id, &["user"]))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["id"], user_id.to_string());
    assert_eq!(body["roles"], json!(["user"]));
}

#[actix_web::test]
async fn test_non_staff_cannot_create_coupon() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);

    let req = test::TestRequest::post()
        .uri("/api/coupons")
        .insert_header(bearer(Uuid::new_v4(), &["user"]))
        .set_json(json!({"code": "WELCOME", "description": "Welcome gift"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "code": "permission_denied",
            "message": "Only administrators can create coupons."
        })
    );
}

#[actix_web::test]
async fn test_invalid_coupon_lists_field_errors() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);

    let req = test::TestRequest::post()
        .uri("/api/coupons")
        .insert_header(bearer(Uuid::new_v4(), &["staff"]))
        .set_json(json!({"code": "  ", "description": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "code": "validation_error",
            "message": "Validation error.",
            "errors": {
                "code": ["This field may not be blank."],
                "description": ["This field may not be blank."]
            }
        })
    );
    assert!(reporter.reports().is_empty());
}

#[actix_web::test]
async fn test_duplicate_code_is_validation_error() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);
    let staff = bearer(Uuid::new_v4(), &["staff"]);

    for expected in [StatusCode::CREATED, StatusCode::BAD_REQUEST] {
        let req = test::TestRequest::post()
            .uri("/api/coupons")
            .insert_header(staff.clone())
            .set_json(json!({"code": "spring", "description": "Spring sale"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);

        if expected == StatusCode::BAD_REQUEST {
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["code"], "validation_error");
            assert_eq!(
                body["message"],
                "Integrity violation: coupon code 'SPRING' already exists"
            );
        }
    }
}

#[actix_web::test]
async fn test_malformed_json_is_framework_error() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);

    let req = test::TestRequest::post()
        .uri("/api/redemptions")
        .insert_header(bearer(Uuid::new_v4(), &["user"]))
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "error");
    assert!(!body["message"].as_str().unwrap().is_empty());
    assert!(reporter.reports().is_empty());
}

#[actix_web::test]
async fn test_missing_coupon_uses_default_message() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);

    let req = test::TestRequest::get()
        .uri(&format!("/api/coupons/{}", Uuid::new_v4()))
        .insert_header(bearer(Uuid::new_v4(), &["user"]))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Requested resource was not found.");
}

#[actix_web::test]
async fn test_unparsable_id_is_not_found() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);

    let req = test::TestRequest::get()
        .uri("/api/coupons/not-a-uuid")
        .insert_header(bearer(Uuid::new_v4(), &["user"]))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["message"], "Requested resource was not found.");
}

#[actix_web::test]
async fn test_single_use_coupon_redeems_once() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);
    let user_id = Uuid::new_v4();
    let user = bearer(user_id, &["user"]);

    let req = test::TestRequest::post()
        .uri("/api/coupons")
        .insert_header(bearer(Uuid::new_v4(), &["staff"]))
        .set_json(json!({"code": "ONCE", "description": "One-off"}))
        .to_request();
    let coupon: Value = test::call_and_read_body_json(&app, req).await;
    let coupon_id = coupon["id"].as_str().unwrap().to_string();

    let redeem = || {
        test::TestRequest::post()
            .uri("/api/redemptions")
            .insert_header(user.clone())
            .set_json(json!({"coupon_id": coupon_id}))
            .to_request()
    };

    let resp = test::call_service(&app, redeem()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let redemption: Value = test::read_body_json(resp).await;
    assert_eq!(redemption["coupon"]["code"], "ONCE");

    let resp = test::call_service(&app, redeem()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "code": "validation_error",
            "message": "This coupon can only be redeemed once per user."
        })
    );

    let req = test::TestRequest::get()
        .uri("/api/coupons/balance")
        .insert_header(user.clone())
        .to_request();
    let balance: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(balance[0]["remaining"], 0);

    // Another user cannot see this redemption
    let req = test::TestRequest::get()
        .uri(&format!("/api/redemptions/{}", redemption["id"].as_str().unwrap()))
        .insert_header(bearer(Uuid::new_v4(), &["user"]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/redemptions/recent")
        .to_request();
    let recent: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(recent.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_storage_failure_is_reported_once() {
    let state = AppState {
        coupons: Arc::new(UnavailableCoupons),
        redemptions: Arc::new(InMemoryRedemptionRepository::new()),
        tokens: verifier(),
    };
    let reporter = Arc::new(RecordingReporter::default());
    let app = init_app!(state, reporter);
    let user_id = Uuid::new_v4();

    let req = test::TestRequest::get()
        .uri("/api/coupons")
        .insert_header(bearer(user_id, &["user"]))
        .insert_header((REQUEST_ID_HEADER, "req-42"))
        .insert_header(("user-agent", "onboard-mobile/2.1"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"code": "server_error", "message": "Internal server error."})
    );

    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.severity, Severity::Critical);
    assert_eq!(report.error_type, "RepoError::Unavailable");
    assert_eq!(report.context.request_id.as_deref(), Some("req-42"));
    assert_eq!(report.context.method.as_deref(), Some("GET"));
    assert_eq!(report.context.path.as_deref(), Some("/api/coupons"));
    assert_eq!(report.context.user_id, Some(user_id.to_string()));
    assert_eq!(report.context.extra["user_agent"], "onboard-mobile/2.1");
}

#[actix_web::test]
async fn test_non_staff_cannot_edit_coupon() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);
    let req = new_coupon("EDITME").to_request();
    let coupon: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/coupons/{}", coupon["id"].as_str().unwrap()))
        .insert_header(bearer(Uuid::new_v4(), &["user"]))
        .set_json(json!({"code": "MINE", "description": "Hijacked"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "code": "permission_denied",
            "message": "Only administrators can edit coupons."
        })
    );
}

#[actix_web::test]
async fn test_edit_to_taken_code_is_validation_error() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);
    let staff = bearer(Uuid::new_v4(), &["staff"]);
    let resp = test::call_service(&app, new_coupon("TAKEN").to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let req = new_coupon("FREE").to_request();
    let coupon: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/coupons/{}", coupon["id"].as_str().unwrap());

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(staff.clone())
        .set_json(json!({"available": false}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["code"], "FREE");
    assert_eq!(updated["available"], false);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(staff)
        .set_json(json!({"code": "taken"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "validation_error");
    assert_eq!(
        body["message"],
        "Integrity violation: coupon code 'TAKEN' already exists"
    );
    assert!(reporter.reports().is_empty());
}

#[actix_web::test]
async fn test_only_owner_deletes_redemption() {
    let (state, reporter) = setup();
    let app = init_app!(state, reporter);
    let owner = bearer(Uuid::new_v4(), &["user"]);
    let req = new_coupon("GONE").to_request();
    let coupon: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/redemptions")
        .insert_header(owner.clone())
        .set_json(json!({"coupon_id": coupon["id"]}))
        .to_request();
    let redemption: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/redemptions/{}", redemption["id"].as_str().unwrap());

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(Uuid::new_v4(), &["user"]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({"code": "not_found", "message": "Requested resource was not found."})
    );

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(owner.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&uri).insert_header(owner).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
