use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Value, json};

use storefront_auth::RoleId;
use storefront_client::storage::keys;
use storefront_client::{
    ApiClient, ApiError, AuthCompletion, AuthFlowError, AuthOutcome, ClientConfig, DurableStorage,
    HistoryNavigator, MemoryStorage, NoticeKind, NoticeLog, PlaceholderDirectory, SessionStore,
    report_error,
};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Stub API on an ephemeral port.
    async fn spawn() -> Self {
        let app = Router::new()
            .route("/auth/me", get(current_user))
            .route("/echo-auth", get(echo_auth))
            .route("/admin/reports", get(forbidden))
            .route("/orders", get(expired))
            .route("/broken", get(broken));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

async fn current_user(headers: HeaderMap) -> Response {
    match bearer(&headers).as_deref() {
        Some("T-manager") => Json(json!({ "id": 7, "email": "m@shop.test", "role_code": "MANAGER" })).into_response(),
        Some("T-customer") => Json(json!({ "data": { "id": "c-1", "role_code": "CUSTOMER" } })).into_response(),
        Some("T-norole") => Json(json!({ "id": 9 })).into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "invalid token" }))).into_response(),
    }
}

async fn echo_auth(headers: HeaderMap) -> Json<Value> {
    let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    Json(json!({ "authorization": auth }))
}

async fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, Json(json!({ "error": "forbidden", "message": "Managers only" }))).into_response()
}

async fn expired() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "token expired" }))).into_response()
}

async fn broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "database unavailable" }))).into_response()
}

struct Harness {
    _server: TestServer,
    storage: Arc<MemoryStorage>,
    session: Arc<SessionStore>,
    navigator: Arc<HistoryNavigator>,
    api: Arc<ApiClient>,
}

async fn harness() -> Harness {
    let server = TestServer::spawn().await;
    let config = ClientConfig {
        api_base_url: server.base_url.clone(),
        ..ClientConfig::default()
    };

    let storage = Arc::new(MemoryStorage::new());
    let session = Arc::new(SessionStore::restore(storage.clone(), Arc::new(PlaceholderDirectory)));
    let navigator = Arc::new(HistoryNavigator::new());
    let api = Arc::new(ApiClient::new(&config, session.clone(), navigator.clone()).unwrap());

    Harness {
        _server: server,
        storage,
        session,
        navigator,
        api,
    }
}

#[tokio::test]
async fn stored_token_is_sent_as_bearer_header() {
    let h = harness().await;

    let anonymous: Value = h.api.get_json("/echo-auth").await.unwrap();
    assert_eq!(anonymous["authorization"], Value::Null);

    h.session.set_token("abc123");
    let authed: Value = h.api.get_json("/echo-auth").await.unwrap();
    assert_eq!(authed["authorization"], "Bearer abc123");
}

#[tokio::test]
async fn unauthorized_response_clears_session_and_redirects_to_login() {
    let h = harness().await;
    h.session.login(RoleId::StaffPos);
    h.session.set_token("stale");

    let err = h.api.get_json::<Value>("/orders").await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated));
    assert_eq!(h.storage.get(keys::TOKEN), None);
    assert_eq!(h.storage.get(keys::ROLE), None);
    assert!(!h.session.is_authenticated());
    assert_eq!(h.navigator.location().as_deref(), Some("/guest/login"));
}

#[tokio::test]
async fn forbidden_response_keeps_session_and_raises_persistent_notice() {
    let h = harness().await;
    h.session.login(RoleId::StaffPos);
    h.session.set_token("tok");

    let err = h.api.get_json::<Value>("/admin/reports").await.unwrap_err();

    match &err {
        ApiError::Forbidden { message } => assert_eq!(message, "Managers only"),
        other => panic!("expected Forbidden, got {other:?}"),
    }
    assert_eq!(h.session.token().as_deref(), Some("tok"));
    assert_eq!(h.session.current_role(), RoleId::StaffPos);
    assert!(h.navigator.history().is_empty());

    let notices = NoticeLog::new();
    let notice = report_error(&err, &notices);
    assert_eq!(notice.kind, NoticeKind::AccessDenied);
    assert!(notice.is_persistent());
}

#[tokio::test]
async fn other_errors_propagate_with_payload_message() {
    let h = harness().await;
    h.session.set_token("tok");

    let err = h.api.get_json::<Value>("/broken").await.unwrap_err();

    match &err {
        ApiError::Status { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected Status, got {other:?}"),
    }
    assert_eq!(h.session.token().as_deref(), Some("tok"));

    let notice = report_error(&err, &NoticeLog::new());
    assert_eq!(notice.kind, NoticeKind::Failure);
    assert_eq!(notice.message, "database unavailable");
}

#[tokio::test]
async fn auth_completion_end_to_end_for_manager() {
    let h = harness().await;
    let flow = AuthCompletion::new(h.session.clone(), h.api.clone(), h.navigator.clone());

    let outcome = flow.complete_from_url("/auth-success?token=T-manager").await;

    assert!(matches!(outcome, AuthOutcome::Success { role: RoleId::Manager, .. }));
    assert_eq!(h.storage.get(keys::TOKEN).as_deref(), Some("T-manager"));
    assert_eq!(h.storage.get(keys::ROLE).as_deref(), Some("MANAGER"));
    assert!(h.storage.get(keys::USER).unwrap().contains("m@shop.test"));
    assert_eq!(h.session.current_role(), RoleId::Manager);
    assert_eq!(h.navigator.location().as_deref(), Some("/admin/dashboard"));

    // A process restart over the same storage keeps the signed-in user.
    let restarted = SessionStore::restore(h.storage.clone(), Arc::new(PlaceholderDirectory));
    assert_eq!(restarted.current_user().map(|u| u.id), Some("7".to_string()));
}

#[tokio::test]
async fn auth_completion_for_wrapped_customer_profile() {
    let h = harness().await;
    let flow = AuthCompletion::new(h.session.clone(), h.api.clone(), h.navigator.clone());

    flow.complete(Some("T-customer")).await;

    assert_eq!(h.session.current_role(), RoleId::Customer);
    assert_eq!(h.navigator.location().as_deref(), Some("/customer/home"));
}

#[tokio::test]
async fn auth_completion_rolls_back_token_on_invalid_profile() {
    let h = harness().await;
    let flow = AuthCompletion::new(h.session.clone(), h.api.clone(), h.navigator.clone());

    let outcome = flow.complete(Some("T-norole")).await;

    assert!(matches!(
        outcome,
        AuthOutcome::Failure { error: AuthFlowError::InvalidProfile(_), .. }
    ));
    assert_eq!(h.storage.get(keys::TOKEN), None);
    assert!(!h.session.is_authenticated());
    assert_eq!(h.navigator.location().as_deref(), Some("/guest/login?error=AuthFailed"));
}

#[tokio::test]
async fn auth_completion_with_rejected_token_ends_on_auth_failed() {
    let h = harness().await;
    let flow = AuthCompletion::new(h.session.clone(), h.api.clone(), h.navigator.clone());

    let outcome = flow.complete(Some("T-bogus")).await;

    assert!(matches!(
        outcome,
        AuthOutcome::Failure { error: AuthFlowError::Fetch(ApiError::Unauthenticated), .. }
    ));
    assert_eq!(h.storage.get(keys::TOKEN), None);
    // The interceptor redirects to login first; the flow's redirect wins.
    let history: Vec<String> = h.navigator.history().into_iter().map(|r| r.to).collect();
    assert_eq!(history, vec!["/guest/login", "/guest/login?error=AuthFailed"]);
}
