//! Shared helpers for in-module HTTP handler tests.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key};
use mockable::DefaultClock;

use crate::domain::ReminderScheduler;
use crate::domain::ports::{AuthService, MedicationStore, Notifier};
use crate::inbound::http::state::HttpState;

/// Cookie session middleware with an ephemeral key and lax settings.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build()
}

/// Handler state over the given doubles, with a real clock and scheduler.
pub fn test_state(
    auth: Arc<dyn AuthService>,
    medications: Arc<dyn MedicationStore>,
    notifier: Arc<dyn Notifier>,
) -> HttpState {
    let clock = Arc::new(DefaultClock);
    HttpState::new(
        auth,
        medications,
        Arc::new(ReminderScheduler::new(notifier, clock.clone())),
        clock,
    )
}

/// Log the fixture user in and return the session cookie.
pub async fn login_fixture_session<S, B>(app: &S) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let res = actix_web::test::call_service(
        app,
        actix_web::test::TestRequest::post()
            .uri("/api/login")
            .set_json(serde_json::json!({
                "username": "edith",
                "password": "hunter2",
            }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "fixture login must succeed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
