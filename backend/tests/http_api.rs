//! End-to-end HTTP flows over in-memory adapters.
//!
//! These tests drive the assembled application the way a client would:
//! guest/registered session establishment, medication CRUD, timeline
//! projection, and reminder status, all through the public surface.

use std::sync::Arc;

use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use mockable::DefaultClock;
use serde_json::{Value, json};

use backend::domain::ports::FixtureNotifier;
use backend::domain::{CredentialAuthService, ReminderScheduler};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{MemoryMedicationStore, MemoryUserRepository};
use backend::server::build_app;

fn memory_state() -> HttpState {
    let clock = Arc::new(DefaultClock);
    HttpState::new(
        Arc::new(CredentialAuthService::new(Arc::new(
            MemoryUserRepository::default(),
        ))),
        Arc::new(MemoryMedicationStore::default()),
        Arc::new(ReminderScheduler::new(
            Arc::new(FixtureNotifier),
            clock.clone(),
        )),
        clock,
    )
}

macro_rules! init_app {
    () => {
        test::init_service(build_app(
            web::Data::new(memory_state()),
            Key::generate(),
            false,
        ))
        .await
    };
}

fn session_cookie(res: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

#[actix_web::test]
async fn register_login_and_session_restore() {
    let app = init_app!();

    // Register and pick up the session.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/register")
            .set_json(json!({
                "username": "edith",
                "password": "hunter2",
                "email": "edith@gmail.com"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let registered: Value = test::read_body_json(res).await;
    assert_eq!(registered["username"], json!("edith"));
    assert_eq!(registered["isGuest"], json!(false));

    // Re-registering the same username conflicts.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/register")
            .set_json(json!({ "username": "edith", "password": "other" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Fresh login issues a session that restores the same account.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "username": "edith", "password": "hunter2" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/user")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let user: Value = test::read_body_json(res).await;
    assert_eq!(user["username"], json!("edith"));
    assert_eq!(user["email"], json!("edith@gmail.com"));

    // Wrong password stays unauthorised.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "username": "edith", "password": "wrong" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Logout ends the session.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn guest_flow_seeds_the_starter_medications() {
    let app = init_app!();

    let res = test::call_service(
        &app,
        test::TestRequest::post().uri("/api/guest").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let cookie = session_cookie(&res);
    let guest: Value = test::read_body_json(res).await;
    assert_eq!(guest["isGuest"], json!(true));

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/medications")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let listed: Value = test::read_body_json(res).await;
    let names: Vec<&str> = listed
        .as_array()
        .expect("list")
        .iter()
        .filter_map(|med| med["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Lisinopril", "Vitamin D", "Ibuprofen"]);

    // The weekly projection carries the seeded schedule.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/timeline?view=weekly")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let timeline: Value = test::read_body_json(res).await;
    let times: Vec<&str> = timeline["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .filter_map(|row| row["time"].as_str())
        .collect();
    assert_eq!(times, vec!["08:00", "09:00", "13:00", "21:00"]);
}

#[actix_web::test]
async fn medication_crud_and_projection_flow() {
    let app = init_app!();

    let res = test::call_service(
        &app,
        test::TestRequest::post().uri("/api/guest").to_request(),
    )
    .await;
    let cookie = session_cookie(&res);

    // Add a medication due every day.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/medications")
            .cookie(cookie.clone())
            .set_json(json!({
                "name": "Metformin",
                "dosage": "500mg",
                "schedule": [{ "time": "07:00", "days": [1, 2, 3, 4, 5, 6, 7] }],
                "color": "#8b5cf6"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    let id = created["id"].as_str().expect("assigned id").to_owned();

    // It shows up in the daily projection.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/timeline")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let daily: Value = test::read_body_json(res).await;
    assert_eq!(daily["view"], json!("daily"));
    let slot_times: Vec<&str> = daily["slots"]
        .as_array()
        .expect("slots")
        .iter()
        .filter_map(|slot| slot["time"].as_str())
        .collect();
    assert!(slot_times.contains(&"07:00"));

    // Delete it and the slot disappears.
    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/medications/{id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/timeline")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let daily: Value = test::read_body_json(res).await;
    let slot_times: Vec<&str> = daily["slots"]
        .as_array()
        .expect("slots")
        .iter()
        .filter_map(|slot| slot["time"].as_str())
        .collect();
    assert!(!slot_times.contains(&"07:00"));

    // Deleting again is a 404 carrying the id in details.
    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/medications/{id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn reminder_status_is_visible_per_session() {
    let app = init_app!();

    let res = test::call_service(
        &app,
        test::TestRequest::post().uri("/api/guest").to_request(),
    )
    .await;
    let cookie = session_cookie(&res);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/reminders")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let status: Value = test::read_body_json(res).await;
    assert_eq!(status["permission"], json!("granted"));
    assert!(status["pending"].is_u64());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/reminders/permission")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn every_response_carries_a_trace_id() {
    let app = init_app!();

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/healthz").to_request(),
    )
    .await;
    assert!(res.headers().contains_key("trace-id"));

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/user").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key("trace-id"));
}
