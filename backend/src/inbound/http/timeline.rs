//! Timeline projection and reminder status HTTP handlers.
//!
//! ```text
//! GET  /api/timeline?view=daily|weekly
//! GET  /api/reminders
//! POST /api/reminders/permission
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::medication::Medication;
use crate::domain::ports::NotifierPermission;
use crate::domain::timeline::{DailySlot, SlotStatus, Timeline, ViewMode, WeeklyRow};
use crate::domain::{Error, project};
use crate::inbound::http::ApiResult;
use crate::inbound::http::medications::map_store_error;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query parameters for the timeline endpoint.
#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    view: Option<String>,
}

/// One slot of a daily timeline response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySlotResponse {
    /// 24-hour slot time, for example "08:00".
    pub time: String,
    /// 12-hour display form, for example "8:00 AM".
    pub display_time: String,
    /// "past" or "upcoming" relative to the server's clock.
    pub status: String,
    /// Medications due in this slot.
    pub medications: Vec<Medication>,
}

/// One row of a weekly timeline response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRowResponse {
    /// 24-hour row time.
    pub time: String,
    /// 12-hour display form.
    pub display_time: String,
    /// Medications due per weekday, Monday first.
    pub cells: Vec<Vec<Medication>>,
}

/// Timeline response payload, tagged by view mode.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum TimelineResponse {
    /// Time-sorted slots for the current day.
    #[serde(rename = "daily")]
    #[serde(rename_all = "camelCase")]
    Daily {
        /// Projected calendar date, ISO 8601.
        date: String,
        /// Monday-start weekday number, 1 to 7.
        weekday: u8,
        /// Deduplicated slots, ascending by time.
        slots: Vec<DailySlotResponse>,
    },
    /// The 7 x N grid for the current week.
    #[serde(rename = "weekly")]
    #[serde(rename_all = "camelCase")]
    Weekly {
        /// Week dates, Monday first, ISO 8601.
        days: Vec<String>,
        /// Rows ascending by time.
        rows: Vec<WeeklyRowResponse>,
    },
}

fn slot_response(slot: DailySlot) -> DailySlotResponse {
    DailySlotResponse {
        time: slot.time.to_string(),
        display_time: slot.time.format_12h(),
        status: match slot.status {
            SlotStatus::Past => "past",
            SlotStatus::Upcoming => "upcoming",
        }
        .to_owned(),
        medications: slot.medications,
    }
}

fn row_response(row: WeeklyRow) -> WeeklyRowResponse {
    WeeklyRowResponse {
        time: row.time.to_string(),
        display_time: row.time.format_12h(),
        cells: row.cells.into_iter().collect(),
    }
}

impl From<Timeline> for TimelineResponse {
    fn from(timeline: Timeline) -> Self {
        match timeline {
            Timeline::Daily {
                date,
                weekday,
                slots,
            } => Self::Daily {
                date: date.to_string(),
                weekday,
                slots: slots.into_iter().map(slot_response).collect(),
            },
            Timeline::Weekly { days, rows } => Self::Weekly {
                days: days.iter().map(ToString::to_string).collect(),
                rows: rows.into_iter().map(row_response).collect(),
            },
        }
    }
}

fn parse_view(query: TimelineQuery) -> Result<ViewMode, Error> {
    match query.view {
        None => Ok(ViewMode::Daily),
        Some(raw) => raw.parse().map_err(|_| {
            Error::invalid_request("view must be daily or weekly").with_details(json!({
                "field": "view",
                "code": "invalid_view",
                "value": raw,
            }))
        }),
    }
}

/// Project the owner's medications onto a timeline at the current instant.
#[utoipa::path(
    get,
    path = "/api/timeline",
    params(("view" = Option<String>, Query, description = "daily (default) or weekly")),
    responses(
        (status = 200, description = "Timeline projection"),
        (status = 400, description = "Invalid view", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["timeline"],
    operation_id = "getTimeline"
)]
#[get("/timeline")]
pub async fn get_timeline(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TimelineQuery>,
) -> ApiResult<web::Json<TimelineResponse>> {
    let owner = session.require_user_id()?;
    let view = parse_view(query.into_inner())?;
    let medications = state
        .medications
        .list(&owner)
        .await
        .map_err(map_store_error)?;

    let now = state.clock.local().naive_local();
    let timeline = project(&medications, view, now);
    Ok(web::Json(TimelineResponse::from(timeline)))
}

/// Reminder status payload.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReminderStatusResponse {
    /// "unsupported", "undecided", or "granted".
    pub permission: String,
    /// Reminders currently arranged for the session owner.
    pub pending: usize,
}

fn status_response(permission: NotifierPermission, pending: usize) -> ReminderStatusResponse {
    ReminderStatusResponse {
        permission: permission.as_str().to_owned(),
        pending,
    }
}

/// Current reminder permission and arranged count.
#[utoipa::path(
    get,
    path = "/api/reminders",
    responses(
        (status = 200, description = "Reminder status", body = ReminderStatusResponse),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["timeline"],
    operation_id = "getReminderStatus"
)]
#[get("/reminders")]
pub async fn get_reminder_status(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ReminderStatusResponse>> {
    let owner = session.require_user_id()?;
    Ok(web::Json(status_response(
        state.reminders.permission(),
        state.reminders.pending(&owner),
    )))
}

/// Ask the notification capability for permission.
///
/// On a grant the owner's reminders are immediately re-derived, so the
/// "enable notifications" affordance takes effect without another edit.
#[utoipa::path(
    post,
    path = "/api/reminders/permission",
    responses(
        (status = 200, description = "Updated reminder status", body = ReminderStatusResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["timeline"],
    operation_id = "requestReminderPermission"
)]
#[post("/reminders/permission")]
pub async fn request_reminder_permission(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ReminderStatusResponse>> {
    let owner = session.require_user_id()?;
    let permission = state.reminders.request_permission().await;

    if permission == NotifierPermission::Granted {
        let medications = state
            .medications
            .list(&owner)
            .await
            .map_err(map_store_error)?;
        state.reminders.reschedule(&owner, &medications);
    }

    Ok(web::Json(status_response(
        permission,
        state.reminders.pending(&owner),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureAuthService, FixtureNotifier};
    use crate::inbound::http::test_utils::{
        login_fixture_session, test_session_middleware, test_state,
    };
    use crate::outbound::persistence::MemoryMedicationStore;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(web::Data::new(state)).service(
            web::scope("/api")
                .wrap(test_session_middleware())
                .service(crate::inbound::http::auth::login)
                .service(crate::inbound::http::medications::add_medication)
                .service(get_timeline)
                .service(get_reminder_status)
                .service(request_reminder_permission),
        )
    }

    fn memory_state() -> HttpState {
        test_state(
            Arc::new(FixtureAuthService),
            Arc::new(MemoryMedicationStore::default()),
            Arc::new(FixtureNotifier),
        )
    }

    fn add_lisinopril_request(
        cookie: &actix_web::cookie::Cookie<'static>,
    ) -> actix_http::Request {
        actix_test::TestRequest::post()
            .uri("/api/medications")
            .cookie(cookie.clone())
            .set_json(json!({
                "name": "Lisinopril",
                "dosage": "10mg",
                "schedule": [{ "time": "08:00", "days": [1, 2, 3, 4, 5, 6, 7] }],
                "color": "#3b82f6"
            }))
            .to_request()
    }

    #[actix_web::test]
    async fn daily_timeline_contains_the_single_slot() {
        let app = actix_test::init_service(test_app(memory_state())).await;
        let cookie = login_fixture_session(&app).await;
        let created =
            actix_test::call_service(&app, add_lisinopril_request(&cookie)).await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/timeline?view=daily")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("view"), Some(&json!("daily")));
        let slots = body.get("slots").and_then(Value::as_array).expect("slots");
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].get("time"), Some(&json!("08:00")));
        assert_eq!(slots[0].get("displayTime"), Some(&json!("8:00 AM")));
    }

    #[actix_web::test]
    async fn weekly_timeline_spans_all_seven_days() {
        let app = actix_test::init_service(test_app(memory_state())).await;
        let cookie = login_fixture_session(&app).await;
        let created =
            actix_test::call_service(&app, add_lisinopril_request(&cookie)).await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/timeline?view=weekly")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("view"), Some(&json!("weekly")));
        let days = body.get("days").and_then(Value::as_array).expect("days");
        assert_eq!(days.len(), 7);
        let rows = body.get("rows").and_then(Value::as_array).expect("rows");
        assert_eq!(rows.len(), 1);
        let cells = rows[0].get("cells").and_then(Value::as_array).expect("cells");
        assert!(cells.iter().all(|cell| cell.as_array().is_some_and(|c| c.len() == 1)));
    }

    #[actix_web::test]
    async fn unknown_view_modes_are_rejected() {
        let app = actix_test::init_service(test_app(memory_state())).await;
        let cookie = login_fixture_session(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/timeline?view=monthly")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn empty_timeline_is_an_explicit_empty_projection() {
        let app = actix_test::init_service(test_app(memory_state())).await;
        let cookie = login_fixture_session(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/timeline")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body.get("slots").and_then(Value::as_array).map(Vec::len),
            Some(0)
        );
    }

    #[actix_web::test]
    async fn reminder_status_reports_the_granted_fixture() {
        let app = actix_test::init_service(test_app(memory_state())).await;
        let cookie = login_fixture_session(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/reminders")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("permission"), Some(&json!("granted")));
    }

    #[actix_web::test]
    async fn requesting_permission_returns_the_updated_status() {
        let app = actix_test::init_service(test_app(memory_state())).await;
        let cookie = login_fixture_session(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/reminders/permission")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("permission"), Some(&json!("granted")));
    }
}
