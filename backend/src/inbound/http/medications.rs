//! Medication CRUD HTTP handlers.
//!
//! ```text
//! GET    /api/medications
//! POST   /api/medications
//! GET    /api/medications/{id}
//! PUT    /api/medications/{id}
//! DELETE /api/medications/{id}
//! ```
//!
//! Every mutation re-derives the owner's reminders from the post-mutation
//! list, so the arranged set always reflects what is stored.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::medication::{Medication, MedicationId};
use crate::domain::{Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_medication_request;
use crate::domain::ports::MedicationStoreError;

/// Raw medication payload for create and update.
///
/// Every field is optional at the serde layer so the validation helpers can
/// report precise `missing_field` details instead of a generic 400.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRequest {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub schedule: Option<Vec<ScheduleEntryRequest>>,
    pub color: Option<String>,
    pub notes: Option<String>,
}

/// Raw schedule entry inside a [`MedicationRequest`].
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntryRequest {
    pub time: Option<String>,
    pub days: Option<Vec<u8>>,
}

/// Map store failures onto transport-agnostic domain errors.
pub(crate) fn map_store_error(error: MedicationStoreError) -> Error {
    match error {
        MedicationStoreError::Io { message } => {
            Error::internal(format!("medication store I/O failed: {message}"))
        }
        MedicationStoreError::Serialization { message } => {
            Error::internal(format!("medication store serialisation failed: {message}"))
        }
        MedicationStoreError::NotFound { id } => {
            Error::not_found("medication not found").with_details(json!({ "id": id }))
        }
    }
}

fn parse_id(raw: &str) -> Result<MedicationId, Error> {
    raw.parse().map_err(|_| {
        Error::invalid_request("medication id must be a valid UUID").with_details(json!({
            "field": "id",
            "code": "invalid_id",
            "value": raw,
        }))
    })
}

async fn reschedule_from_store(state: &HttpState, owner: &UserId) -> Result<(), Error> {
    let medications = state
        .medications
        .list(owner)
        .await
        .map_err(map_store_error)?;
    state.reminders.reschedule(owner, &medications);
    Ok(())
}

/// List the session owner's medications.
#[utoipa::path(
    get,
    path = "/api/medications",
    responses(
        (status = 200, description = "Medication list", body = [Medication]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["medications"],
    operation_id = "listMedications"
)]
#[get("/medications")]
pub async fn list_medications(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Medication>>> {
    let owner = session.require_user_id()?;
    let medications = state
        .medications
        .list(&owner)
        .await
        .map_err(map_store_error)?;
    Ok(web::Json(medications))
}

/// Register a new medication.
#[utoipa::path(
    post,
    path = "/api/medications",
    request_body = MedicationRequest,
    responses(
        (status = 201, description = "Medication created", body = Medication),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["medications"],
    operation_id = "addMedication"
)]
#[post("/medications")]
pub async fn add_medication(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<MedicationRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let draft = parse_medication_request(payload.into_inner())?;
    let created = state
        .medications
        .add(&owner, draft)
        .await
        .map_err(map_store_error)?;
    reschedule_from_store(&state, &owner).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Fetch one medication.
#[utoipa::path(
    get,
    path = "/api/medications/{id}",
    params(("id" = String, Path, description = "Medication identifier")),
    responses(
        (status = 200, description = "Medication", body = Medication),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["medications"],
    operation_id = "getMedication"
)]
#[get("/medications/{id}")]
pub async fn get_medication(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Medication>> {
    let owner = session.require_user_id()?;
    let id = parse_id(&path.into_inner())?;
    state
        .medications
        .get(&owner, &id)
        .await
        .map_err(map_store_error)?
        .map(web::Json)
        .ok_or_else(|| {
            Error::not_found("medication not found").with_details(json!({ "id": id.to_string() }))
        })
}

/// Replace every field of an existing medication except its id.
#[utoipa::path(
    put,
    path = "/api/medications/{id}",
    params(("id" = String, Path, description = "Medication identifier")),
    request_body = MedicationRequest,
    responses(
        (status = 200, description = "Updated medication", body = Medication),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["medications"],
    operation_id = "updateMedication"
)]
#[put("/medications/{id}")]
pub async fn update_medication(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<MedicationRequest>,
) -> ApiResult<web::Json<Medication>> {
    let owner = session.require_user_id()?;
    let id = parse_id(&path.into_inner())?;
    let draft = parse_medication_request(payload.into_inner())?;
    let updated = state
        .medications
        .update(&owner, &id, draft)
        .await
        .map_err(map_store_error)?;
    reschedule_from_store(&state, &owner).await?;
    Ok(web::Json(updated))
}

/// Delete a medication.
#[utoipa::path(
    delete,
    path = "/api/medications/{id}",
    params(("id" = String, Path, description = "Medication identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["medications"],
    operation_id = "deleteMedication"
)]
#[delete("/medications/{id}")]
pub async fn delete_medication(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user_id()?;
    let id = parse_id(&path.into_inner())?;
    state
        .medications
        .remove(&owner, &id)
        .await
        .map_err(map_store_error)?;
    reschedule_from_store(&state, &owner).await?;
    Ok(HttpResponse::NoContent().finish())
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
                .service(list_medications)
                .service(add_medication)
                .service(get_medication)
                .service(update_medication)
                .service(delete_medication),
        )
    }

    fn memory_state() -> HttpState {
        test_state(
            Arc::new(FixtureAuthService),
            Arc::new(MemoryMedicationStore::default()),
            Arc::new(FixtureNotifier),
        )
    }

    fn lisinopril_body() -> Value {
        json!({
            "name": "Lisinopril",
            "dosage": "10mg",
            "schedule": [{ "time": "08:00", "days": [1, 2, 3, 4, 5, 6, 7] }],
            "color": "#3b82f6",
            "notes": "Take with food in the morning"
        })
    }

    #[actix_web::test]
    async fn crud_round_trip_through_the_http_surface() {
        let app = actix_test::init_service(test_app(memory_state())).await;
        let cookie = login_fixture_session(&app).await;

        // Create.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/medications")
                .cookie(cookie.clone())
                .set_json(lisinopril_body())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(res).await;
        let id = created
            .get("id")
            .and_then(Value::as_str)
            .expect("assigned id")
            .to_owned();

        // Read back.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/medications/{id}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let fetched: Value = actix_test::read_body_json(res).await;
        assert_eq!(fetched, created);

        // Update.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/medications/{id}"))
                .cookie(cookie.clone())
                .set_json(json!({
                    "name": "Lisinopril",
                    "dosage": "20mg",
                    "schedule": [{ "time": "09:00", "days": [1, 3, 5] }],
                    "color": "#10b981"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated: Value = actix_test::read_body_json(res).await;
        assert_eq!(updated.get("dosage"), Some(&json!("20mg")));
        assert_eq!(updated.get("id"), Some(&json!(id.clone())));

        // Delete.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/api/medications/{id}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        // Gone.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/medications/{id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn update_of_unknown_id_is_not_found() {
        let app = actix_test::init_service(test_app(memory_state())).await;
        let cookie = login_fixture_session(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/api/medications/{}", uuid::Uuid::new_v4()))
                .cookie(cookie)
                .set_json(lisinopril_body())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn malformed_ids_are_bad_requests() {
        let app = actix_test::init_service(test_app(memory_state())).await;
        let cookie = login_fixture_session(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/medications/not-a-uuid")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn validation_failures_never_reach_the_store() {
        let app = actix_test::init_service(test_app(memory_state())).await;
        let cookie = login_fixture_session(&app).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/medications")
                .cookie(cookie.clone())
                .set_json(json!({
                    "name": "X",
                    "dosage": "10mg",
                    "schedule": [{ "time": "08:00", "days": [] }]
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/medications")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let listed: Value = actix_test::read_body_json(res).await;
        assert_eq!(listed, json!([]));
    }

    #[actix_web::test]
    async fn endpoints_require_a_session() {
        let app = actix_test::init_service(test_app(memory_state())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/medications")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
