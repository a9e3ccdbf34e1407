//! Authentication HTTP handlers.
//!
//! ```text
//! POST /api/register {"username":"edith","password":"hunter2","email":"edith@gmail.com"}
//! POST /api/login    {"username":"edith","password":"hunter2"}
//! POST /api/logout
//! POST /api/guest
//! GET  /api/user
//! ```
//!
//! Login and guest creation also re-derive the owner's reminders so a fresh
//! session starts with today's remaining doses arranged.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::user::User;
use crate::domain::{AuthValidationError, Error, LoginCredentials, Registration, sample_medications};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = AuthValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Registration request body for `POST /api/register`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

fn map_auth_validation_error(err: AuthValidationError) -> Error {
    let (field, code) = match &err {
        AuthValidationError::InvalidUsername(_) => ("username", "invalid_username"),
        AuthValidationError::EmptyPassword => ("password", "empty_password"),
        AuthValidationError::InvalidEmail(_) => ("email", "invalid_email"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": code,
    }))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_auth_validation_error)?;
    let user = state.auth.login(&credentials).await?;
    session.persist_user(&user.id)?;

    // Restore today's reminders for the returning account.
    let medications = state
        .medications
        .list(&user.id)
        .await
        .map_err(super::medications::map_store_error)?;
    state.reminders.reschedule(&user.id, &medications);

    info!(user = %user.id, "login succeeded");
    Ok(web::Json(user))
}

/// Create a registered account and establish a session.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username already taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let registration =
        Registration::try_from_parts(&payload.username, &payload.password, payload.email.as_deref())
            .map_err(map_auth_validation_error)?;
    let user = state.auth.register(registration).await?;
    session.persist_user(&user.id)?;

    info!(user = %user.id, "account registered");
    Ok(HttpResponse::Created().json(user))
}

/// Create an anonymous guest account with the starter medications.
#[utoipa::path(
    post,
    path = "/api/guest",
    responses(
        (status = 201, description = "Guest session created", body = User),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "createGuest",
    security([])
)]
#[post("/guest")]
pub async fn guest(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = state.auth.create_guest().await?;
    session.persist_user(&user.id)?;

    let samples = sample_medications()
        .map_err(|err| Error::internal(format!("invalid sample medications: {err}")))?;
    for draft in samples {
        state
            .medications
            .add(&user.id, draft)
            .await
            .map_err(super::medications::map_store_error)?;
    }

    let medications = state
        .medications
        .list(&user.id)
        .await
        .map_err(super::medications::map_store_error)?;
    state.reminders.reschedule(&user.id, &medications);

    info!(user = %user.id, "guest session created");
    Ok(HttpResponse::Created().json(user))
}

/// End the session and cancel any arranged reminders.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 204, description = "Session ended"),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if let Some(user_id) = session.user_id()? {
        state.reminders.cancel_all(&user_id);
    }
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

/// The user behind the current session, or 401.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "No valid session", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let user_id = session.require_user_id()?;
    match state.auth.user_by_id(&user_id).await? {
        Some(user) => Ok(web::Json(user)),
        None => {
            // The account behind the cookie is gone; drop the session too.
            session.clear();
            Err(Error::unauthorized("login required"))
        }
    }
}
