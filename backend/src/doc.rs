//! OpenAPI documentation configuration.
//!
//! Generates the specification served by Swagger UI in debug builds. Paths
//! come from the inbound HTTP layer; schemas are the domain payloads and
//! request DTOs referenced by those paths.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Medication, ScheduleEntry, User};
use crate::inbound::http::auth::{LoginRequest, RegisterRequest};
use crate::inbound::http::medications::{MedicationRequest, ScheduleEntryRequest};
use crate::inbound::http::timeline::ReminderStatusResponse;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/login or POST /api/guest.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "MedTrack backend API",
        description = "Session-authenticated medication registry, timeline projection, and reminder scheduling."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::guest,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::medications::list_medications,
        crate::inbound::http::medications::add_medication,
        crate::inbound::http::medications::get_medication,
        crate::inbound::http::medications::update_medication,
        crate::inbound::http::medications::delete_medication,
        crate::inbound::http::timeline::get_timeline,
        crate::inbound::http::timeline::get_reminder_status,
        crate::inbound::http::timeline::request_reminder_permission,
        crate::inbound::http::health::healthz,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Medication,
        ScheduleEntry,
        LoginRequest,
        RegisterRequest,
        MedicationRequest,
        ScheduleEntryRequest,
        ReminderStatusResponse,
    )),
    tags(
        (name = "auth", description = "Sessions and accounts"),
        (name = "medications", description = "Medication CRUD"),
        (name = "timeline", description = "Schedule projection and reminders"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
