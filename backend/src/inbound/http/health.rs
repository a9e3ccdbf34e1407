//! Liveness probe, outside the session-guarded API scope.

use actix_web::{HttpResponse, get};
use serde_json::json;

/// Report process liveness.
#[utoipa::path(
    get,
    path = "/healthz",
    responses((status = 200, description = "Process is alive")),
    tags = ["health"],
    operation_id = "healthz",
    security([])
)]
#[get("/healthz")]
pub async fn healthz() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};

    #[actix_web::test]
    async fn healthz_is_ok_without_a_session() {
        let app = test::init_service(App::new().service(healthz)).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/healthz").to_request())
            .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
