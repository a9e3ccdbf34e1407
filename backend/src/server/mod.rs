//! Server assembly: adapter construction and Actix application wiring.

mod config;

pub use config::{
    MedicationBackend, NotifierBackend, ServerConfig, ServerOptions, UserBackend,
};

use std::io;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{AuthService, MedicationStore, Notifier};
use crate::domain::{CredentialAuthService, ReminderScheduler};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{auth, health, medications, timeline};
use crate::middleware::Trace;
use crate::outbound::notify::{TracingNotifier, UnsupportedNotifier, WebhookNotifier};
use crate::outbound::persistence::{
    DbPool, DieselUserRepository, JsonFileMedicationStore, MemoryMedicationStore,
    MemoryUserRepository, PoolConfig, run_migrations,
};

/// Construct adapters per the configuration and run the HTTP server.
pub async fn run(config: ServerConfig) -> io::Result<()> {
    let state = build_state(&config).await?;
    let data = web::Data::new(state);
    let key = config.key.clone();
    let cookie_secure = config.cookie_secure;

    info!(bind = %config.bind_addr(), "starting server");
    HttpServer::new(move || build_app(data.clone(), key.clone(), cookie_secure))
        .bind(config.bind_addr())?
        .run()
        .await
}

async fn build_state(config: &ServerConfig) -> io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let notifier: Arc<dyn Notifier> = match &config.notifier {
        NotifierBackend::Off => Arc::new(UnsupportedNotifier),
        NotifierBackend::Log => Arc::new(TracingNotifier),
        NotifierBackend::Webhook(endpoint) => Arc::new(WebhookNotifier::new(endpoint.clone())),
    };
    let reminders = Arc::new(ReminderScheduler::new(notifier, Arc::clone(&clock)));

    let medications: Arc<dyn MedicationStore> = match &config.medications {
        MedicationBackend::File(path) => {
            info!(path = %path.display(), "using file-backed medication store");
            Arc::new(JsonFileMedicationStore::open(path)?)
        }
        MedicationBackend::Memory => Arc::new(MemoryMedicationStore::default()),
    };

    let auth: Arc<dyn AuthService> = match &config.users {
        UserBackend::Postgres(url) => {
            info!("using PostgreSQL-backed accounts");
            let migration_url = url.clone();
            tokio::task::spawn_blocking(move || run_migrations(&migration_url))
                .await
                .map_err(io::Error::other)?
                .map_err(io::Error::other)?;

            let pool = DbPool::new(PoolConfig::new(url.clone()))
                .await
                .map_err(io::Error::other)?;
            Arc::new(CredentialAuthService::new(Arc::new(
                DieselUserRepository::new(pool),
            )))
        }
        UserBackend::Memory => Arc::new(CredentialAuthService::new(Arc::new(
            MemoryUserRepository::default(),
        ))),
    };

    Ok(HttpState::new(auth, medications, reminders, clock))
}

/// Assemble the Actix application around the given state.
///
/// Shared between `run` and the integration tests, which supply in-memory
/// adapters and an ephemeral key.
pub fn build_app(
    state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build();

    let api = web::scope("/api")
        .wrap(session)
        .service(auth::login)
        .service(auth::register)
        .service(auth::guest)
        .service(auth::logout)
        .service(auth::current_user)
        .service(medications::list_medications)
        .service(medications::add_medication)
        .service(medications::get_medication)
        .service(medications::update_medication)
        .service(medications::delete_medication)
        .service(timeline::get_timeline)
        .service(timeline::get_reminder_status)
        .service(timeline::request_reminder_permission);

    let app = App::new()
        .app_data(state)
        .wrap(Trace)
        .service(api)
        .service(health::healthz);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}
