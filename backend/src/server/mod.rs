//! Server construction and wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use backend::ApiDoc;
use backend::domain::ports::{InMemoryUserRepository, UserRepository};
use backend::inbound::http::error::json_config;
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::{create_user, delete_user, get_user, list_users, update_user};
use backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};

/// Build the user Persistence Gateway based on configuration.
///
/// Uses the PostgreSQL adapter when a database URL is configured, otherwise
/// the deterministic in-memory gateway so the service can run without a
/// database (local development and tests).
async fn build_user_repository(config: &ServerConfig) -> std::io::Result<Arc<dyn UserRepository>> {
    match &config.database_url {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(|e| std::io::Error::other(format!("database pool failed: {e}")))?;
            Ok(Arc::new(DieselUserRepository::new(pool)))
        }
        None => {
            info!("DATABASE_URL not set; using the in-memory user repository");
            Ok(Arc::new(InMemoryUserRepository::new()))
        }
    }
}

fn build_app(
    http_state: web::Data<HttpState>,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .app_data(json_config())
        .service(list_users)
        .service(get_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user);

    let app = App::new()
        .app_data(http_state)
        .app_data(health_state)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind and run the HTTP server until shutdown.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let users = build_user_repository(&config).await?;
    let http_state = web::Data::new(HttpState::new(users));
    let health_state = web::Data::new(HealthState::new());

    // Clones for the server factory so the readiness probe stays shared.
    let factory_http_state = http_state.clone();
    let factory_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(factory_http_state.clone(), factory_health_state.clone())
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    info!(addr = %config.bind_addr, "server listening");
    server.run().await
}
