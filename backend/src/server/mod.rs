//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_ports;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use user_intents::RequestSpan;
#[cfg(debug_assertions)]
use user_intents::doc::ApiDoc;
use user_intents::inbound::http::ai::ai;
use user_intents::inbound::http::graphql::{graphql, json_config};
use user_intents::inbound::http::health::{HealthState, live, ready};
use user_intents::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(RequestSpan)
        .service(ai)
        .service(graphql)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server from `config`.
///
/// # Returns
/// A [`Server`] that must be awaited to drive the listener, and the health
/// state it reports through.
///
/// # Errors
/// Propagates [`std::io::Error`] when building adapters, binding the socket,
/// or starting the server fails.
pub async fn create_server(config: ServerConfig) -> std::io::Result<(Server, web::Data<HealthState>)> {
    let ports = build_http_ports(&config).await?;
    let health_state = web::Data::new(HealthState::with_store(ports.users.clone()));
    let http_state = web::Data::new(HttpState::new(ports, config.request_timeout));

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .bind(config.bind_addr())?
        .run();

    health_state.mark_ready();
    Ok((server, health_state))
}
