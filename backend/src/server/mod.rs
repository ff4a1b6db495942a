//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::AppSettings;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use pet_adoption::Trace;
#[cfg(debug_assertions)]
use pet_adoption::doc::ApiDoc;
use pet_adoption::domain::SeedOutcome;
use pet_adoption::inbound::http::api_routes;
use pet_adoption::inbound::http::health::{HealthState, live, ready};
use pet_adoption::inbound::http::state::HttpState;
use pet_adoption::inbound::http::uploads::serve_upload;

use state_builders::build_wiring;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api").configure(api_routes))
        .service(serve_upload)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration, seeding example data first when requested.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when the uploads directory cannot be opened,
/// seeding fails, or binding the socket fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let wiring = build_wiring(&config)?;
    if let Some(password) = config.admin_password.as_deref() {
        match wiring.seeder.seed(&config.admin_email, password).await {
            Ok(SeedOutcome::Seeded { admin, pets }) => {
                info!(%admin, pets, "administrator and sample catalogue created");
            }
            Ok(SeedOutcome::AlreadySeeded) => {
                info!("administrator already present; skipping example data");
            }
            Err(err) => {
                return Err(std::io::Error::other(format!("example data seeding failed: {err}")));
            }
        }
    }

    let http_state = web::Data::new(HttpState::new(wiring.ports, config.cookies));
    if !config.cookies.secure {
        warn!("session cookies are not marked Secure");
    }
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    info!(bind_addr = %config.bind_addr, "server listening");
    health_state.mark_ready();
    Ok(server)
}
