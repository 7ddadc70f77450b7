use actix_web::{middleware::Compress, App, HttpServer};
use actix_cors::Cors;
use utoipa_swagger_ui::SwaggerUi;

mod error;
mod integrity;
mod models;
mod openapi;
mod pagination;
mod repo;
mod reports;
mod routes;

use openapi::ApiDoc;
use repo::inmem::InMemRepo;
use routes::{config, AppState};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env automatically only in debug builds to reduce manual setup overhead.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Bootstrapping mflix server");

    let repo = InMemRepo::new();
    info!(
        "Snapshot directory: {}",
        std::env::var("MFLIX_DATA_DIR").unwrap_or_else(|_| "data".to_string())
    );

    let openapi = ApiDoc::openapi();
    let bind_addr =
        std::env::var("MFLIX_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    let server = HttpServer::new(move || {
        // the original service ran behind a wide-open CORS policy
        let cors = Cors::permissive();

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(cors)
            .configure(config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/docs/openapi.json", openapi.clone()))
            .app_data(actix_web::web::Data::new(AppState {
                repo: Arc::new(repo.clone()),
            }))
    })
    .bind(bind_addr.as_str())?;

    info!("Listening on http://{bind_addr}");

    server.run().await
}
