mod config;
mod csrf;
mod error;
mod inference;
mod routes;
mod upload;
mod views;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::AppConfig;
use csrf::middleware::CsrfMiddleware;
use inference::engine::EngineSlot;
use routes::configure_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // One engine for the whole process, shared by every worker.
    let engine = web::Data::new(EngineSlot::from_config(&config));

    if !config.csrf_enabled {
        log::warn!("CSRF protection is disabled");
    }
    log::info!("Serving static files from {}", config.static_dir);

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    let app_config = web::Data::new(config.clone());
    HttpServer::new(move || {
        App::new()
            .wrap(CsrfMiddleware::new(config.csrf_enabled))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                        actix_web::http::header::HeaderName::from_static("x-csrftoken"),
                    ])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(engine.clone())
            .app_data(app_config.clone())
            .configure(|cfg| configure_routes(cfg, config.static_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
