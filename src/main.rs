use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use filmxane_backend::config::Config;
use filmxane_backend::{handlers, services, AppState};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let db_pool = services::init_db_pool(&config).await.map_err(|e| {
        error!("Failed to initialise database: {:?}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    if let Err(e) = services::bootstrap_admin(&db_pool, &config).await {
        error!("Failed to bootstrap admin account: {:?}", e);
    }

    let bind_address = config.bind_address();
    let allowed_origins = config.cors_allowed_origins.clone();
    let app_state = web::Data::new(AppState { db_pool, config });

    info!("Starting HTTP server on {}:{}", bind_address.0, bind_address.1);
    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
            .supports_credentials();

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(handlers::configure_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
