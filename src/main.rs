mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::database::{MongoDB, MongoUserStore, UserStore};
use crate::services::{FirebaseTokenVerifier, TokenVerifier};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ {}", e);
        io::Error::other(e)
    })?;

    log::info!("🚀 Starting Profile Store...");

    let db = MongoDB::new(&config.database_url, config.database_name.as_deref())
        .await
        .map_err(|e| {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            io::Error::other(e)
        })?;

    db.ensure_indexes(&config.users_collection).await.map_err(|e| {
        log::error!("❌ Failed to create indexes: {}", e);
        io::Error::other(e)
    })?;

    let store: Arc<dyn UserStore> = Arc::new(MongoUserStore::new(&db, &config.users_collection));
    let store_data = web::Data::from(store);

    let firebase = match &config.firebase_jwks_file {
        Some(path) => {
            let keys = crate::config::load_jwk_set(path).map_err(|e| {
                log::error!("❌ {}", e);
                io::Error::other(e)
            })?;
            log::info!("🔑 Using {} fixed signing keys from {}", keys.keys.len(), path);
            FirebaseTokenVerifier::with_keys(config.firebase_project_id.clone(), keys)
        }
        None => FirebaseTokenVerifier::new(config.firebase_project_id.clone()),
    };
    log::info!("🔐 Verifying Firebase ID tokens for project '{}'", firebase.project_id());
    let verifier: Arc<dyn TokenVerifier> = Arc::new(firebase);

    let bind_addr = config.bind_addr();
    log::info!("🌐 Server starting on {}", bind_addr);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_addr);

    let cors_origins = config.cors_allowed_origins.clone();

    HttpServer::new(move || {
        let cors = if cors_origins.is_empty() {
            Cors::permissive()
        } else {
            cors_origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![
                    actix_web::http::header::AUTHORIZATION,
                    actix_web::http::header::CONTENT_TYPE,
                    actix_web::http::header::ACCEPT,
                ])
                .max_age(3600)
        };

        App::new()
            .app_data(store_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", api::swagger::ApiDoc::openapi()),
            )
            .configure(api::configure(Arc::clone(&verifier)))
    })
    .bind(bind_addr)?
    .run()
    .await
}
