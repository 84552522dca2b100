pub mod health;
pub mod swagger;
pub mod users;

use actix_web::web;
use std::sync::Arc;

use crate::{middleware::AuthMiddleware, services::TokenVerifier};

/// Registers the service routes. Profile routes sit behind [`AuthMiddleware`];
/// the `UserStore` is expected as `web::Data<dyn UserStore>` app data.
pub fn configure(verifier: Arc<dyn TokenVerifier>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.route("/health", web::get().to(health::health_check))
            .service(
                web::resource("/store_user")
                    .wrap(AuthMiddleware::new(Arc::clone(&verifier)))
                    .route(web::post().to(users::store_user)),
            )
            .service(
                web::resource("/get_user")
                    .wrap(AuthMiddleware::new(verifier))
                    .route(web::post().to(users::get_user)),
            );
    }
}
