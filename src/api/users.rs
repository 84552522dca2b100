use actix_web::{web, HttpResponse, ResponseError};
use futures::StreamExt;

use crate::{
    database::UserStore,
    models::Claims,
    services::user_service,
    utils::AppError,
};

/// Largest `/store_user` body accepted; MongoDB refuses documents above 16 MiB.
const MAX_PROFILE_BODY: usize = 16 * 1024 * 1024;

#[utoipa::path(
    post,
    path = "/store_user",
    tag = "Users",
    request_body(content = serde_json::Value, description = "Flat JSON object merged into the caller's profile"),
    responses(
        (status = 200, description = "Profile stored", body = user_service::StoreUserResponse),
        (status = 400, description = "Missing claims data, invalid or oversized body", body = crate::utils::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::utils::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::utils::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn store_user(
    claims: web::ReqData<Claims>,
    store: web::Data<dyn UserStore>,
    payload: web::Payload,
) -> HttpResponse {
    log::info!("📝 POST /store_user - uid: {}", claims.uid);

    let result = match read_body(payload, MAX_PROFILE_BODY).await {
        Ok(body) => match user_service::parse_profile_fields(&body) {
            Ok(fields) => user_service::store_user(store.get_ref(), &claims, fields).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => {
            log::info!("✅ Profile stored for {}", claims.uid);
            HttpResponse::Ok().json(response)
        }
        Err(e) => failure("store_user", &claims, e),
    }
}

#[utoipa::path(
    post,
    path = "/get_user",
    tag = "Users",
    responses(
        (status = 200, description = "Stored profile, `_id` as a string", body = serde_json::Value),
        (status = 401, description = "Unauthorized", body = crate::utils::ErrorResponse),
        (status = 404, description = "User not found", body = crate::utils::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::utils::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_user(claims: web::ReqData<Claims>, store: web::Data<dyn UserStore>) -> HttpResponse {
    log::info!("👤 POST /get_user - uid: {}", claims.uid);

    match user_service::get_user(store.get_ref(), &claims).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => failure("get_user", &claims, e),
    }
}

/// Collects the request body, failing with a 400 once it grows past `limit`.
async fn read_body(mut payload: web::Payload, limit: usize) -> Result<web::BytesMut, AppError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::InvalidData(e.to_string()))?;
        if body.len() + chunk.len() > limit {
            return Err(AppError::InvalidData(format!(
                "request body exceeds {} bytes",
                limit
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn failure(route: &str, claims: &Claims, err: AppError) -> HttpResponse {
    if err.status_code().is_server_error() {
        log::error!("❌ /{} failed for {}: {}", route, claims.uid, err);
    } else {
        log::warn!("⚠️ /{} rejected for {}: {}", route, claims.uid, err);
    }
    err.error_response()
}
