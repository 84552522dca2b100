use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Profile Store API",
        version = "1.0.0",
        description = "Authenticated user-profile store.\n\n**Authentication:** profile endpoints require a Firebase ID token as `Authorization: Bearer <token>`.\n\nProfiles are schema-free: any JSON object sent to `/store_user` is merged into the caller's document."
    ),
    paths(
        crate::api::health::health_check,
        crate::api::users::store_user,
        crate::api::users::get_user,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::services::user_service::StoreUserResponse,
            crate::utils::ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health check."),
        (name = "Users", description = "Read and write the authenticated caller's profile."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Firebase ID token"))
                        .build()
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_profile_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/store_user"));
        assert!(doc.paths.paths.contains_key("/get_user"));
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }
}
