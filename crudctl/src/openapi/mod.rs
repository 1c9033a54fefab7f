//! OpenAPI document for the record API, served at `/openapi.json` and rendered at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Bearer token issued by `POST /login`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token from `POST /login`. Include it in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::login,
        api::handlers::records::list_records,
        api::handlers::records::create_record,
        api::handlers::records::update_record,
        api::handlers::records::delete_record,
    ),
    components(schemas(
        api::models::auth::LoginRequest,
        api::models::auth::LoginResponse,
        api::models::records::RecordResponse,
        api::models::records::RecordPayload,
        api::models::records::RecordCreatedResponse,
        api::models::records::MessageResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "authentication", description = "Operator login"),
        (name = "records", description = "Managed records (name, age, city)"),
    ),
    info(
        title = "crudctl API",
        version = "1.0.0",
        description = "Record management API. Every `/users` endpoint requires a bearer token from `POST /login`.",
    )
)]
pub struct ApiDoc;
