//! OpenAPI document for the adoption API.
//!
//! Swagger UI serves it at `/docs` in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ErrorCode;
use crate::inbound::http::auth::{
    AcceptedResponse, LoginRequest, LoginResponse, PasswordResetBody, SessionResponse,
    SessionUserResponse, SignupRequest,
};
use crate::inbound::http::navigation::NavigationResponse;
use crate::inbound::http::pets::{
    ContactLinksResponse, CreatePetRequest, InstitutionBody, PetListResponse, PetResponse,
    UpdatePetRequest,
};
use crate::inbound::http::schemas::ErrorSchema;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Pet adoption API",
        description = "Browse pets up for adoption, contact their institutions and manage listings."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    paths(
        crate::inbound::http::pets::list_pets,
        crate::inbound::http::pets::get_pet,
        crate::inbound::http::pets::pet_contact,
        crate::inbound::http::pets::create_pet,
        crate::inbound::http::pets::update_pet,
        crate::inbound::http::pets::delete_pet,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::password_reset,
        crate::inbound::http::auth::current_session,
        crate::inbound::http::navigation::navigation,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCode,
        PetResponse,
        PetListResponse,
        InstitutionBody,
        CreatePetRequest,
        UpdatePetRequest,
        ContactLinksResponse,
        LoginRequest,
        LoginResponse,
        SignupRequest,
        PasswordResetBody,
        AcceptedResponse,
        SessionResponse,
        SessionUserResponse,
        NavigationResponse,
    )),
    tags(
        (name = "pets", description = "Pet listings"),
        (name = "auth", description = "Sign in, sign up and password reset"),
        (name = "session", description = "Current session"),
        (name = "navigation", description = "Route gate for protected pages"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn schema_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(object)) => object.properties.keys().cloned().collect(),
            _ => panic!("expected object schema for {name}"),
        }
    }

    #[rstest]
    #[case("crate.domain.Error", &["code", "message", "traceId", "details"])]
    #[case("PetResponse", &["id", "name", "age", "breed", "vaccines", "imageUrl", "institution"])]
    #[case("LoginResponse", &["user", "redirectTo"])]
    fn schemas_use_wire_names(#[case] name: &str, #[case] fields: &[&str]) {
        let actual = schema_fields(name);
        for field in fields {
            assert!(actual.iter().any(|f| f == field), "{name} lacks {field}");
        }
    }

    #[rstest]
    #[case("/api/v1/pets")]
    #[case("/api/v1/pets/{id}/contact")]
    #[case("/api/v1/auth/login")]
    #[case("/api/v1/session")]
    #[case("/api/v1/navigation")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
