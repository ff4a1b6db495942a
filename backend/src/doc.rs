//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer, the DTO
//! and domain schemas they exchange, and the `session_id` cookie scheme.
//! Swagger UI serves it at `/docs` in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    AdoptionHistoryEntry, ApplicationHistoryEntry, ApplicationStatus, DonationHistoryEntry, Error,
    ErrorCode, Pet, PetStatus, ReceivedApplication, User,
};
use crate::inbound::http::adoption::{
    ApplyRequest, ApproveRequest, DeletePetRequest, MessageResponse, RemoveDonationRequest,
};
use crate::inbound::http::pets::PetsResponse;
use crate::inbound::http::session::SESSION_COOKIE;
use crate::inbound::http::users::{
    LoginRequest, LoginResponse, LoginUser, SignupRequest, SignupResponse,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE,
                "Session cookie issued by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Pet adoption marketplace API",
        description = "Listings, adoption applications and session-authenticated accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::signup,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::pets::search_pets,
        crate::inbound::http::adoption::donate,
        crate::inbound::http::adoption::apply,
        crate::inbound::http::adoption::approve_application,
        crate::inbound::http::adoption::remove_donation,
        crate::inbound::http::adoption::delete_pet,
        crate::inbound::http::adoption::my_adoptions,
        crate::inbound::http::adoption::my_applications,
        crate::inbound::http::adoption::my_donations,
        crate::inbound::http::uploads::serve_upload,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Pet,
        PetStatus,
        ApplicationStatus,
        AdoptionHistoryEntry,
        ApplicationHistoryEntry,
        DonationHistoryEntry,
        ReceivedApplication,
        SignupRequest,
        SignupResponse,
        LoginRequest,
        LoginResponse,
        LoginUser,
        PetsResponse,
        ApplyRequest,
        ApproveRequest,
        RemoveDonationRequest,
        DeletePetRequest,
        MessageResponse,
    )),
    tags(
        (name = "users", description = "Signup, login and the current account"),
        (name = "pets", description = "Catalogue search"),
        (name = "adoption", description = "Donations, applications and approvals"),
        (name = "uploads", description = "Stored pet photos"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn schema_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected object schema for {name}"),
        }
    }

    #[rstest]
    #[case("Pet", &["id", "status", "donated_by", "price", "created_at"])]
    #[case("Error", &["code", "error"])]
    #[case("PetsResponse", &["pets", "total", "page", "per_page", "total_pages"])]
    fn schemas_expose_expected_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let present = schema_fields(name);
        for field in fields {
            assert!(present.iter().any(|p| p == field), "{name} lacks {field}");
        }
    }

    #[rstest]
    #[case("/api/pets")]
    #[case("/api/approve-application")]
    #[case("/api/my-donations")]
    #[case("/uploads/{file}")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "{path} missing");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
