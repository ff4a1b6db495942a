//! HTTP inbound adapter exposing the marketplace REST endpoints.

pub mod adoption;
pub mod error;
pub mod health;
pub mod multipart;
pub mod pets;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod users;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

/// JSON extractor settings that report malformed bodies through the shared
/// error schema instead of actix's plain-text default.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| Error::invalid_request(format!("Invalid JSON body: {err}")).into())
}

/// Register every `/api` handler on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use pet_adoption::inbound::http::api_routes;
///
/// let app = App::new().service(web::scope("/api").configure(api_routes));
/// ```
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(web::PayloadConfig::new(adoption::MAX_DONATION_BYTES))
        .service(users::signup)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(pets::search_pets)
        .service(adoption::donate)
        .service(adoption::apply)
        .service(adoption::approve_application)
        .service(adoption::remove_donation)
        .service(adoption::delete_pet)
        .service(adoption::my_adoptions)
        .service(adoption::my_applications)
        .service(adoption::my_donations);
}
