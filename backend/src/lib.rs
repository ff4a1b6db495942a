//! Pet adoption marketplace backend.
//!
//! Donors list pets, adopters apply, and donors approve one application per
//! pet. The crate is laid out hexagonally: [`domain`] holds the rules and
//! ports, [`inbound`] the HTTP adapter, [`outbound`] storage and hashing
//! adapters, and [`middleware`] request tracing.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
