//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: process-local store used when no database is configured
//! - **password**: Argon2id password hashing
//! - **uploads**: filesystem storage for donated pet images
//!
//! Adapters translate between domain types and infrastructure
//! representations. Lifecycle decisions stay in the domain.

pub mod memory;
pub mod password;
pub mod persistence;
pub mod uploads;
