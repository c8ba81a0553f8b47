//! Conference registration API.
//!
//! Attendee details are validated, sanitized and written to a single
//! `registrations` table through the [`Gateway`], which also serves lookups
//! by email and the admin listing.

pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod store;
pub mod validation;

pub use config::Config;
pub use gateway::{Gateway, GatewayError};
pub use models::{NewRegistration, Registration};
pub use store::{MemoryStore, RegistrationStore};

pub type Result<T> = std::result::Result<T, error::Error>;
