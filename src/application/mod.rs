//! Application layer services and background workers.
//!
//! Services consume repository traits and provide the API the HTTP handlers
//! and the admin CLI call.
//!
//! - [`services::mapping_service::MappingService`] - Mapping creation, lookup and sweeping
//! - [`expiry_worker`] - Periodic expiry sweep task

pub mod expiry_worker;
pub mod services;
