//! Core domain entities.
//!
//! - [`Mapping`] - A stored short code to long URL association
//! - [`NewMapping`] - Input for creating a mapping

pub mod mapping;

pub use mapping::{Mapping, NewMapping};
