//! Data Transfer Objects for API requests and responses.
//!
//! Field names follow the public JSON contract (`longUrl`, `newUrl`, ...).

pub mod health;
pub mod shorten;
