//! Utility functions for code generation and URL validation.
//!
//! - [`code_generator`] - Short code generation and custom code validation
//! - [`url_validator`] - Absolute URL checks for submitted long URLs

pub mod code_generator;
pub mod url_validator;
