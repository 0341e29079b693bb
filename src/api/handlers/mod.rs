//! HTTP request handlers.

pub mod health;
pub mod redirect;
pub mod shorten;

pub use health::{health_handler, welcome_handler};
pub use redirect::redirect_handler;
pub use shorten::{custom_handler, shorten_handler};
