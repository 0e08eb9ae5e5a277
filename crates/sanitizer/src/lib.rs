//! Client for the external PDF sanitization service.

pub mod api;

pub use api::{CallbackUrls, Sanitizer, SanitizerApi, SanitizerError};
