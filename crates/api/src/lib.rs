//! pdfshield API server library.
//!
//! Exposes the building blocks (config, state, error handling, job engine,
//! routes, WebSocket transport) so integration tests and the binary
//! entrypoint can both access them.

pub mod background;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod query;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
