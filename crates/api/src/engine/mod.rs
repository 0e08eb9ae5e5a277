//! Job lifecycle services.
//!
//! - [`SubmissionDispatcher`]: creates jobs and hands documents to the
//!   sanitizer.
//! - [`CallbackIngestion`]: applies the sanitizer's asynchronous outcome.
//! - [`query`]: read-only status and artifact lookups.

pub mod dispatcher;
pub mod ingest;
pub mod query;

pub use dispatcher::SubmissionDispatcher;
pub use ingest::{CallbackIngestion, IngestOutcome};
