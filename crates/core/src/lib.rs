//! Domain core for the PDF sanitization job tracker.
//!
//! - [`registry::JobRegistry`]: the in-memory source of truth for job state.
//! - [`job`]: the job record and its `processing -> completed | failed`
//!   state machine.
//! - [`storage`]: the artifact storage seam for sanitized output.

pub mod error;
pub mod job;
pub mod registry;
pub mod storage;
pub mod types;
