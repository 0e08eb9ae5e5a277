//! In-memory job registry.
//!
//! [`JobRegistry`] is the single source of truth for job state. It is backed
//! by a sharded concurrent map: every mutation of one id holds that entry's
//! shard lock for the whole check-and-set, so transitions for the same id are
//! serialized while distinct ids proceed in parallel.
//!
//! The registry is volatile; nothing survives a restart.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::CoreError;
use crate::job::{JobOutcome, JobRecord};
use crate::types::{JobId, Timestamp};

/// Concurrency-safe map of job id to [`JobRecord`].
///
/// Construct once at startup and share via `Arc`.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: DashMap<JobId, JobRecord>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new `processing` record.
    ///
    /// Fails with [`CoreError::DuplicateId`] if `id` is already present.
    pub fn create(&self, id: JobId, original_name: &str) -> Result<JobRecord, CoreError> {
        match self.jobs.entry(id) {
            Entry::Occupied(entry) => Err(CoreError::DuplicateId(entry.key().clone())),
            Entry::Vacant(entry) => {
                let record = JobRecord::new(entry.key().clone(), original_name);
                entry.insert(record.clone());
                Ok(record)
            }
        }
    }

    /// Snapshot of the record for `id`.
    pub fn get(&self, id: &JobId) -> Result<JobRecord, CoreError> {
        self.jobs
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| CoreError::job_not_found(id))
    }

    /// Move a `processing` record into the terminal state described by
    /// `outcome` and return the updated snapshot.
    ///
    /// - [`CoreError::NotFound`] if `id` is unknown.
    /// - [`CoreError::InvalidTransition`] if the record is already terminal;
    ///   the stored record is left untouched.
    pub fn transition(&self, id: &JobId, outcome: JobOutcome) -> Result<JobRecord, CoreError> {
        let mut entry = self
            .jobs
            .get_mut(id)
            .ok_or_else(|| CoreError::job_not_found(id))?;

        let record = entry.value_mut();
        if record.status.is_terminal() {
            return Err(CoreError::InvalidTransition {
                id: id.clone(),
                from: record.status,
            });
        }

        record.apply(outcome);
        Ok(record.clone())
    }

    /// Number of tracked jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Remove terminal records last updated before `cutoff`.
    ///
    /// `processing` records are never evicted. Returns the removed records so
    /// the caller can release their stored artifacts.
    pub fn evict_terminal_before(&self, cutoff: Timestamp) -> Vec<JobRecord> {
        let mut evicted = Vec::new();
        self.jobs.retain(|_, record| {
            let expired = record.status.is_terminal() && record.updated_at < cutoff;
            if expired {
                evicted.push(record.clone());
            }
            !expired
        });
        evicted
    }
}
