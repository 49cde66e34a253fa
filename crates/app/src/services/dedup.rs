//! Deduplicator: strips records that a durable output already holds.

use cardtrail_domain::movement::MovementRecord;

use crate::ports::MovementLog;

/// Filters candidate records against a [`MovementLog`].
///
/// Fails open: if the log cannot be read, every candidate is kept. A
/// duplicate row is preferred over losing a new one.
pub struct Deduplicator<L> {
    log: L,
}

impl<L: MovementLog + Sync> Deduplicator<L> {
    pub fn new(log: L) -> Self {
        Self { log }
    }

    /// Return the candidates whose identity key is not yet persisted,
    /// preserving their relative order.
    #[tracing::instrument(skip_all, fields(candidates = candidates.len()))]
    pub async fn filter_new(&self, candidates: Vec<MovementRecord>) -> Vec<MovementRecord> {
        let existing = match self.log.existing_keys().await {
            Ok(Some(existing)) => existing,
            Ok(None) => {
                tracing::debug!("no existing output, keeping every candidate");
                return candidates;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to read existing output, keeping every candidate");
                return candidates;
            }
        };

        let fresh: Vec<MovementRecord> = candidates
            .into_iter()
            .filter(|record| !existing.contains(&record.identity_key()))
            .collect();
        tracing::debug!(new = fresh.len(), "filtered against existing output");
        fresh
    }
}
