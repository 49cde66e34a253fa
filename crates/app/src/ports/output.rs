//! Output ports: durable destinations for movement records.

use std::collections::HashSet;
use std::future::Future;

use cardtrail_domain::error::TrackerError;
use cardtrail_domain::movement::{IdentityKey, MovementRecord};

/// Read side of a durable output, used for dedup.
pub trait MovementLog {
    /// Identity keys of every record already persisted.
    ///
    /// Returns `Ok(None)` when the output does not exist yet.
    fn existing_keys(
        &self,
    ) -> impl Future<Output = Result<Option<HashSet<IdentityKey>>, TrackerError>> + Send;
}

/// Append-only durable output.
///
/// Sinks perform no dedup of their own; callers filter through the
/// [`Deduplicator`](crate::services::dedup::Deduplicator) first.
pub trait MovementSink {
    /// Append `records` without rewriting what is already there.
    fn append(
        &self,
        records: &[MovementRecord],
    ) -> impl Future<Output = Result<(), TrackerError>> + Send;
}

/// A disabled sink.
impl<T: MovementSink + Sync> MovementSink for Option<T> {
    async fn append(&self, records: &[MovementRecord]) -> Result<(), TrackerError> {
        match self {
            Some(sink) => sink.append(records).await,
            None => Ok(()),
        }
    }
}

/// Two sinks written in order; the second is skipped if the first fails.
impl<A, B> MovementSink for (A, B)
where
    A: MovementSink + Sync,
    B: MovementSink + Sync,
{
    async fn append(&self, records: &[MovementRecord]) -> Result<(), TrackerError> {
        self.0.append(records).await?;
        self.1.append(records).await
    }
}
