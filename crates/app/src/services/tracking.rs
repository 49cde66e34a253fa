//! Tracking service: aggregate, dedup, then append to every output.

use cardtrail_domain::error::TrackerError;
use cardtrail_domain::id::BoardId;

use crate::ports::{CacheStore, MovementLog, MovementSink, TrackerApi};
use crate::services::aggregator::MovementAggregator;
use crate::services::dedup::Deduplicator;

/// Which boards a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    AllBoards,
    Board(BoardId),
}

/// Outcome of one tracking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingReport {
    /// Movement records produced by aggregation.
    pub fetched: usize,
    /// Records that were new and got appended.
    pub appended: usize,
}

/// End-to-end batch: one aggregation, one dedup pass, one append per sink.
///
/// The dedup runs once, before any sink is written, so every sink receives
/// the same set of new records.
pub struct TrackingService<A, C, L, S> {
    aggregator: MovementAggregator<A, C>,
    dedup: Deduplicator<L>,
    sink: S,
}

impl<A, C, L, S> TrackingService<A, C, L, S>
where
    A: TrackerApi + Sync,
    C: CacheStore + Sync,
    L: MovementLog + Sync,
    S: MovementSink + Sync,
{
    pub fn new(aggregator: MovementAggregator<A, C>, log: L, sink: S) -> Self {
        Self {
            aggregator,
            dedup: Deduplicator::new(log),
            sink,
        }
    }

    /// Borrow the aggregator, e.g. to print a history without writing it.
    pub fn aggregator(&self) -> &MovementAggregator<A, C> {
        &self.aggregator
    }

    /// Run the pipeline for `scope`.
    ///
    /// # Errors
    ///
    /// Propagates aggregation failures (nothing is written then) and sink
    /// failures. Dedup read failures are recovered.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, scope: Scope) -> Result<TrackingReport, TrackerError> {
        let records = match &scope {
            Scope::AllBoards => self.aggregator.aggregate_all().await?,
            Scope::Board(board_id) => self.aggregator.aggregate_board(board_id).await?,
        };
        let fetched = records.len();

        let fresh = self.dedup.filter_new(records).await;
        if fresh.is_empty() {
            tracing::info!(fetched, "no new movements to append");
            return Ok(TrackingReport {
                fetched,
                appended: 0,
            });
        }

        self.sink.append(&fresh).await?;
        tracing::info!(fetched, appended = fresh.len(), "appended new movements");

        Ok(TrackingReport {
            fetched,
            appended: fresh.len(),
        })
    }
}
