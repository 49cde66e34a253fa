//! Movement aggregator: boards → cards → actions → sorted movement records.

use futures_util::future::try_join_all;
use serde::Deserialize;

use cardtrail_domain::action::RawEvent;
use cardtrail_domain::board::{Board, Card};
use cardtrail_domain::cache::CacheKey;
use cardtrail_domain::error::TrackerError;
use cardtrail_domain::id::BoardId;
use cardtrail_domain::movement::{MovementRecord, sort_newest_first};
use cardtrail_domain::normalize::normalize_all;

use crate::ports::{ApiRequest, CacheStore, TrackerApi};
use crate::services::fetcher::CachedFetcher;

/// How a board's history is fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// List the board's cards, then fetch each card's actions.
    #[default]
    PerCard,
    /// Fetch the board's action feed in one request.
    PerBoard,
}

/// Collects movement records for one board or every accessible board.
///
/// Every remote read goes through the cache. The first failure aborts the
/// whole aggregation; partial results are never returned.
pub struct MovementAggregator<A, C> {
    fetcher: CachedFetcher<A, C>,
    strategy: FetchStrategy,
}

impl<A: TrackerApi + Sync, C: CacheStore + Sync> MovementAggregator<A, C> {
    /// Create an aggregator using the default per-card strategy.
    pub fn new(api: A, cache: C) -> Self {
        Self {
            fetcher: CachedFetcher::new(api, cache),
            strategy: FetchStrategy::default(),
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Boards accessible to the credential.
    ///
    /// # Errors
    ///
    /// Propagates remote failures and undecodable listings.
    pub async fn boards(&self) -> Result<Vec<Board>, TrackerError> {
        self.fetcher
            .fetch_as(&CacheKey::boards(), &ApiRequest::member_boards(), "boards")
            .await
    }

    /// Cards of one board.
    ///
    /// # Errors
    ///
    /// Propagates remote failures and undecodable listings.
    pub async fn cards(&self, board_id: &BoardId) -> Result<Vec<Card>, TrackerError> {
        self.fetcher
            .fetch_as(
                &CacheKey::board_cards(board_id),
                &ApiRequest::board_cards(board_id),
                "cards",
            )
            .await
    }

    /// Movement records of one board, newest first.
    ///
    /// # Errors
    ///
    /// Propagates the first remote failure, undecodable listing, or
    /// malformed action.
    #[tracing::instrument(skip(self, board_id), fields(board_id = %board_id))]
    pub async fn aggregate_board(
        &self,
        board_id: &BoardId,
    ) -> Result<Vec<MovementRecord>, TrackerError> {
        let mut records = self.collect_board(board_id).await?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    /// Movement records of every accessible board, newest first.
    ///
    /// Boards are fetched concurrently.
    ///
    /// # Errors
    ///
    /// Propagates the first failure of any board.
    #[tracing::instrument(skip(self))]
    pub async fn aggregate_all(&self) -> Result<Vec<MovementRecord>, TrackerError> {
        let boards = self.boards().await?;
        tracing::info!(count = boards.len(), "found boards");

        let per_board = try_join_all(boards.iter().map(|board| async move {
            tracing::info!(board = %board.name, "processing board");
            self.collect_board(&board.id).await
        }))
        .await?;

        let mut records: Vec<MovementRecord> = per_board.into_iter().flatten().collect();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn collect_board(&self, board_id: &BoardId) -> Result<Vec<MovementRecord>, TrackerError> {
        match self.strategy {
            FetchStrategy::PerCard => self.collect_per_card(board_id).await,
            FetchStrategy::PerBoard => self.collect_board_feed(board_id).await,
        }
    }

    async fn collect_per_card(
        &self,
        board_id: &BoardId,
    ) -> Result<Vec<MovementRecord>, TrackerError> {
        let cards = self.cards(board_id).await?;
        tracing::debug!(count = cards.len(), "found cards on board");

        let mut records = Vec::new();
        for card in cards {
            tracing::debug!(card = %card.name, "processing card");
            let actions: Vec<RawEvent> = self
                .fetcher
                .fetch_as(
                    &CacheKey::card_actions(&card.id),
                    &ApiRequest::card_actions(&card.id),
                    "card actions",
                )
                .await?;
            records.extend(
                normalize_all(&actions)?
                    .into_iter()
                    .map(|record| record.with_card(card.id.clone(), card.name.clone())),
            );
        }
        Ok(records)
    }

    async fn collect_board_feed(
        &self,
        board_id: &BoardId,
    ) -> Result<Vec<MovementRecord>, TrackerError> {
        let actions: Vec<RawEvent> = self
            .fetcher
            .fetch_as(
                &CacheKey::board_actions(board_id),
                &ApiRequest::board_actions(board_id),
                "board actions",
            )
            .await?;
        Ok(normalize_all(&actions)?)
    }
}
