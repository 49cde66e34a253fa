//! # cardtrail-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `TrackerApi`: read-only access to the remote board service
//!   - `CacheStore`: time-bounded cache of remote listings
//!   - `MovementLog`: identity keys of records already persisted
//!   - `MovementSink`: append-only durable output
//! - Define **use-cases** as service structs:
//!   - `CachedFetcher`: cache-first remote reads
//!   - `MovementAggregator`: boards → cards → actions → sorted movements
//!   - `Deduplicator`: strip records already persisted
//!   - `TrackingService`: aggregate, dedup, then write to every sink
//! - Orchestrate domain objects without knowing *how* IO works
//!
//! ## Dependency rule
//! Depends on `cardtrail-domain` only (plus `futures-util` for joins).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
