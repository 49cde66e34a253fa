//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod aggregator;
pub mod dedup;
pub mod fetcher;
pub mod tracking;

#[cfg(test)]
pub(crate) mod fakes;
