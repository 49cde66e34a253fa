//! # cardtrail-domain
//!
//! Pure domain model for the cardtrail movement tracker.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Boards** and **Cards** as decoded from the remote service
//! - Define **Raw actions** (the heterogeneous change-events the service emits)
//! - Define **Locations** and **Movement records** (the normalized output)
//! - Define **Cache entries** and their freshness rule
//! - Contain the action normalizer and the dedup identity key
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod board;
pub mod cache;
pub mod location;
pub mod movement;
pub mod normalize;
