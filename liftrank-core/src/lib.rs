//! liftrank core: record normalization, canonical snapshots and the query
//! engines behind the percentile ranking.
//!
//! - `data`: raw ingestion, the normalizer, schema checks, snapshot store
//! - `domain`: lifts, filter criteria, user input, outcomes
//! - `engine`: filter, percentile, distribution and group comparison
//! - `cache`: TTL caches for the snapshot and filtered views
//! - `service`: the request/response entry point used by front ends

pub mod cache;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod export;
pub mod service;

pub use config::LiftrankConfig;
pub use service::{Assessment, RankingService, Report, ServiceError};
