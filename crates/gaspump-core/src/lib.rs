//! Core library for gaspump.
//!
//! Two independent pieces live here:
//!
//! - [`cache::StationCache`]: pulls the station list from the remote API and
//!   keeps it in memory for a short freshness window, serving the last good
//!   snapshot (plus an error message) when a refresh fails.
//! - [`loader::StationLoader`]: upserts scraped station records, together with
//!   their municipality references, into the relational store in a single
//!   transaction.
//!
//! [`views`] holds the data-shaping helpers the map and table pages consume.

pub mod api;
pub mod cache;
pub mod config;
pub mod loader;
pub mod models;
pub mod views;

pub use api::{ApiError, StationApiClient};
pub use cache::{StationCache, StationSource, StationsOutcome};
pub use config::{CacheConfig, ConfigError, DatabaseConfig, LoaderConfig};
pub use loader::{LoadSummary, LoaderError, StationLoader};
pub use models::{ScrapedStation, StationRecord};
