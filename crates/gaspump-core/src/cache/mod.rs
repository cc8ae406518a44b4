//! In-memory caching of the station list.
//!
//! This module provides the `StationCache`, which holds a single snapshot of
//! the station API's response. A snapshot is served as-is for five minutes;
//! after that the next call refreshes it. A failed refresh never discards the
//! last good snapshot: callers get the stale records together with the error.
//!
//! There is no background refresh. The cache is owned by its host and
//! mutated through `&mut self`; hosts that poll from several tasks wrap it in
//! their own lock.

pub mod manager;
pub mod outcome;

pub use manager::{CachedSnapshot, StationCache, StationSource};
pub use outcome::StationsOutcome;
