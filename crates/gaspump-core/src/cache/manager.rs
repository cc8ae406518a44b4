use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::config::CacheConfig;
use crate::models::StationRecord;

use super::StationsOutcome;

/// Anything that can produce the full station list.
///
/// `StationApiClient` is the production implementation.
#[allow(async_fn_in_trait)]
pub trait StationSource {
    async fn fetch_stations(&self) -> Result<Vec<StationRecord>, ApiError>;
}

/// The cache's single held snapshot.
#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    pub records: Vec<StationRecord>,
    pub fetched_at: DateTime<Utc>,
    /// Message from the most recent failed refresh, cleared by the next
    /// successful one.
    pub last_error: Option<String>,
}

impl CachedSnapshot {
    pub fn new(records: Vec<StationRecord>) -> Self {
        Self {
            records,
            fetched_at: Utc::now(),
            last_error: None,
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    pub fn is_fresh(&self, freshness: Duration) -> bool {
        self.age() < freshness
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age().num_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

pub struct StationCache<S> {
    source: S,
    freshness: Duration,
    snapshot: Option<CachedSnapshot>,
}

impl<S: StationSource> StationCache<S> {
    pub fn new(source: S, config: &CacheConfig) -> Self {
        Self::with_freshness(source, config.freshness)
    }

    pub fn with_freshness(source: S, freshness: Duration) -> Self {
        Self {
            source,
            freshness,
            snapshot: None,
        }
    }

    pub fn snapshot(&self) -> Option<&CachedSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the current station list, refreshing it first if the snapshot
    /// is missing or older than the freshness window.
    ///
    /// Never fails: a refresh error degrades to the last good records plus
    /// the error, or to no records plus the error if nothing was ever fetched.
    pub async fn get_stations(&mut self) -> StationsOutcome {
        if let Some(snapshot) = &self.snapshot {
            if snapshot.is_fresh(self.freshness) {
                debug!(count = snapshot.records.len(), "Serving cached stations");
                return StationsOutcome::Fresh(snapshot.records.clone());
            }
        }

        match self.source.fetch_stations().await {
            Ok(records) => {
                info!(count = records.len(), "Station snapshot refreshed");
                let outcome = StationsOutcome::Fresh(records.clone());
                self.snapshot = Some(CachedSnapshot::new(records));
                outcome
            }
            Err(e) => {
                let error = format!("Unable to fetch station data: {}", e);
                match self.snapshot.as_mut() {
                    Some(snapshot) => {
                        warn!(error = %e, age = %snapshot.age_display(), "Station fetch failed, serving stale snapshot");
                        snapshot.last_error = Some(error.clone());
                        StationsOutcome::Stale {
                            records: snapshot.records.clone(),
                            error,
                        }
                    }
                    None => {
                        warn!(error = %e, "Station fetch failed, no snapshot available");
                        StationsOutcome::Unavailable { error }
                    }
                }
            }
        }
    }
}
