use crate::models::StationRecord;

/// Result of asking the cache for stations.
///
/// The records are always owned copies; mutating them never touches the
/// cached snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum StationsOutcome {
    /// Served from a fresh snapshot or a successful refresh.
    Fresh(Vec<StationRecord>),
    /// Refresh failed; these are the last successfully fetched records.
    Stale {
        records: Vec<StationRecord>,
        error: String,
    },
    /// Refresh failed and nothing has ever been fetched.
    Unavailable { error: String },
}

impl StationsOutcome {
    pub fn records(&self) -> &[StationRecord] {
        match self {
            StationsOutcome::Fresh(records) => records,
            StationsOutcome::Stale { records, .. } => records,
            StationsOutcome::Unavailable { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            StationsOutcome::Fresh(_) => None,
            StationsOutcome::Stale { error, .. } => Some(error),
            StationsOutcome::Unavailable { error } => Some(error),
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, StationsOutcome::Fresh(_))
    }

    /// Split into `(records, error)`; records are empty only when nothing
    /// was ever fetched.
    pub fn into_parts(self) -> (Vec<StationRecord>, Option<String>) {
        match self {
            StationsOutcome::Fresh(records) => (records, None),
            StationsOutcome::Stale { records, error } => (records, Some(error)),
            StationsOutcome::Unavailable { error } => (Vec::new(), Some(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> StationRecord {
        StationRecord {
            station: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_into_parts() {
        let fresh = StationsOutcome::Fresh(vec![record("a")]);
        assert_eq!(fresh.into_parts(), (vec![record("a")], None));

        let stale = StationsOutcome::Stale {
            records: vec![record("b")],
            error: "down".to_string(),
        };
        assert_eq!(stale.error(), Some("down"));
        assert_eq!(stale.records().len(), 1);

        let unavailable = StationsOutcome::Unavailable {
            error: "down".to_string(),
        };
        assert!(unavailable.records().is_empty());
        assert!(!unavailable.is_fresh());
        assert_eq!(unavailable.into_parts(), (Vec::new(), Some("down".to_string())));
    }
}
