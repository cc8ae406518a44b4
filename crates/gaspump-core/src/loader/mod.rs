//! Batch loading of scraped stations into the relational store.
//!
//! A batch runs in one transaction: for every record the city label is parsed,
//! the municipality is resolved (created if unknown), and the station is
//! upserted on its (name, address, operator) key. Any error rolls the whole
//! batch back; records without a name or address are skipped.
//!
//! Expected tables:
//! - `Provinces(province_id, province_name)`
//! - `Municipalities(municipality_id, municipality_name, province_id)`
//! - `gas_stations(station_id, station_name, address, latitude, longitude,
//!   municipality_id, operator_id)`

pub mod city;
pub mod error;
pub mod input;
pub mod store;

pub use city::{parse_city, CityParts};
pub use error::LoaderError;
pub use input::{load_scraped_stations, parse_scraped_stations};
pub use store::{resolve_municipality, upsert_station, MunicipalityRef, UpsertOutcome};

use std::path::Path;

use sqlx::any::AnyPoolOptions;
use sqlx::{AnyConnection, AnyPool};
use tracing::{error, info, warn};

use crate::config::{DatabaseConfig, LoaderConfig};
use crate::models::ScrapedStation;

/// Counts from a committed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub municipalities_created: usize,
}

impl LoadSummary {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Skipped => self.skipped += 1,
        }
    }
}

pub struct StationLoader {
    pool: AnyPool,
    config: LoaderConfig,
}

impl StationLoader {
    pub fn new(pool: AnyPool, config: LoaderConfig) -> Self {
        Self { pool, config }
    }

    /// Open a single-connection pool; a batch only ever uses one connection.
    pub async fn connect(database: &DatabaseConfig, config: LoaderConfig) -> Result<Self, LoaderError> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect(&database.url)
            .await?;
        Ok(Self::new(pool, config))
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Read and validate `path`, then load it as one batch.
    pub async fn load_file(&self, path: &Path) -> Result<LoadSummary, LoaderError> {
        let stations = load_scraped_stations(path)?;
        self.load(&stations).await
    }

    /// Upsert every station in one transaction.
    ///
    /// Commits once after the last record. On any error the transaction is
    /// rolled back and the error returned; nothing from the batch persists.
    pub async fn load(&self, stations: &[ScrapedStation]) -> Result<LoadSummary, LoaderError> {
        let mut tx = self.pool.begin().await?;

        match process_batch(&mut tx, stations, self.config.operator_id).await {
            Ok(summary) => {
                tx.commit().await?;
                info!(
                    inserted = summary.inserted,
                    updated = summary.updated,
                    skipped = summary.skipped,
                    municipalities_created = summary.municipalities_created,
                    "Station batch committed"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, "Station batch failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Close the pool, releasing its connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

async fn process_batch(
    conn: &mut AnyConnection,
    stations: &[ScrapedStation],
    operator_id: i64,
) -> Result<LoadSummary, LoaderError> {
    let mut summary = LoadSummary::default();

    for station in stations {
        let city = parse_city(station.city.as_deref());
        let municipality = resolve_municipality(
            conn,
            city.municipality.as_deref(),
            city.province.as_deref(),
        )
        .await?;
        if municipality.created {
            summary.municipalities_created += 1;
        }

        let outcome = upsert_station(conn, station, municipality.municipality_id, operator_id).await?;
        summary.record(outcome);
    }

    Ok(summary)
}


#[cfg(test)]
mod tests {
    use super::test_support::{count_rows, memory_pool};
    use super::*;

    fn scraped(name: &str, address: &str, lat: f64, lon: f64, city: &str) -> ScrapedStation {
        ScrapedStation {
            name: Some(name.to_string()),
            address: Some(address.to_string()),
            latitude: Some(lat),
            longitude: Some(lon),
            city: Some(city.to_string()),
        }
    }

    async fn loader() -> StationLoader {
        StationLoader::new(memory_pool().await, LoaderConfig::default())
    }

    #[tokio::test]
    async fn test_load_batch_commits() {
        let loader = loader().await;
        sqlx::query("INSERT INTO Provinces (province_name) VALUES ('Lisboa')")
            .execute(loader.pool())
            .await
            .unwrap();

        let summary = loader
            .load(&[
                scraped("Galp", "Av. 1", 38.8, -9.38, "Lisboa - Sintra"),
                scraped("BP", "Rua 2", 38.79, -9.39, "Lisboa - Sintra"),
                scraped("Prio", "Rua 3", 41.15, -8.61, "Porto"),
                ScrapedStation {
                    name: Some("Nameless".to_string()),
                    ..Default::default()
                },
            ])
            .await
            .unwrap();

        assert_eq!(
            summary,
            LoadSummary {
                inserted: 3,
                updated: 0,
                skipped: 1,
                municipalities_created: 2,
            }
        );
        assert_eq!(count_rows(loader.pool(), "gas_stations").await, 3);

        let (province_id,): (Option<i64>,) = sqlx::query_as(
            "SELECT province_id FROM Municipalities WHERE municipality_name = 'Sintra'",
        )
        .fetch_one(loader.pool())
        .await
        .unwrap();
        assert_eq!(province_id, Some(1));
    }

    #[tokio::test]
    async fn test_reload_updates_in_place() {
        let loader = loader().await;
        loader
            .load(&[scraped("Galp", "Av. 1", 38.8, -9.38, "Lisboa - Sintra")])
            .await
            .unwrap();

        let summary = loader
            .load(&[scraped("Galp", "Av. 1", 38.85, -9.35, "Porto")])
            .await
            .unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.inserted, 0);

        let rows: Vec<(f64, f64, String)> = sqlx::query_as(
            "SELECT s.latitude, s.longitude, m.municipality_name \
             FROM gas_stations s JOIN Municipalities m ON m.municipality_id = s.municipality_id",
        )
        .fetch_all(loader.pool())
        .await
        .unwrap();
        assert_eq!(rows, vec![(38.85, -9.35, "Porto".to_string())]);
    }

    #[tokio::test]
    async fn test_station_without_city_has_no_municipality() {
        let loader = loader().await;
        let station = ScrapedStation {
            city: None,
            ..scraped("Galp", "Av. 1", 38.8, -9.38, "")
        };
        loader.load(&[station]).await.unwrap();

        let (municipality_id,): (Option<i64>,) =
            sqlx::query_as("SELECT municipality_id FROM gas_stations")
                .fetch_one(loader.pool())
                .await
                .unwrap();
        assert_eq!(municipality_id, None);
        assert_eq!(count_rows(loader.pool(), "Municipalities").await, 0);
    }

    #[tokio::test]
    async fn test_constraint_violation_rolls_back_batch() {
        let loader = loader().await;
        loader
            .load(&[
                scraped("Galp", "Av. 1", 38.8, -9.38, "Lisboa - Sintra"),
                scraped("BP", "Rua 2", 41.15, -8.61, "Porto"),
            ])
            .await
            .unwrap();

        let stations_before = count_rows(loader.pool(), "gas_stations").await;
        let municipalities_before = count_rows(loader.pool(), "Municipalities").await;

        // The bad record comes last and its municipality already exists, so
        // the batch only fails on the NOT NULL column.
        let broken = ScrapedStation {
            latitude: None,
            ..scraped("Repsol", "Rua 9", 0.0, -8.0, "Porto")
        };
        let err = loader
            .load(&[
                scraped("Galp", "Av. 1", 10.5, 10.5, "Lisboa - Sintra"),
                scraped("Cepsa", "Rua 4", 40.2, -8.4, "Coimbra"),
                broken,
            ])
            .await
            .unwrap_err();

        match &err {
            LoaderError::Database(sqlx::Error::Database(db)) => {
                assert!(
                    db.message().contains("NOT NULL constraint failed: gas_stations.latitude"),
                    "unexpected database error: {}",
                    db.message()
                );
            }
            other => panic!("expected a constraint violation, got {:?}", other),
        }

        assert_eq!(count_rows(loader.pool(), "gas_stations").await, stations_before);
        assert_eq!(
            count_rows(loader.pool(), "Municipalities").await,
            municipalities_before
        );
        let (lat,): (f64,) =
            sqlx::query_as("SELECT latitude FROM gas_stations WHERE station_name = 'Galp'")
                .fetch_one(loader.pool())
                .await
                .unwrap();
        assert_eq!(lat, 38.8);
    }

    #[tokio::test]
    async fn test_configured_operator_id_is_used() {
        let pool = memory_pool().await;
        let loader = StationLoader::new(pool, LoaderConfig { operator_id: 11 });
        loader
            .load(&[scraped("Galp", "Av. 1", 38.8, -9.38, "Porto")])
            .await
            .unwrap();

        let (operator_id,): (i64,) = sqlx::query_as("SELECT operator_id FROM gas_stations")
            .fetch_one(loader.pool())
            .await
            .unwrap();
        assert_eq!(operator_id, 11);
    }

    #[tokio::test]
    async fn test_load_file_rejects_non_array_before_database() {
        use std::io::Write;

        let loader = loader().await;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "Galp"}}"#).unwrap();

        let err = loader.load_file(file.path()).await.unwrap_err();
        assert!(matches!(err, LoaderError::NotAnArray));
        assert_eq!(count_rows(loader.pool(), "gas_stations").await, 0);
    }
}
