//! Row-level operations against the station schema.
//!
//! Every function takes the connection of an open transaction; none of them
//! commit. Queries use `?` placeholders so they run unchanged on MySQL and
//! SQLite through the `Any` driver.

use sqlx::AnyConnection;
use tracing::debug;

use crate::models::ScrapedStation;

use super::LoaderError;

/// Ids a station's municipality resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MunicipalityRef {
    pub municipality_id: Option<i64>,
    pub province_id: Option<i64>,
    /// True when resolution inserted a new municipality row.
    pub created: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// Missing name or address.
    Skipped,
}

/// Find a municipality by exact name, creating it if unknown.
///
/// A new municipality is linked to the province of the given name when one
/// exists; provinces are never created here.
pub async fn resolve_municipality(
    conn: &mut AnyConnection,
    municipality: Option<&str>,
    province: Option<&str>,
) -> Result<MunicipalityRef, LoaderError> {
    let Some(name) = municipality.filter(|m| !m.is_empty()) else {
        return Ok(MunicipalityRef::default());
    };

    let existing: Option<(i64, Option<i64>)> = sqlx::query_as(
        "SELECT municipality_id, province_id FROM Municipalities WHERE municipality_name = ?",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((municipality_id, province_id)) = existing {
        return Ok(MunicipalityRef {
            municipality_id: Some(municipality_id),
            province_id,
            created: false,
        });
    }

    let province_id = match province.filter(|p| !p.is_empty()) {
        Some(province_name) => find_province(conn, province_name).await?,
        None => None,
    };

    let result =
        sqlx::query("INSERT INTO Municipalities (municipality_name, province_id) VALUES (?, ?)")
            .bind(name)
            .bind(province_id)
            .execute(&mut *conn)
            .await?;
    // SQLite through the Any driver does not report the generated id.
    let municipality_id = match result.last_insert_id() {
        Some(id) => id,
        None => inserted_municipality_id(conn, name).await?,
    };

    debug!(municipality = name, municipality_id, ?province_id, "Municipality created");
    Ok(MunicipalityRef {
        municipality_id: Some(municipality_id),
        province_id,
        created: true,
    })
}

/// Id of the newest municipality row with this name, read back inside the
/// same transaction as the insert.
async fn inserted_municipality_id(conn: &mut AnyConnection, name: &str) -> Result<i64, LoaderError> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT municipality_id FROM Municipalities WHERE municipality_name = ? \
         ORDER BY municipality_id DESC LIMIT 1",
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(|(id,)| id)
        .ok_or(LoaderError::MissingInsertId("Municipalities"))
}

async fn find_province(conn: &mut AnyConnection, name: &str) -> Result<Option<i64>, LoaderError> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT province_id FROM Provinces WHERE province_name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(row.map(|(id,)| id))
}

/// Insert a station, or update the coordinates and municipality of the row
/// already keyed by (name, address, operator).
pub async fn upsert_station(
    conn: &mut AnyConnection,
    station: &ScrapedStation,
    municipality_id: Option<i64>,
    operator_id: i64,
) -> Result<UpsertOutcome, LoaderError> {
    let Some((name, address)) = station.natural_key() else {
        return Ok(UpsertOutcome::Skipped);
    };

    let existing: Option<(i64,)> = sqlx::query_as(
        "SELECT station_id FROM gas_stations \
         WHERE station_name = ? AND address = ? AND operator_id = ?",
    )
    .bind(name)
    .bind(address)
    .bind(operator_id)
    .fetch_optional(&mut *conn)
    .await?;

    match existing {
        Some((station_id,)) => {
            sqlx::query(
                "UPDATE gas_stations SET latitude = ?, longitude = ?, municipality_id = ? \
                 WHERE station_id = ?",
            )
            .bind(station.latitude)
            .bind(station.longitude)
            .bind(municipality_id)
            .bind(station_id)
            .execute(&mut *conn)
            .await?;
            Ok(UpsertOutcome::Updated)
        }
        None => {
            sqlx::query(
                "INSERT INTO gas_stations \
                 (station_name, address, latitude, longitude, municipality_id, operator_id) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(name)
            .bind(address)
            .bind(station.latitude)
            .bind(station.longitude)
            .bind(municipality_id)
            .bind(operator_id)
            .execute(&mut *conn)
            .await?;
            Ok(UpsertOutcome::Inserted)
        }
    }
}
