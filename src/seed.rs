use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement, Value};
use serde::Deserialize;

use crate::config::Config;
use crate::db::BACKEND;
use crate::sensor::{parse_timestamp, SensorType};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse seed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid timestamp in seed data: {0:?}")]
    Timestamp(String),

    #[error("Database error during seeding: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// One CSV record in file column order: timestamp, value, unit.
#[derive(Debug, Deserialize)]
struct SeedRecord(String, f64, String);

/// A parsed seed row ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedRow {
    pub value: f64,
    pub unit: String,
    pub timestamp: NaiveDateTime,
}

/// Parse seed CSV content. The header row is skipped; remaining rows are
/// read positionally as (timestamp, value, unit).
///
/// # Errors
///
/// Returns `SeedError` on any malformed record or timestamp.
pub fn parse_seed_records<R: Read>(reader: R) -> Result<Vec<SeedRow>, SeedError> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<SeedRecord>() {
        let SeedRecord(raw_timestamp, value, unit) = record?;
        let timestamp =
            parse_timestamp(&raw_timestamp).ok_or(SeedError::Timestamp(raw_timestamp))?;
        rows.push(SeedRow {
            value,
            unit,
            timestamp,
        });
    }
    Ok(rows)
}

/// Idempotent schema creation for one sensor table. The table name comes
/// only from the `SensorType` allow-list.
async fn create_table(db: &DatabaseConnection, sensor: SensorType) -> Result<(), SeedError> {
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (\
            id INT AUTO_INCREMENT PRIMARY KEY, \
            value FLOAT NOT NULL, \
            unit VARCHAR(10) NOT NULL, \
            timestamp DATETIME NOT NULL\
        )",
        sensor.table()
    );
    db.execute(Statement::from_string(BACKEND, sql)).await?;
    Ok(())
}

/// Bulk-insert parsed rows as (value, unit, timestamp) with bound parameters.
async fn insert_rows(
    db: &DatabaseConnection,
    sensor: SensorType,
    rows: &[SeedRow],
) -> Result<(), SeedError> {
    if rows.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["(?, ?, ?)"; rows.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} (value, unit, timestamp) VALUES {placeholders}",
        sensor.table()
    );

    let mut values: Vec<Value> = Vec::with_capacity(rows.len() * 3);
    for row in rows {
        values.push(row.value.into());
        values.push(row.unit.clone().into());
        values.push(row.timestamp.into());
    }

    db.execute(Statement::from_sql_and_values(BACKEND, sql, values))
        .await?;
    Ok(())
}

/// Seed all three sensor tables from CSV resources.
///
/// Runs once at startup, before the service accepts traffic. Any I/O,
/// parse, or store error is fatal. Re-running duplicates all seed rows;
/// there is no uniqueness constraint preventing it.
///
/// # Errors
///
/// Returns `SeedError` on the first failing table.
pub async fn seed_database(db: &DatabaseConnection, config: &Config) -> Result<(), SeedError> {
    for sensor in SensorType::ALL {
        create_table(db, sensor).await?;

        let path = Path::new(&config.seed_data_dir).join(format!("{}.csv", sensor.table()));
        let file = std::fs::File::open(&path).map_err(|source| SeedError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let rows = parse_seed_records(file)?;
        insert_rows(db, sensor, &rows).await?;

        tracing::info!(table = %sensor, rows = rows.len(), "Seeded table");
    }
    Ok(())
}
