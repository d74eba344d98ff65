use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult, Statement, Value};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::AppState;
use crate::db::BACKEND;
use crate::error::{AppError, AppResult};
use crate::routes::resolve_sensor_type;
use crate::sensor::{parse_timestamp, Reading, ReadingPayload, SensorType};

/// Fixed greeting at the service root
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Greeting", body = String, content_type = "text/html"),
    ),
    tag = "root"
)]
pub async fn root() -> Html<&'static str> {
    Html("Hello, World!")
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Order rows by `value` or `timestamp`; anything else is ignored
    #[serde(rename = "order-by")]
    pub order_by: Option<String>,
    /// Inclusive lower bound on timestamp (`YYYY-MM-DD HH:MM:SS`)
    pub start_date: Option<String>,
    /// Inclusive upper bound on timestamp (`YYYY-MM-DD HH:MM:SS`)
    pub end_date: Option<String>,
}

/// Build the list SELECT for one sensor table.
///
/// Date filters compose with AND and are bound as parameters. The table
/// name and ORDER BY column come only from fixed allow-lists; an
/// unrecognized `order-by` value is silently ignored.
///
/// # Errors
///
/// Returns `BadRequest` if a date filter does not match the wire format.
pub fn build_list_query(
    sensor: SensorType,
    query: &ListQuery,
) -> AppResult<(String, Vec<Value>)> {
    let mut sql = format!("SELECT id, value, unit, timestamp FROM {}", sensor.table());
    let mut filters: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(raw) = query.start_date.as_deref() {
        let start = parse_timestamp(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid start_date: {raw:?}")))?;
        filters.push("timestamp >= ?");
        values.push(start.into());
    }
    if let Some(raw) = query.end_date.as_deref() {
        let end = parse_timestamp(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid end_date: {raw:?}")))?;
        filters.push("timestamp <= ?");
        values.push(end.into());
    }

    if !filters.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&filters.join(" AND "));
    }

    match query.order_by.as_deref() {
        Some("value") => sql.push_str(" ORDER BY value"),
        Some("timestamp") => sql.push_str(" ORDER BY timestamp"),
        _ => {}
    }

    Ok((sql, values))
}

async fn fetch_reading(
    db: &DatabaseConnection,
    sensor: SensorType,
    id: i32,
) -> AppResult<Option<Reading>> {
    let sql = format!(
        "SELECT id, value, unit, timestamp FROM {} WHERE id = ?",
        sensor.table()
    );
    let row = db
        .query_one(Statement::from_sql_and_values(BACKEND, sql, [id.into()]))
        .await?;
    Ok(row
        .map(|r| Reading::from_query_result(&r, ""))
        .transpose()?)
}

/// Count readings in one sensor table
#[utoipa::path(
    get,
    path = "/api/{sensor_type}/count",
    params(
        ("sensor_type" = String, Path, description = "One of temperature, humidity, light"),
    ),
    responses(
        (status = 200, description = "Row count", body = CountResponse),
        (status = 404, description = "Invalid sensor type"),
    ),
    tag = "readings"
)]
pub async fn get_count(
    State(state): State<AppState>,
    Path(sensor_type): Path<String>,
) -> AppResult<Json<CountResponse>> {
    let sensor = resolve_sensor_type(&sensor_type)?;

    let sql = format!("SELECT COUNT(*) AS count FROM {}", sensor.table());
    let row = state
        .db
        .query_one(Statement::from_string(BACKEND, sql))
        .await?
        .ok_or_else(|| AppError::Internal("COUNT returned no rows".to_string()))?;
    let count: i64 = row.try_get("", "count")?;

    Ok(Json(CountResponse { count }))
}

/// List readings with optional date window and ordering
#[utoipa::path(
    get,
    path = "/api/{sensor_type}",
    params(
        ("sensor_type" = String, Path, description = "One of temperature, humidity, light"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Readings retrieved successfully", body = Vec<Reading>),
        (status = 400, description = "Malformed date filter"),
        (status = 404, description = "Invalid sensor type"),
    ),
    tag = "readings"
)]
pub async fn list_readings(
    State(state): State<AppState>,
    Path(sensor_type): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Reading>>> {
    let sensor = resolve_sensor_type(&sensor_type)?;
    let (sql, values) = build_list_query(sensor, &query)?;

    let rows = state
        .db
        .query_all(Statement::from_sql_and_values(BACKEND, sql, values))
        .await?;
    let readings = rows
        .iter()
        .map(|row| Reading::from_query_result(row, ""))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(readings))
}

/// Insert one reading
#[utoipa::path(
    post,
    path = "/api/{sensor_type}",
    params(
        ("sensor_type" = String, Path, description = "One of temperature, humidity, light"),
    ),
    request_body = ReadingPayload,
    responses(
        (status = 200, description = "Created reading with assigned id", body = Reading),
        (status = 400, description = "Malformed timestamp"),
        (status = 404, description = "Invalid sensor type"),
    ),
    tag = "readings"
)]
pub async fn create_reading(
    State(state): State<AppState>,
    Path(sensor_type): Path<String>,
    Json(payload): Json<ReadingPayload>,
) -> AppResult<Json<Reading>> {
    let sensor = resolve_sensor_type(&sensor_type)?;
    let timestamp = payload
        .resolve_timestamp()
        .map_err(|raw| AppError::BadRequest(format!("Invalid timestamp: {raw:?}")))?;

    let sql = format!(
        "INSERT INTO {} (value, unit, timestamp) VALUES (?, ?, ?)",
        sensor.table()
    );
    let result = state
        .db
        .execute(Statement::from_sql_and_values(
            BACKEND,
            sql,
            [
                payload.value.into(),
                payload.unit.clone().into(),
                timestamp.into(),
            ],
        ))
        .await?;

    let id = i32::try_from(result.last_insert_id())
        .map_err(|_| AppError::Internal("Assigned id out of range".to_string()))?;

    Ok(Json(Reading {
        id,
        value: payload.value,
        unit: payload.unit,
        timestamp,
    }))
}

/// Get one reading by id
#[utoipa::path(
    get,
    path = "/api/{sensor_type}/{id}",
    params(
        ("sensor_type" = String, Path, description = "One of temperature, humidity, light"),
        ("id" = i32, Path, description = "Reading id"),
    ),
    responses(
        (status = 200, description = "Reading retrieved successfully", body = Reading),
        (status = 404, description = "Invalid sensor type or no such reading"),
    ),
    tag = "readings"
)]
pub async fn get_reading(
    State(state): State<AppState>,
    Path((sensor_type, id)): Path<(String, i32)>,
) -> AppResult<Json<Reading>> {
    let sensor = resolve_sensor_type(&sensor_type)?;

    let reading = fetch_reading(&state.db, sensor, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No reading with id {id}")))?;

    Ok(Json(reading))
}

/// Replace value, unit, and timestamp of one reading
#[utoipa::path(
    put,
    path = "/api/{sensor_type}/{id}",
    params(
        ("sensor_type" = String, Path, description = "One of temperature, humidity, light"),
        ("id" = i32, Path, description = "Reading id"),
    ),
    request_body = ReadingPayload,
    responses(
        (status = 200, description = "Updated reading", body = Reading),
        (status = 400, description = "Malformed timestamp"),
        (status = 404, description = "Invalid sensor type or no such reading"),
    ),
    tag = "readings"
)]
pub async fn update_reading(
    State(state): State<AppState>,
    Path((sensor_type, id)): Path<(String, i32)>,
    Json(payload): Json<ReadingPayload>,
) -> AppResult<Json<Reading>> {
    let sensor = resolve_sensor_type(&sensor_type)?;
    let timestamp = payload
        .resolve_timestamp()
        .map_err(|raw| AppError::BadRequest(format!("Invalid timestamp: {raw:?}")))?;

    // Existence check first; an UPDATE that changes nothing reports zero
    // affected rows on MySQL and would read as a false 404.
    fetch_reading(&state.db, sensor, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No reading with id {id}")))?;

    let sql = format!(
        "UPDATE {} SET value = ?, unit = ?, timestamp = ? WHERE id = ?",
        sensor.table()
    );
    state
        .db
        .execute(Statement::from_sql_and_values(
            BACKEND,
            sql,
            [
                payload.value.into(),
                payload.unit.clone().into(),
                timestamp.into(),
                id.into(),
            ],
        ))
        .await?;

    Ok(Json(Reading {
        id,
        value: payload.value,
        unit: payload.unit,
        timestamp,
    }))
}

/// Delete one reading by id
#[utoipa::path(
    delete,
    path = "/api/{sensor_type}/{id}",
    params(
        ("sensor_type" = String, Path, description = "One of temperature, humidity, light"),
        ("id" = i32, Path, description = "Reading id"),
    ),
    responses(
        (status = 200, description = "Reading deleted", body = DeleteResponse),
        (status = 404, description = "Invalid sensor type or no such reading"),
    ),
    tag = "readings"
)]
pub async fn delete_reading(
    State(state): State<AppState>,
    Path((sensor_type, id)): Path<(String, i32)>,
) -> AppResult<Json<DeleteResponse>> {
    let sensor = resolve_sensor_type(&sensor_type)?;

    let sql = format!("DELETE FROM {} WHERE id = ?", sensor.table());
    let result = state
        .db
        .execute(Statement::from_sql_and_values(BACKEND, sql, [id.into()]))
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("No reading with id {id}")));
    }

    Ok(Json(DeleteResponse {
        message: format!("Reading {id} deleted"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(order_by: Option<&str>, start: Option<&str>, end: Option<&str>) -> ListQuery {
        ListQuery {
            order_by: order_by.map(String::from),
            start_date: start.map(String::from),
            end_date: end.map(String::from),
        }
    }

    #[test]
    fn bare_list_query_has_no_filters() {
        let (sql, values) =
            build_list_query(SensorType::Temperature, &query(None, None, None)).unwrap();
        assert_eq!(sql, "SELECT id, value, unit, timestamp FROM temperature");
        assert!(values.is_empty());
    }

    #[test]
    fn date_filters_compose_with_and() {
        let (sql, values) = build_list_query(
            SensorType::Humidity,
            &query(None, Some("2024-05-01 00:00:00"), Some("2024-05-02 00:00:00")),
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT id, value, unit, timestamp FROM humidity \
             WHERE timestamp >= ? AND timestamp <= ?"
        );
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn start_date_alone_produces_single_bound_filter() {
        let (sql, values) = build_list_query(
            SensorType::Light,
            &query(None, Some("2024-05-01 00:00:00"), None),
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT id, value, unit, timestamp FROM light WHERE timestamp >= ?"
        );
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn recognized_order_by_is_appended() {
        let (sql, _) =
            build_list_query(SensorType::Temperature, &query(Some("value"), None, None)).unwrap();
        assert!(sql.ends_with(" ORDER BY value"));

        let (sql, _) = build_list_query(
            SensorType::Temperature,
            &query(Some("timestamp"), None, None),
        )
        .unwrap();
        assert!(sql.ends_with(" ORDER BY timestamp"));
    }

    #[test]
    fn unrecognized_order_by_is_silently_ignored() {
        let (sql, _) = build_list_query(
            SensorType::Temperature,
            &query(Some("id; DROP TABLE temperature"), None, None),
        )
        .unwrap();
        assert_eq!(sql, "SELECT id, value, unit, timestamp FROM temperature");
    }

    #[test]
    fn malformed_date_filter_is_a_bad_request() {
        let err = build_list_query(
            SensorType::Temperature,
            &query(None, Some("not-a-date"), None),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
