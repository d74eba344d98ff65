//! Unit tests for the CRUD surface that do not need a live MySQL instance.
//!
//! Run with: cargo test --test readings_unit_test

use sensor_readings_api::routes::readings::{build_list_query, ListQuery};
use sensor_readings_api::routes::resolve_sensor_type;
use sensor_readings_api::seed::parse_seed_records;
use sensor_readings_api::sensor::{parse_timestamp, Reading, SensorType};

#[test]
fn every_invalid_selector_is_rejected_before_store_access() {
    for raw in ["pressure", "Temperature", "TEMPERATURE", "", "42", "temp"] {
        assert!(
            resolve_sensor_type(raw).is_err(),
            "selector {raw:?} should have been rejected"
        );
    }
    for raw in ["temperature", "humidity", "light"] {
        assert!(resolve_sensor_type(raw).is_ok());
    }
}

#[test]
fn list_query_binds_date_filters_instead_of_interpolating() {
    let query = ListQuery {
        order_by: None,
        start_date: Some("2024-05-01 00:00:00".to_string()),
        end_date: Some("2024-05-02 00:00:00".to_string()),
    };
    let (sql, values) = build_list_query(SensorType::Temperature, &query).unwrap();

    // Dates never appear in SQL text, only as bound values.
    assert!(!sql.contains("2024-05-01"));
    assert!(sql.contains("timestamp >= ?"));
    assert!(sql.contains("timestamp <= ?"));
    assert_eq!(values.len(), 2);
}

#[test]
fn order_by_is_allow_listed() {
    let make = |order_by: &str| ListQuery {
        order_by: Some(order_by.to_string()),
        start_date: None,
        end_date: None,
    };

    let (sql, _) = build_list_query(SensorType::Light, &make("value")).unwrap();
    assert!(sql.ends_with("ORDER BY value"));

    // Unrecognized values never error and never reach the SQL text.
    for bogus in ["id", "unit", "value; DROP TABLE light", "VALUE"] {
        let (sql, _) = build_list_query(SensorType::Light, &make(bogus)).unwrap();
        assert_eq!(sql, "SELECT id, value, unit, timestamp FROM light");
    }
}

#[test]
fn seed_rows_map_csv_columns_to_insert_order() {
    let csv = "timestamp,value,unit\n\
               2024-05-01 00:00:00,18.4,C\n\
               2024-05-01 01:00:00,18.1,C\n\
               2024-05-01 02:00:00,17.8,C\n";
    let rows = parse_seed_records(csv.as_bytes()).unwrap();

    assert_eq!(rows.len(), 3);
    // CSV order is (timestamp, value, unit); row fields carry each into place.
    assert_eq!(rows[1].value, 18.1);
    assert_eq!(rows[1].unit, "C");
    assert_eq!(
        rows[1].timestamp,
        parse_timestamp("2024-05-01 01:00:00").unwrap()
    );
}

#[test]
fn reading_json_shape_matches_the_wire_contract() {
    let reading = Reading {
        id: 3,
        value: 47.6,
        unit: "%".to_string(),
        timestamp: parse_timestamp("2024-05-01 16:00:00").unwrap(),
    };
    let json = serde_json::to_value(&reading).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "id": 3,
            "value": 47.6,
            "unit": "%",
            "timestamp": "2024-05-01 16:00:00"
        })
    );
}
