//! Sensor Readings API - CRUD service over temperature, humidity, and light readings
//!
//! This library exposes the core modules for testing and reuse.

pub mod common;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod seed;
pub mod sensor;
