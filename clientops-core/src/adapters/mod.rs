//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for every store port

pub mod duckdb;
