//! Position-aware tables for astronomical catalogs.
//!
//! Builds on [`astrometry`] to give a simple column store RA/Dec semantics:
//!
//! - [`table`]: typed columns, aliases, header metadata, closure filtering and
//!   CSV ingestion
//! - [`positioned`]: RA/Dec designation, sexagesimal decoding, cone search and
//!   combined field/condition/cone selection
//! - [`config`]: JSON defaults for table name and position columns
//!
//! The `astroquery` binary exposes the same operations on the command line.

pub mod config;
pub mod error;
pub mod positioned;
pub mod table;

pub use config::{TableConfig, HEADER_EQUINOX};
pub use error::TableError;
pub use positioned::{
    auto_detect_position_columns, cone_from_triplet, PositionedTable, RowCondition,
    SEPARATION_COLUMN,
};
pub use table::{Column, ColumnData, ColumnKind, FieldSelection, Row, Table, Value};
