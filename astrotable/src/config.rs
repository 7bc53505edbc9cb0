//! Stored defaults for loading and querying position tables.
//!
//! A config is a small JSON document, for example:
//!
//! ```json
//! {
//!   "name": "hipparcos_subset",
//!   "ra_column": "RAdeg",
//!   "dec_column": "DEdeg",
//!   "equinox": "J2000"
//! }
//! ```

use std::path::Path;

use astrometry::Equinox;
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::positioned::PositionedTable;
use crate::table::{Table, HEADER_NAME};

/// Header key recording the equinox of the position columns.
pub const HEADER_EQUINOX: &str = "EQUINOX";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Overrides the table name recorded in the header
    pub name: Option<String>,
    /// RA column; auto-detected when absent
    pub ra_column: Option<String>,
    /// Dec column; auto-detected when absent
    pub dec_column: Option<String>,
    /// Equinox of the equatorial positions; recorded in the table header and
    /// used as the default frame epoch for rotations
    pub equinox: Equinox,
}

impl TableConfig {
    /// Save to JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), TableError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, TableError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Equinox for a rotation, preferring an explicitly requested one.
    pub fn equinox_or(&self, requested: Option<Equinox>) -> Equinox {
        requested.unwrap_or(self.equinox)
    }

    /// Wrap `table`, recording the configured name and equinox in its header
    /// and designating the configured position columns.
    ///
    /// Columns not named here keep their auto-detected designation.
    pub fn apply(&self, mut table: Table) -> Result<PositionedTable, TableError> {
        if let Some(name) = &self.name {
            table.set_header(HEADER_NAME, name.clone());
        }
        table.set_header(HEADER_EQUINOX, self.equinox.to_string());

        let mut positioned = PositionedTable::new(table);
        if let Some(ra) = &self.ra_column {
            positioned.set_ra(ra)?;
        }
        if let Some(dec) = &self.dec_column {
            positioned.set_dec(dec)?;
        }
        Ok(positioned)
    }
}
