//! Tables with designated right ascension and declination columns.
//!
//! [`PositionedTable`] wraps a [`Table`] and remembers which columns hold sky
//! positions. Position columns may be numeric degrees or sexagesimal text
//! (`H:M:S` for RA, `D:M:S` for Dec, colon or space delimited); text is decoded
//! to degrees on demand.
//!
//! # Examples
//!
//! ```rust
//! use astrotable::{ColumnData, PositionedTable, Table};
//! use astrometry::Cone;
//! use ndarray::array;
//!
//! let mut table = Table::new("demo");
//! table.add_column("ra", ColumnData::Float(array![10.0, 10.2, 40.0]), Some("degree")).unwrap();
//! table.add_column("dec", ColumnData::Float(array![5.0, 5.1, -3.0]), Some("degree")).unwrap();
//!
//! let table = PositionedTable::new(table);
//! let nearby = table.select_where("*", None, Some(Cone::new(10.0, 5.0, 0.5))).unwrap();
//! assert_eq!(nearby.nrows(), 2);
//! assert!(nearby.contains("separation"));
//! ```

use std::ops::Deref;

use astrometry::angle::{detect_delimiter, sexagesimal_to_deg_many, SexagesimalUnit};
use astrometry::{
    cone_matches, cone_search, AstrometryError, Cone, ConeSearchMode, ConeSearchResult,
};
use ndarray::Array1;

use crate::error::TableError;
use crate::table::{ColumnData, ColumnKind, FieldSelection, Row, Table, HEADER_COMMENT};

/// Name of the derived column holding cone-search distances.
pub const SEPARATION_COLUMN: &str = "separation";

/// Candidate RA column names, in priority order.
const RA_CANDIDATES: [&str; 2] = ["ra", "RA"];

/// Candidate Dec column names, in priority order.
const DEC_CANDIDATES: [&str; 2] = ["dec", "DEC"];

/// Filter predicate over a table row.
pub type RowCondition<'c> = &'c dyn Fn(&Row<'_>) -> bool;

/// Find conventional RA and Dec columns in `table`.
///
/// Only the exact names `ra`/`RA` and `dec`/`DEC` are recognised, lower case
/// first.
pub fn auto_detect_position_columns(table: &Table) -> (Option<String>, Option<String>) {
    let find = |candidates: &[&str]| {
        candidates
            .iter()
            .find(|name| table.contains(name))
            .map(|name| name.to_string())
    };
    (find(&RA_CANDIDATES), find(&DEC_CANDIDATES))
}

/// Build a cone from a `(ra, dec, radius)` triplet.
pub fn cone_from_triplet(values: &[f64]) -> Result<Cone, TableError> {
    match values {
        &[ra, dec, radius] => Ok(Cone::new(ra, dec, radius)),
        _ => Err(TableError::Precondition(format!(
            "expecting cone as a triplet (ra, dec, r), got {} value(s)",
            values.len()
        ))),
    }
}

/// A [`Table`] with RA/Dec column designations.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedTable {
    table: Table,
    ra_name: Option<String>,
    dec_name: Option<String>,
}

impl PositionedTable {
    /// Wrap `table`, auto-detecting position columns.
    pub fn new(table: Table) -> Self {
        let (ra_name, dec_name) = auto_detect_position_columns(&table);
        log::debug!(
            "Position columns for '{}': ra={:?}, dec={:?}",
            table.name(),
            ra_name,
            dec_name
        );
        Self {
            table,
            ra_name,
            dec_name,
        }
    }

    /// Wrap `table` with explicit position columns.
    pub fn with_position_columns(table: Table, ra: &str, dec: &str) -> Result<Self, TableError> {
        let mut positioned = Self::new(table);
        positioned.set_ra(ra)?;
        positioned.set_dec(dec)?;
        Ok(positioned)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Mutable access to the underlying storage.
    ///
    /// Removing a designated column leaves a dangling designation; queries will
    /// then fail with `ColumnNotFound`.
    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn ra_name(&self) -> Option<&str> {
        self.ra_name.as_deref()
    }

    pub fn dec_name(&self) -> Option<&str> {
        self.dec_name.as_deref()
    }

    /// Designate the RA column.
    pub fn set_ra(&mut self, name: &str) -> Result<(), TableError> {
        self.ra_name = Some(self.existing(name)?);
        Ok(())
    }

    /// Designate the Dec column.
    pub fn set_dec(&mut self, name: &str) -> Result<(), TableError> {
        self.dec_name = Some(self.existing(name)?);
        Ok(())
    }

    /// RA column values, decoded from `H:M:S` text when `as_degrees` is set.
    ///
    /// Returns `Ok(None)` when no RA column is designated. Numeric columns, and
    /// any column when `as_degrees` is false, are returned as stored.
    pub fn get_ra(&self, as_degrees: bool) -> Result<Option<ColumnData>, TableError> {
        match &self.ra_name {
            Some(name) => self.decode(name, SexagesimalUnit::Hours, as_degrees).map(Some),
            None => Ok(None),
        }
    }

    /// Dec column values, decoded from `D:M:S` text when `as_degrees` is set.
    pub fn get_dec(&self, as_degrees: bool) -> Result<Option<ColumnData>, TableError> {
        match &self.dec_name {
            Some(name) => self.decode(name, SexagesimalUnit::Degrees, as_degrees).map(Some),
            None => Ok(None),
        }
    }

    /// RA in degrees as floats; fails if RA is not designated.
    pub fn ra_degrees(&self) -> Result<Array1<f64>, TableError> {
        let name = self.ra_name.as_deref().ok_or_else(not_designated)?;
        self.degrees(name, SexagesimalUnit::Hours)
    }

    /// Dec in degrees as floats; fails if Dec is not designated.
    pub fn dec_degrees(&self) -> Result<Array1<f64>, TableError> {
        let name = self.dec_name.as_deref().ok_or_else(not_designated)?;
        self.degrees(name, SexagesimalUnit::Degrees)
    }

    /// Cone search over the designated position columns.
    pub fn cone_search(
        &self,
        cone: &Cone,
        mode: ConeSearchMode,
    ) -> Result<ConeSearchResult, TableError> {
        let (ra, dec) = self.positions()?;
        Ok(cone_search(ra.view(), dec.view(), cone, mode)?)
    }

    /// Filter rows by `condition` and/or `cone`, keeping `fields`.
    ///
    /// `fields` is `*` or a comma/space separated list of names. With a cone,
    /// rows passing `condition` are further restricted to the cone, a
    /// `separation` column (degrees) is appended and the header `COMMENT`
    /// records the query. Position designations carry over when their column
    /// survives the projection.
    pub fn select_where(
        &self,
        fields: &str,
        condition: Option<RowCondition<'_>>,
        cone: Option<Cone>,
    ) -> Result<PositionedTable, TableError> {
        let selection = FieldSelection::parse(fields);

        let mut rows: Vec<usize> = match condition {
            Some(condition) => self
                .table
                .rows()
                .filter(|row| condition(row))
                .map(|row| row.index())
                .collect(),
            None => (0..self.table.nrows()).collect(),
        };

        let mut separation = None;
        if let Some(cone) = &cone {
            let (ra, dec) = self.positions()?;
            let ra: Array1<f64> = rows.iter().map(|&i| ra[i]).collect();
            let dec: Array1<f64> = rows.iter().map(|&i| dec[i]).collect();

            let (hits, distances) = cone_matches(ra.view(), dec.view(), cone)?;
            rows = hits.into_iter().map(|hit| rows[hit]).collect();
            separation = Some(distances);
        }

        let mut table = self.table.take_rows(&rows).select_fields(&selection)?;

        if let (Some(cone), Some(distances)) = (cone, separation) {
            if table.keys().any(|key| key == SEPARATION_COLUMN) {
                log::debug!("Replacing existing '{SEPARATION_COLUMN}' column");
                table.remove_column(SEPARATION_COLUMN)?;
            } else if let Some(target) = table.remove_alias(SEPARATION_COLUMN) {
                log::debug!("Dropping alias '{SEPARATION_COLUMN}' --> '{target}'");
            }
            table.add_column(SEPARATION_COLUMN, ColumnData::Float(distances), Some("degree"))?;
            table.set_header(
                HEADER_COMMENT,
                format!("SELECT {} FROM {} WHERE {}", fields, self.table.name(), cone),
            );
        }

        log::info!(
            "Selected {} of {} row(s) from '{}'",
            table.nrows(),
            self.table.nrows(),
            self.table.name()
        );

        Ok(self.derive(table))
    }

    /// Summary of header, size, position columns, aliases and columns.
    pub fn info(&self) -> String {
        let position = self.ra_name.as_deref().zip(self.dec_name.as_deref());
        self.table.render_info(position)
    }

    /// Wrap a table derived from this one, inheriting designations.
    fn derive(&self, table: Table) -> PositionedTable {
        let carry = |axis: &str, name: &Option<String>| match name {
            Some(name) if table.contains(name) => Some(name.clone()),
            Some(name) => {
                log::warn!("{axis} column '{name}' not in derived table, leaving it undesignated");
                None
            }
            None => None,
        };
        let ra_name = carry("RA", &self.ra_name);
        let dec_name = carry("Dec", &self.dec_name);

        PositionedTable {
            table,
            ra_name,
            dec_name,
        }
    }

    fn existing(&self, name: &str) -> Result<String, TableError> {
        if self.table.contains(name) {
            Ok(name.to_string())
        } else {
            Err(TableError::ColumnNotFound(name.to_string()))
        }
    }

    fn positions(&self) -> Result<(Array1<f64>, Array1<f64>), TableError> {
        if self.ra_name.is_none() || self.dec_name.is_none() {
            return Err(not_designated());
        }
        Ok((self.ra_degrees()?, self.dec_degrees()?))
    }

    fn degrees(&self, name: &str, unit: SexagesimalUnit) -> Result<Array1<f64>, TableError> {
        match self.decode(name, unit, true)?.to_f64() {
            Some(values) => Ok(values),
            None => Err(TableError::Precondition(format!(
                "column '{name}' could not be converted to degrees"
            ))),
        }
    }

    fn decode(
        &self,
        name: &str,
        unit: SexagesimalUnit,
        as_degrees: bool,
    ) -> Result<ColumnData, TableError> {
        let data = self.table.column(name)?;
        if !as_degrees || data.kind() == ColumnKind::Numeric {
            return Ok(data.clone());
        }

        let texts = data.as_text().unwrap_or_default();
        let Some(first) = texts.first() else {
            return Ok(ColumnData::Float(Array1::zeros(0)));
        };

        // The first row decides the delimiter for the whole column
        let delim = detect_delimiter(first).ok_or_else(|| AstrometryError::Format {
            input: first.clone(),
            reason: format!("{name} format not understood"),
        })?;
        log::debug!("Decoding column '{name}' as {unit:?} with delimiter {delim:?}");

        Ok(ColumnData::Float(sexagesimal_to_deg_many(texts, unit, delim)?))
    }
}

impl Deref for PositionedTable {
    type Target = Table;

    fn deref(&self) -> &Table {
        &self.table
    }
}

impl From<Table> for PositionedTable {
    fn from(table: Table) -> Self {
        Self::new(table)
    }
}

impl std::fmt::Display for PositionedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.info())
    }
}

fn not_designated() -> TableError {
    TableError::Precondition("coordinate columns not set".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn numeric_table() -> Table {
        let mut table = Table::new("field");
        table
            .add_column("id", ColumnData::Int(array![1, 2, 3, 4]), None)
            .unwrap();
        table
            .add_column(
                "ra",
                ColumnData::Float(array![100.0, 100.1, 101.0, 150.0]),
                Some("degree"),
            )
            .unwrap();
        table
            .add_column(
                "dec",
                ColumnData::Float(array![45.0, 45.0, 45.0, -20.0]),
                Some("degree"),
            )
            .unwrap();
        table
            .add_column("mag", ColumnData::Float(array![9.0, 14.0, 11.0, 8.0]), None)
            .unwrap();
        table
    }

    fn text(values: &[&str]) -> ColumnData {
        ColumnData::Text(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_auto_detect_prefers_lower_case() {
        let mut table = Table::new("t");
        table.add_column("RA", ColumnData::Float(array![1.0]), None).unwrap();
        table.add_column("ra", ColumnData::Float(array![2.0]), None).unwrap();
        table.add_column("DEC", ColumnData::Float(array![3.0]), None).unwrap();

        let (ra, dec) = auto_detect_position_columns(&table);
        assert_eq!(ra.as_deref(), Some("ra"));
        assert_eq!(dec.as_deref(), Some("DEC"));
    }

    #[test]
    fn test_auto_detect_is_exact() {
        let mut table = Table::new("t");
        table.add_column("Ra", ColumnData::Float(array![1.0]), None).unwrap();
        table.add_column("ra_deg", ColumnData::Float(array![1.0]), None).unwrap();
        assert_eq!(auto_detect_position_columns(&table), (None, None));
    }

    #[test]
    fn test_set_ra_requires_existing_column() {
        let mut table = PositionedTable::new(numeric_table());
        assert!(matches!(
            table.set_ra("alpha"),
            Err(TableError::ColumnNotFound(name)) if name == "alpha"
        ));
        assert_eq!(table.ra_name(), Some("ra"));

        table.set_dec("mag").unwrap();
        assert_eq!(table.dec_name(), Some("mag"));
    }

    #[test]
    fn test_get_ra_numeric_is_raw_column() {
        let mut table = PositionedTable::new(numeric_table());
        table.set_ra("ra").unwrap();
        let expected = table.column("ra").unwrap().clone();
        assert_eq!(table.get_ra(true).unwrap(), Some(expected.clone()));
        assert_eq!(table.get_ra(false).unwrap(), Some(expected));
    }

    #[test]
    fn test_get_without_designation() {
        let mut table = Table::new("t");
        table.add_column("x", ColumnData::Float(array![1.0]), None).unwrap();
        let table = PositionedTable::new(table);
        assert_eq!(table.get_ra(true).unwrap(), None);
        assert_eq!(table.get_dec(true).unwrap(), None);
        assert!(matches!(table.ra_degrees(), Err(TableError::Precondition(_))));
    }

    #[test]
    fn test_sexagesimal_columns() {
        let mut table = Table::new("sexa");
        table
            .add_column("RA", text(&["12:30:00", "00:00:00", "06:00:00"]), None)
            .unwrap();
        table
            .add_column("DEC", text(&["-10 30 00", "+00 00 00", "45 00 00"]), None)
            .unwrap();
        let table = PositionedTable::new(table);

        let ra = table.ra_degrees().unwrap();
        assert_relative_eq!(ra[0], 187.5, epsilon = 1e-10);
        assert_relative_eq!(ra[2], 90.0, epsilon = 1e-10);

        let dec = table.dec_degrees().unwrap();
        assert_relative_eq!(dec[0], -10.5, epsilon = 1e-10);
        assert_relative_eq!(dec[1], 0.0, epsilon = 1e-10);

        // Raw text when degrees are not requested
        assert_eq!(table.get_ra(false).unwrap().unwrap().kind(), ColumnKind::Textual);
    }

    #[test]
    fn test_unrecognised_text_format() {
        let mut table = Table::new("bad");
        table.add_column("ra", text(&["12h30m00s"]), None).unwrap();
        table.add_column("dec", text(&["+10d"]), None).unwrap();
        let table = PositionedTable::new(table);

        assert!(matches!(
            table.get_ra(true),
            Err(TableError::Astrometry(AstrometryError::Format { .. }))
        ));
    }

    #[test]
    fn test_cone_search_requires_both_columns() {
        let mut table = Table::new("t");
        table.add_column("ra", ColumnData::Float(array![1.0]), None).unwrap();
        let table = PositionedTable::new(table);

        let err = table
            .cone_search(&Cone::new(1.0, 0.0, 1.0), ConeSearchMode::Indices)
            .unwrap_err();
        assert!(matches!(err, TableError::Precondition(_)));
    }

    #[test]
    fn test_cone_search_modes() {
        let table = PositionedTable::new(numeric_table());
        let cone = Cone::new(100.0, 45.0, 0.8);

        let indices = table.cone_search(&cone, ConeSearchMode::Indices).unwrap();
        assert_eq!(indices, ConeSearchResult::Indices(vec![0, 1, 2]));

        let full = table
            .cone_search(&cone, ConeSearchMode::MaskAndDistances)
            .unwrap();
        assert_eq!(full.indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_select_cone_only() {
        let table = PositionedTable::new(numeric_table());
        let result = table
            .select_where("id,ra,dec", None, Some(Cone::new(100.0, 45.0, 0.5)))
            .unwrap();

        assert_eq!(result.nrows(), 2);
        assert_eq!(
            result.keys().collect::<Vec<_>>(),
            vec!["id", "ra", "dec", "separation"]
        );
        assert_eq!(result.column("id").unwrap(), &ColumnData::Int(array![1, 2]));
        assert_eq!(
            result.column_def("separation").unwrap().unit(),
            Some("degree")
        );
        assert_eq!(
            result.header().get("COMMENT").map(String::as_str),
            Some("SELECT id,ra,dec FROM field WHERE distance from (100.000, 45.000) <= 0.500")
        );
        assert_eq!(result.ra_name(), Some("ra"));
        assert_eq!(result.dec_name(), Some("dec"));
    }

    #[test]
    fn test_select_condition_and_cone() {
        let table = PositionedTable::new(numeric_table());
        let bright = |row: &Row<'_>| row.float("mag").is_some_and(|m| m < 12.0);
        let result = table
            .select_where("*", Some(&bright), Some(Cone::new(100.0, 45.0, 2.0)))
            .unwrap();

        // Row 1 fails the magnitude cut, row 3 is outside the cone
        assert_eq!(result.column("id").unwrap(), &ColumnData::Int(array![1, 3]));
        let sep = result.column(SEPARATION_COLUMN).unwrap().to_f64().unwrap();
        assert_eq!(sep[0], 0.0);
        assert_relative_eq!(sep[1], 0.7071022936883, epsilon = 1e-9);
    }

    #[test]
    fn test_select_condition_only() {
        let table = PositionedTable::new(numeric_table());
        let south = |row: &Row<'_>| row.float("dec").is_some_and(|d| d < 0.0);
        let result = table.select_where("id dec", Some(&south), None).unwrap();

        assert_eq!(result.nrows(), 1);
        assert!(!result.contains(SEPARATION_COLUMN));
        // RA was projected away
        assert_eq!(result.ra_name(), None);
        assert_eq!(result.dec_name(), Some("dec"));
    }

    #[test]
    fn test_select_without_filters_copies() {
        let table = PositionedTable::new(numeric_table());
        let copy = table.select_where("*", None, None).unwrap();
        assert_eq!(copy, table);
    }

    #[test]
    fn test_select_empty_cone() {
        let table = PositionedTable::new(numeric_table());
        let result = table
            .select_where("*", None, Some(Cone::new(300.0, -80.0, 1.0)))
            .unwrap();
        assert_eq!(result.nrows(), 0);
        assert!(result.contains(SEPARATION_COLUMN));
    }

    #[test]
    fn test_select_cone_keeps_column_behind_separation_alias() {
        let mut table = numeric_table();
        table.set_alias(SEPARATION_COLUMN, "mag").unwrap();
        let table = PositionedTable::new(table);

        let result = table
            .select_where("*", None, Some(Cone::new(100.0, 45.0, 0.5)))
            .unwrap();

        assert_eq!(
            result.keys().collect::<Vec<_>>(),
            vec!["id", "ra", "dec", "mag", SEPARATION_COLUMN]
        );
        assert_eq!(
            result.column("mag").unwrap(),
            &ColumnData::Float(array![9.0, 14.0])
        );
        assert!(result.aliases().is_empty());
        assert_eq!(
            result.column_def(SEPARATION_COLUMN).unwrap().unit(),
            Some("degree")
        );
    }

    #[test]
    fn test_select_cone_replaces_separation_column() {
        let mut table = numeric_table();
        table
            .add_column(SEPARATION_COLUMN, ColumnData::Float(Array1::from_elem(4, -1.0)), None)
            .unwrap();
        let table = PositionedTable::new(table);

        let result = table
            .select_where("*", None, Some(Cone::new(100.0, 45.0, 0.5)))
            .unwrap();

        assert_eq!(result.ncols(), 5);
        let sep = result.column(SEPARATION_COLUMN).unwrap().to_f64().unwrap();
        assert_eq!(sep[0], 0.0);
        assert!(sep.iter().all(|&d| d >= 0.0));
    }

    #[test]
    fn test_cone_from_triplet() {
        assert_eq!(
            cone_from_triplet(&[1.0, 2.0, 3.0]).unwrap(),
            Cone::new(1.0, 2.0, 3.0)
        );
        assert!(matches!(
            cone_from_triplet(&[1.0, 2.0]),
            Err(TableError::Precondition(_))
        ));
    }

    #[test]
    fn test_info_lists_positions() {
        let mut table = numeric_table();
        table.set_alias("alpha", "ra").unwrap();
        let table = PositionedTable::new(table);
        let info = table.info();

        assert!(info.contains("Table contains: 4 row(s) in 4 column(s)"));
        assert!(info.contains("Position coordinate columns: ra, dec"));
        assert!(info.contains("\t alpha --> ra"));
        assert_eq!(info, table.to_string());
    }
}
