//! In-memory column store backing the position-aware table.
//!
//! Named, ordered, typed columns with unit metadata, a header dictionary,
//! column aliases, row filtering through Rust closures and CSV ingestion.
//! There is no query language; conditions are predicates over a [`Row`] view.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;

use ndarray::Array1;

use crate::error::TableError;

/// Header key holding the table name.
pub const HEADER_NAME: &str = "NAME";

/// Header key holding a description of how the table was derived.
pub const HEADER_COMMENT: &str = "COMMENT";

/// Storage class of a column, as seen by position decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Textual,
}

/// Typed column values.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float(Array1<f64>),
    Int(Array1<i64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(values) => values.len(),
            Self::Int(values) => values.len(),
            Self::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Float(_) | Self::Int(_) => ColumnKind::Numeric,
            Self::Text(_) => ColumnKind::Textual,
        }
    }

    /// Numeric values widened to `f64`, or `None` for text.
    pub fn to_f64(&self) -> Option<Array1<f64>> {
        match self {
            Self::Float(values) => Some(values.clone()),
            Self::Int(values) => Some(values.mapv(|v| v as f64)),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Self::Text(values) => Some(values),
            _ => None,
        }
    }

    /// Value at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<Value<'_>> {
        match self {
            Self::Float(values) => values.get(index).map(|&v| Value::Float(v)),
            Self::Int(values) => values.get(index).map(|&v| Value::Int(v)),
            Self::Text(values) => values.get(index).map(|v| Value::Text(v)),
        }
    }

    /// New column holding the rows at `indices`, in that order.
    ///
    /// Panics if an index is out of range.
    pub fn take(&self, indices: &[usize]) -> Self {
        match self {
            Self::Float(values) => Self::Float(indices.iter().map(|&i| values[i]).collect()),
            Self::Int(values) => Self::Int(indices.iter().map(|&i| values[i]).collect()),
            Self::Text(values) => Self::Text(indices.iter().map(|&i| values[i].clone()).collect()),
        }
    }
}

/// A single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Float(f64),
    Int(i64),
    Text(&'a str),
}

impl std::fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
        }
    }
}

/// A named column with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
    unit: Option<String>,
    format: Option<String>,
    description: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
            unit: None,
            format: None,
            description: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Which columns a selection carries into its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelection {
    All,
    Named(Vec<String>),
}

impl FieldSelection {
    /// Parse `*`, a comma-separated list, or a space-separated list.
    pub fn parse(fields: &str) -> Self {
        let fields = fields.trim();
        if fields == "*" || fields.is_empty() {
            return Self::All;
        }

        let names: Vec<String> = if fields.contains(',') {
            fields
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect()
        } else {
            fields.split_whitespace().map(String::from).collect()
        };
        Self::Named(names)
    }
}

impl std::fmt::Display for FieldSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldSelection::All => write!(f, "*"),
            FieldSelection::Named(names) => write!(f, "{}", names.join(",")),
        }
    }
}

/// Read-only view of one table row, handed to filter predicates.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell in column `name` (aliases resolved).
    pub fn get(&self, name: &str) -> Option<Value<'a>> {
        self.table.column(name).ok()?.get(self.index)
    }

    /// Numeric cell widened to `f64`.
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Float(v) => Some(v),
            Value::Int(v) => Some(v as f64),
            Value::Text(_) => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&'a str> {
        match self.get(name)? {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Ordered collection of equal-length named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    aliases: BTreeMap<String, String>,
    header: BTreeMap<String, String>,
}

impl Table {
    /// Empty table with `NAME` set in its header.
    pub fn new(name: impl Into<String>) -> Self {
        let mut table = Self::default();
        table.header.insert(HEADER_NAME.to_string(), name.into());
        table
    }

    pub fn name(&self) -> &str {
        self.header.get(HEADER_NAME).map_or("", String::as_str)
    }

    pub fn header(&self) -> &BTreeMap<String, String> {
        &self.header
    }

    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.header.insert(key.into(), value.into());
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in storage order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Storage name behind `name`, which may be an alias.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// All aliases pointing at column `name`.
    pub fn reverse_alias(&self, name: &str) -> Vec<&str> {
        self.aliases
            .iter()
            .filter(|(_, target)| target.as_str() == name)
            .map(|(alias, _)| alias.as_str())
            .collect()
    }

    pub fn set_alias(
        &mut self,
        alias: impl Into<String>,
        column: impl Into<String>,
    ) -> Result<(), TableError> {
        let alias = alias.into();
        let column = column.into();
        if self.position(&column).is_none() {
            return Err(TableError::ColumnNotFound(column));
        }
        if self.position(&alias).is_some() {
            return Err(TableError::DuplicateColumn(alias));
        }
        self.aliases.insert(alias, column);
        Ok(())
    }

    pub fn remove_alias(&mut self, alias: &str) -> Option<String> {
        self.aliases.remove(alias)
    }

    /// True if `name` is a column or an alias of one.
    pub fn contains(&self, name: &str) -> bool {
        self.position(self.resolve_alias(name)).is_some()
    }

    pub fn column_def(&self, name: &str) -> Result<&Column, TableError> {
        self.position(self.resolve_alias(name))
            .map(|i| &self.columns[i])
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Result<&ColumnData, TableError> {
        self.column_def(name).map(Column::data)
    }

    /// Append a column, optionally tagging its unit.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        data: ColumnData,
        unit: Option<&str>,
    ) -> Result<(), TableError> {
        let mut column = Column::new(name, data);
        if let Some(unit) = unit {
            column = column.with_unit(unit);
        }
        self.push_column(column)
    }

    /// Append a fully described column.
    pub fn push_column(&mut self, column: Column) -> Result<(), TableError> {
        if self.contains(&column.name) {
            return Err(TableError::DuplicateColumn(column.name));
        }
        if !self.columns.is_empty() && column.data.len() != self.nrows() {
            return Err(TableError::LengthMismatch {
                column: column.name,
                expected: self.nrows(),
                found: column.data.len(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Remove a column along with every alias pointing at it.
    pub fn remove_column(&mut self, name: &str) -> Result<Column, TableError> {
        let storage = self.resolve_alias(name).to_string();
        let index = self
            .position(&storage)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))?;
        self.aliases.retain(|_, target| *target != storage);
        Ok(self.columns.remove(index))
    }

    /// Iterate over row views.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.nrows()).map(move |index| Row { table: self, index })
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.nrows()).then_some(Row { table: self, index })
    }

    /// Copy of the table holding only the rows at `indices`.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    data: c.data.take(indices),
                    unit: c.unit.clone(),
                    format: c.format.clone(),
                    description: c.description.clone(),
                })
                .collect(),
            aliases: self.aliases.clone(),
            header: self.header.clone(),
        }
    }

    /// Copy of the table projected onto `fields`.
    ///
    /// Named fields may be aliases. Aliases whose column is dropped are
    /// dropped too.
    pub fn select_fields(&self, fields: &FieldSelection) -> Result<Table, TableError> {
        let names = match fields {
            FieldSelection::All => return Ok(self.clone()),
            FieldSelection::Named(names) => names,
        };

        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let column = self.column_def(name)?;
            if columns.iter().any(|c: &Column| c.name == column.name) {
                continue;
            }
            columns.push(column.clone());
        }

        let aliases = self
            .aliases
            .iter()
            .filter(|(_, target)| columns.iter().any(|c| &c.name == *target))
            .map(|(alias, target)| (alias.clone(), target.clone()))
            .collect();

        Ok(Table {
            columns,
            aliases,
            header: self.header.clone(),
        })
    }

    /// Rows satisfying `predicate`, projected onto `fields`.
    pub fn select_where<F>(&self, fields: &FieldSelection, predicate: F) -> Result<Table, TableError>
    where
        F: Fn(&Row<'_>) -> bool,
    {
        let indices: Vec<usize> = self
            .rows()
            .filter(|row| predicate(row))
            .map(|row| row.index)
            .collect();
        log::debug!(
            "select_where on '{}': {} of {} rows kept",
            self.name(),
            indices.len(),
            self.nrows()
        );
        self.take_rows(&indices).select_fields(fields)
    }

    /// Load a table from CSV with a header row.
    ///
    /// Each column becomes `Int` if every cell parses as an integer, `Float`
    /// if every non-blank cell parses as a float (blanks read as NaN), and
    /// `Text` otherwise.
    pub fn from_csv_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Table, TableError> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv.headers()?.iter().map(String::from).collect();
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in csv.records() {
            let record = record?;
            for (column, value) in cells.iter_mut().zip(record.iter()) {
                column.push(value.to_string());
            }
        }

        let mut table = Table::new(name);
        for (header, values) in headers.into_iter().zip(cells) {
            table.push_column(Column::new(header, infer_column(values)))?;
        }
        log::info!(
            "Loaded table '{}' with {} row(s) in {} column(s)",
            table.name(),
            table.nrows(),
            table.ncols()
        );
        Ok(table)
    }

    /// Load a CSV file; the table is named after the file stem.
    pub fn from_csv_path(path: &Path) -> Result<Table, TableError> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(name, file)
    }

    /// Human-readable summary: header, size, aliases and column metadata.
    pub fn info(&self) -> String {
        self.render_info(None)
    }

    pub(crate) fn render_info(&self, position: Option<(&str, &str)>) -> String {
        let mut out = String::new();
        for (key, value) in &self.header {
            let _ = writeln!(out, "{key} = {value}");
        }
        let _ = writeln!(
            out,
            "Table contains: {} row(s) in {} column(s)\n",
            self.nrows(),
            self.ncols()
        );
        if let Some((ra, dec)) = position {
            let _ = writeln!(out, "Position coordinate columns: {ra}, {dec}\n");
        }
        if !self.aliases.is_empty() {
            let _ = writeln!(out, "Table contains alias(es):");
            for (alias, target) in &self.aliases {
                let _ = writeln!(out, "\t {alias} --> {target}");
            }
            let _ = writeln!(out);
        }

        let mut rows = vec![["columns", "unit", "format", "description"].map(String::from)];
        rows.extend(self.columns.iter().map(|c| {
            [
                c.name.clone(),
                c.unit.clone().unwrap_or_default(),
                c.format.clone().unwrap_or_default(),
                c.description.clone().unwrap_or_default(),
            ]
        }));
        out.push_str(&indent_rows(&rows));
        out
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

fn infer_column(values: Vec<String>) -> ColumnData {
    if let Ok(ints) = values.iter().map(|v| v.parse::<i64>()).collect::<Result<Vec<_>, _>>() {
        return ColumnData::Int(Array1::from(ints));
    }

    // Blank cells in a numeric column are missing values
    if values.iter().any(|v| !v.is_empty()) {
        let floats = values
            .iter()
            .map(|v| if v.is_empty() { Ok(f64::NAN) } else { v.parse::<f64>() })
            .collect::<Result<Vec<_>, _>>();
        if let Ok(floats) = floats {
            return ColumnData::Float(Array1::from(floats));
        }
    }
    ColumnData::Text(values)
}

/// Left-aligned fixed-width rows with a dashed rule under the first row.
fn indent_rows<const N: usize>(rows: &[[String; N]]) -> String {
    let mut widths = [0usize; N];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join(" ").trim_end());
        if i == 0 {
            let total = widths.iter().sum::<usize>() + N.saturating_sub(1);
            let _ = writeln!(out, "{}", "-".repeat(total));
        }
    }
    out
}
