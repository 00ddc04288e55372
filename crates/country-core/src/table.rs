//! Core table types shared by every pipeline stage

use crate::error::{Error, Result};
use crate::parser::RawRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// A typed table built from one source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Row data
    pub rows: Vec<Row>,
    /// Label of the source this table was built from
    pub source: String,
}

impl Table {
    /// Create a new empty table
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            source: source.into(),
        }
    }

    /// Create an empty table with the given column names
    pub fn with_columns<S: AsRef<str>>(source: impl Into<String>, names: &[S]) -> Self {
        let mut table = Self::new(source);
        for name in names {
            table.push_column_name(name.as_ref());
        }
        table
    }

    /// Build a table from raw records
    ///
    /// Columns are the union of record keys in first-seen order. Keys missing
    /// from a record become empty cells.
    pub fn from_records(source: impl Into<String>, records: &[RawRecord]) -> Self {
        let mut table = Self::new(source);
        for record in records {
            for key in record.keys() {
                if table.column_index(key).is_none() {
                    table.push_column_name(key);
                }
            }
        }

        for record in records {
            let cells = table
                .columns
                .iter()
                .map(|c| record.get(&c.name).map(CellValue::from_json).unwrap_or(CellValue::Empty))
                .collect();
            table.rows.push(Row::new(cells));
        }
        table
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Check whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Position of a column, or a [`Error::MissingColumn`]
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::missing_column(&self.source, name))
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get a cell by row index and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Iterate over one column's cells
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a CellValue> + 'a> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(move |r| r.get(idx).unwrap_or(&EMPTY_CELL)))
    }

    /// Count non-empty cells in a column (zero if the column is absent)
    pub fn non_null_count(&self, column: &str) -> usize {
        self.column_values(column)
            .map(|values| values.filter(|v| !v.is_empty()).count())
            .unwrap_or(0)
    }

    fn push_column_name(&mut self, name: &str) {
        let index = self.columns.len();
        self.columns.push(Column::new(name.to_string(), index));
    }

    /// Append a column filled with the given values (padded with empties)
    pub fn push_column(&mut self, name: &str, values: Vec<CellValue>) {
        self.push_column_name(name);
        let mut values = values.into_iter();
        for row in &mut self.rows {
            row.cells.push(values.next().unwrap_or(CellValue::Empty));
        }
    }

    /// Rename a column; returns false if it does not exist
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.columns.iter_mut().find(|c| c.name == from) {
            Some(col) => {
                col.name = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Rename every column through `f`, keeping the first of any colliding names
    ///
    /// When two columns map to the same name, the later one is dropped.
    /// Returns the original names of the dropped columns.
    pub fn rename_columns<F: Fn(&str) -> String>(&mut self, f: F) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut drop = Vec::new();
        let mut dropped = Vec::new();
        for col in &mut self.columns {
            let renamed = f(&col.name);
            if !seen.insert(renamed.clone()) {
                warn!(
                    source = %self.source,
                    column = %col.name,
                    renamed = %renamed,
                    "column collides after rename; dropped"
                );
                drop.push(col.index);
                dropped.push(col.name.clone());
            }
            col.name = renamed;
        }
        for idx in drop.into_iter().rev() {
            self.remove_column_at(idx);
        }
        dropped
    }

    /// Remove a column; returns false if it does not exist
    pub fn drop_column(&mut self, name: &str) -> bool {
        match self.column_index(name) {
            Some(idx) => {
                self.remove_column_at(idx);
                true
            }
            None => false,
        }
    }

    fn remove_column_at(&mut self, idx: usize) {
        self.columns.remove(idx);
        for (i, col) in self.columns.iter_mut().enumerate() {
            col.index = i;
        }
        for row in &mut self.rows {
            if idx < row.cells.len() {
                row.cells.remove(idx);
            }
        }
    }

    /// Replace every cell of a column through `f`
    pub fn map_column<F: FnMut(&CellValue) -> CellValue>(&mut self, name: &str, mut f: F) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            if let Some(cell) = row.cells.get_mut(idx) {
                *cell = f(cell);
            }
        }
        true
    }

    /// Drop rows that are exact duplicates of an earlier row
    pub fn drop_duplicates(&mut self) {
        let mut seen = HashSet::new();
        self.rows
            .retain(|row| seen.insert(row.cells.iter().map(CellValue::key).collect::<Vec<_>>()));
    }

    /// Keep the first row for each value of `column`
    pub fn dedup_by_column(&mut self, column: &str) -> Result<()> {
        let idx = self.require_column(column)?;
        let mut seen = HashSet::new();
        self.rows.retain(|row| {
            let key = row.get(idx).map(CellValue::key).unwrap_or(CellKey::Empty);
            seen.insert(key)
        });
        Ok(())
    }

    /// Keep only rows for which `f` holds
    pub fn retain_rows<F: FnMut(&Row) -> bool>(&mut self, f: F) {
        self.rows.retain(f);
    }

    /// Drop every column whose cells are all empty
    pub fn drop_empty_columns(&mut self) -> Vec<String> {
        let empty: Vec<String> = self
            .columns
            .iter()
            .filter(|c| self.non_null_count(&c.name) == 0)
            .map(|c| c.name.clone())
            .collect();
        for name in &empty {
            self.drop_column(name);
        }
        empty
    }
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Cell values for each column
    pub cells: Vec<CellValue>,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }

    /// True when every cell is empty
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_empty)
    }
}

/// A cell value with type detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// String value
    String(String),
    /// Nested object or array that has not been flattened
    Structured(Value),
    /// Empty/null cell
    Empty,
}

impl CellValue {
    /// Parse a string into a CellValue, detecting the type
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }

        CellValue::String(trimmed.to_string())
    }

    /// Convert a JSON value without coercing strings
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Empty,
            Value::Bool(b) => CellValue::String(b.to_string()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Integer(i),
                None => n
                    .as_f64()
                    .filter(|f| f.is_finite())
                    .map(CellValue::Float)
                    .unwrap_or(CellValue::Empty),
            },
            Value::String(s) => CellValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => CellValue::Structured(value.clone()),
        }
    }

    /// Convert back to JSON
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Integer(i) => Value::from(*i),
            CellValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::String(s) => Value::String(s.clone()),
            CellValue::Structured(v) => v.clone(),
            CellValue::Empty => Value::Null,
        }
    }

    /// Coerce to a number, failing on anything that is not numeric
    pub fn try_numeric(&self, column: &str) -> Result<CellValue> {
        match self {
            CellValue::Integer(_) | CellValue::Empty => Ok(self.clone()),
            CellValue::Float(f) if f.is_finite() => Ok(self.clone()),
            CellValue::String(s) => match CellValue::parse(s) {
                n @ (CellValue::Integer(_) | CellValue::Float(_) | CellValue::Empty) => Ok(n),
                _ => Err(Error::ParseFailure {
                    column: column.to_string(),
                    value: s.clone(),
                    expected: "number",
                }),
            },
            other => Err(Error::ParseFailure {
                column: column.to_string(),
                value: other.to_string_value(),
                expected: "number",
            }),
        }
    }

    /// Numeric view of the cell, if it holds a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text view of the cell, if it holds a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Check if the cell holds a number
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    /// Convert to a display string
    pub fn to_string_value(&self) -> String {
        match self {
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Structured(v) => v.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Hashable identity used for duplicate detection
    pub fn key(&self) -> CellKey {
        match self {
            CellValue::Integer(i) => CellKey::Integer(*i),
            CellValue::Float(f) => CellKey::Float(f.to_bits()),
            CellValue::String(s) => CellKey::String(s.clone()),
            CellValue::Structured(v) => CellKey::Structured(v.to_string()),
            CellValue::Empty => CellKey::Empty,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Structured(v) => write!(f, "{}", v),
            CellValue::Empty => write!(f, ""),
        }
    }
}

/// Hashable mirror of [`CellValue`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    Integer(i64),
    Float(u64),
    String(String),
    Structured(String),
    Empty,
}
