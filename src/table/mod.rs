//! In-memory table data model.
//!
//! A [`Table`] is an ordered collection of labeled rows over a fixed set of
//! named columns, each cell holding a [`Value`] (numeric, string, or
//! missing). External parsers are responsible for producing tables from
//! whatever flat-file format they read; this module only consumes the
//! already-parsed structure.
//!
//! Tables are immutable from the query engine's point of view:
//! [`Table::filter`] returns a fresh table and never mutates its receiver.
//!
//! # Example
//!
//! ```
//! use table_statistics::table::{Table, Value};
//!
//! let mut table = Table::new(vec!["gene".into(), "score".into()]);
//! table.push_row("r1", vec![Value::from("adh1"), Value::from(12.5)]).unwrap();
//! table.push_row("r2", vec![Value::from("adh2"), Value::from(3.0)]).unwrap();
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.numeric_column("score").unwrap(), vec![12.5, 3.0]);
//! ```

use anyhow::{Result, anyhow, bail};
use std::cmp::Ordering;

pub mod query;

pub use query::{Clause, Predicate, Query};

// ── Value ─────────────────────────────────────────────────────────────

/// A single table cell: a number, a string, or a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Str(String),
    Missing,
}

impl Value {
    /// Returns the numeric content, or `None` for strings and missing cells.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string content, or `None` for numbers and missing cells.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Total order used by `sort_by`: numbers first (ascending), then
    /// strings (lexicographic), missing cells last. NaN compares equal to
    /// any number so sorting stays stable in their presence.
    pub(crate) fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Num(a), Value::Num(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Num(_), _) => Ordering::Less,
            (_, Value::Num(_)) => Ordering::Greater,
            (Value::Str(_), Value::Missing) => Ordering::Less,
            (Value::Missing, Value::Str(_)) => Ordering::Greater,
            (Value::Missing, Value::Missing) => Ordering::Equal,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Num(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Num(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

// ── RowView ───────────────────────────────────────────────────────────

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> RowView<'a> {
    /// The row label.
    pub fn label(&self) -> &'a str {
        &self.table.labels[self.index]
    }

    /// Cell lookup by column name.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let col = self.table.column_index(column)?;
        Some(&self.table.rows[self.index][col])
    }

    /// All cells of this row, in column order.
    pub fn values(&self) -> &'a [Value] {
        &self.table.rows[self.index]
    }
}

/// Result of [`Table::get`]: either the whole table (the `"*"` sentinel) or
/// a single row.
#[derive(Debug)]
pub enum Selection<'a> {
    All(&'a Table),
    Row(RowView<'a>),
}

// ── Table ─────────────────────────────────────────────────────────────

/// Ordered, labeled rows over a fixed set of named columns.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    labels: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            labels: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Appends a labeled row. The number of values must match the number of
    /// columns.
    pub fn push_row(&mut self, label: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            bail!(
                "row '{}' has {} values, expected {}",
                label,
                values.len(),
                self.columns.len()
            );
        }
        self.labels.push(label.to_string());
        self.rows.push(values);
        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names, in table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index of a column name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterator over row views, in table order.
    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        (0..self.rows.len()).map(|index| RowView { table: self, index })
    }

    /// Row labels, in table order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Row lookup by positional index.
    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        if index < self.rows.len() {
            Some(RowView { table: self, index })
        } else {
            None
        }
    }

    /// Row lookup by label. The first matching row wins when labels repeat.
    pub fn row_by_label(&self, label: &str) -> Option<RowView<'_>> {
        let index = self.labels.iter().position(|l| l == label)?;
        Some(RowView { table: self, index })
    }

    /// A copy of the whole table (all rows, all columns).
    pub fn all(&self) -> Table {
        self.clone()
    }

    /// Keyed lookup with the `"*"` sentinel: `"*"` selects the entire table,
    /// any other key is a row-label lookup.
    pub fn get(&self, key: &str) -> Option<Selection<'_>> {
        if key == "*" {
            Some(Selection::All(self))
        } else {
            self.row_by_label(key).map(Selection::Row)
        }
    }

    /// The first `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        self.subset((0..n.min(self.len())).collect::<Vec<_>>().as_slice())
    }

    /// The last `n` rows as a new table.
    pub fn tail(&self, n: usize) -> Table {
        let start = self.len().saturating_sub(n);
        self.subset((start..self.len()).collect::<Vec<_>>().as_slice())
    }

    /// All cells of a column, in row order.
    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>> {
        let col = self
            .column_index(name)
            .ok_or_else(|| anyhow!("column '{}' not found", name))?;
        Ok(self.rows.iter().map(|r| &r[col]).collect())
    }

    /// Numeric content of a column, missing cells skipped. A string cell is
    /// an error: the caller asked for a numeric sample.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let mut values = Vec::with_capacity(self.len());
        for cell in self.column_values(name)? {
            match cell {
                Value::Num(v) => values.push(*v),
                Value::Missing => {}
                Value::Str(s) => {
                    bail!("column '{}' contains non-numeric value '{}'", name, s)
                }
            }
        }
        Ok(values)
    }

    /// New table holding the given row indices, in the given order.
    pub(crate) fn subset(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.clone(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
