//! Row and column views of the same numeric records
//!
//! Trace and waveform data usually arrives as parallel columns (`time`,
//! `value`, ...) while layers want one record per datum. [`OrthogonalData`]
//! keeps both views and checks that they describe the same table.

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One record: field name to value
pub type Row = BTreeMap<String, f64>;

/// Table held as rows and as columns
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrthogonalData {
    rows: Vec<Row>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl OrthogonalData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records; every record must carry the same fields
    pub fn from_rows(rows: Vec<Row>) -> Result<Self, DataError> {
        let mut data = Self::new();
        data.set_rows(rows)?;
        Ok(data)
    }

    /// Build from columns; every column must have the same length
    pub fn from_columns(columns: BTreeMap<String, Vec<f64>>) -> Result<Self, DataError> {
        let mut data = Self::new();
        data.set_columns(columns)?;
        Ok(data)
    }

    /// Replace the table from records
    ///
    /// The table is left unchanged when the records are inconsistent.
    pub fn set_rows(&mut self, rows: Vec<Row>) -> Result<(), DataError> {
        let mut columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for row in &rows {
            for (key, value) in row {
                columns.entry(key.clone()).or_default().push(*value);
            }
        }
        check_consistency(&columns, rows.len())?;

        self.rows = rows;
        self.columns = columns;
        Ok(())
    }

    /// Replace the table from columns
    ///
    /// The table is left unchanged when the columns are inconsistent.
    pub fn set_columns(&mut self, columns: BTreeMap<String, Vec<f64>>) -> Result<(), DataError> {
        let size = columns.values().next().map_or(0, Vec::len);
        check_consistency(&columns, size)?;

        self.rows = (0..size)
            .map(|index| {
                columns
                    .iter()
                    .map(|(key, column)| (key.clone(), column[index]))
                    .collect()
            })
            .collect();
        self.columns = columns;
        Ok(())
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn check_consistency(columns: &BTreeMap<String, Vec<f64>>, expected: usize) -> Result<(), DataError> {
    for (name, column) in columns {
        if column.len() != expected {
            return Err(DataError::Inconsistent {
                column: name.clone(),
                expected,
                found: column.len(),
            });
        }
    }
    Ok(())
}
