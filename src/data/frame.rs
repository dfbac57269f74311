//! Date-indexed table of numeric series

use anyhow::{bail, Result};
use chrono::NaiveDate;

/// A table of `f64` columns sharing one date index.
///
/// Values are stored column-major. Missing observations are `f64::NAN`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFrame {
    index: Vec<NaiveDate>,
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl TimeFrame {
    pub fn new(index: Vec<NaiveDate>, columns: Vec<String>, values: Vec<Vec<f64>>) -> Result<Self> {
        if columns.len() != values.len() {
            bail!(
                "Frame has {} column names but {} value columns",
                columns.len(),
                values.len()
            );
        }

        for (name, column) in columns.iter().zip(&values) {
            if column.len() != index.len() {
                bail!(
                    "Column '{}' has {} rows, index has {}",
                    name,
                    column.len(),
                    index.len()
                );
            }
        }

        Ok(Self {
            index,
            columns,
            values,
        })
    }

    /// Single-column frame
    pub fn from_series(name: &str, index: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        Self::new(index, vec![name.to_string()], vec![values])
    }

    /// Frame with the same columns and no rows
    pub fn empty_like(&self) -> Self {
        Self {
            index: Vec::new(),
            columns: self.columns.clone(),
            values: vec![Vec::new(); self.columns.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
    }

    /// Iterate `(name, values)` pairs in column order
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// Row `i` across all columns
    pub fn row(&self, i: usize) -> Option<(NaiveDate, Vec<f64>)> {
        let date = *self.index.get(i)?;
        Some((date, self.values.iter().map(|c| c[i]).collect()))
    }

    /// Build a frame with the same index and columns by transforming each column.
    ///
    /// `f` must return a vector of the same length as its input.
    pub fn map_columns<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        let values = self
            .values
            .iter()
            .map(|column| {
                let mapped = f(column);
                debug_assert_eq!(mapped.len(), column.len());
                mapped
            })
            .collect();

        Self {
            index: self.index.clone(),
            columns: self.columns.clone(),
            values,
        }
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Self {
        let n = n.min(self.len());
        Self {
            index: self.index[..n].to_vec(),
            columns: self.columns.clone(),
            values: self.values.iter().map(|c| c[..n].to_vec()).collect(),
        }
    }

    /// Last row, one value per column
    pub fn last_row(&self) -> Option<Vec<f64>> {
        self.row(self.len().checked_sub(1)?).map(|(_, row)| row)
    }
}
