//! Interaction network tables and the named corpus that holds them

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Axis, DedupError, Result, TableError};

/// A bipartite interaction table.
///
/// Rows are plant taxa, columns are pollinator taxa, and each cell holds the
/// interaction strength (0 means no recorded interaction). Labels are unique
/// per axis. Values are stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkTable {
    rows: Vec<String>,
    cols: Vec<String>,
    values: Vec<f64>,
    #[serde(skip)]
    row_index: HashMap<String, usize>,
    #[serde(skip)]
    col_index: HashMap<String, usize>,
}

impl NetworkTable {
    /// Build a table from labels and a row-major matrix
    pub fn new(rows: Vec<String>, cols: Vec<String>, matrix: Vec<Vec<f64>>) -> Result<Self> {
        let ragged = matrix.iter().any(|row| row.len() != cols.len());
        if matrix.len() != rows.len() || ragged {
            let bad_width = matrix
                .iter()
                .map(Vec::len)
                .find(|&len| len != cols.len())
                .unwrap_or(cols.len());
            return Err(TableError::ShapeMismatch {
                expected_rows: rows.len(),
                expected_cols: cols.len(),
                rows: matrix.len(),
                cols: bad_width,
            }
            .into());
        }

        let row_index = index_labels(&rows, Axis::Row)?;
        let col_index = index_labels(&cols, Axis::Column)?;

        let mut values = Vec::with_capacity(rows.len() * cols.len());
        for (r, row) in matrix.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(TableError::InvalidValue {
                        row: rows[r].clone(),
                        col: cols[c].clone(),
                        value,
                    }
                    .into());
                }
                values.push(value);
            }
        }

        Ok(Self {
            rows,
            cols,
            values,
            row_index,
            col_index,
        })
    }

    /// Plant labels, in input order
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Pollinator labels, in input order
    pub fn cols(&self) -> &[String] {
        &self.cols
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.cols.len()
    }

    /// Interaction strength between a plant and a pollinator, if both exist
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let r = *self.row_index.get(row)?;
        let c = *self.col_index.get(col)?;
        Some(self.values[r * self.cols.len() + c])
    }

    /// Iterate `(row, col, value)` over cells with a recorded interaction
    pub fn interactions(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        let width = self.cols.len();
        self.values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0.0)
            .map(move |(i, &v)| (self.rows[i / width].as_str(), self.cols[i % width].as_str(), v))
    }

    /// Number of nonzero cells
    pub fn interaction_count(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0.0).count()
    }

    /// Keep only the rows and columns accepted by the predicates
    pub fn retain_labels<R, C>(&self, keep_row: R, keep_col: C) -> Self
    where
        R: Fn(&str) -> bool,
        C: Fn(&str) -> bool,
    {
        let row_ids: Vec<usize> = (0..self.rows.len())
            .filter(|&r| keep_row(&self.rows[r]))
            .collect();
        let col_ids: Vec<usize> = (0..self.cols.len())
            .filter(|&c| keep_col(&self.cols[c]))
            .collect();

        let rows: Vec<String> = row_ids.iter().map(|&r| self.rows[r].clone()).collect();
        let cols: Vec<String> = col_ids.iter().map(|&c| self.cols[c].clone()).collect();
        let width = self.cols.len();
        let values: Vec<f64> = row_ids
            .iter()
            .flat_map(|&r| col_ids.iter().map(move |&c| r * width + c))
            .map(|i| self.values[i])
            .collect();

        Self {
            row_index: rows.iter().cloned().enumerate().map(|(i, l)| (l, i)).collect(),
            col_index: cols.iter().cloned().enumerate().map(|(i, l)| (l, i)).collect(),
            rows,
            cols,
            values,
        }
    }
}

fn index_labels(labels: &[String], axis: Axis) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(labels.len());
    for (position, label) in labels.iter().enumerate() {
        if label.trim().is_empty() {
            return Err(TableError::EmptyLabel { axis, position }.into());
        }
        if index.insert(label.clone(), position).is_some() {
            return Err(TableError::DuplicateLabel {
                axis,
                label: label.clone(),
            }
            .into());
        }
    }
    Ok(index)
}

/// Networks keyed by name, iterated in insertion order
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    names: Vec<String>,
    tables: HashMap<String, NetworkTable>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a network; a name can only be used once
    pub fn insert(&mut self, name: impl Into<String>, table: NetworkTable) -> Result<()> {
        let name = name.into();
        if self.tables.contains_key(&name) {
            return Err(DedupError::DuplicateNetworkName(name));
        }
        self.names.push(name.clone());
        self.tables.insert(name, table);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NetworkTable> {
        self.tables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Names in insertion order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// `(name, table)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NetworkTable)> + '_ {
        self.names
            .iter()
            .filter_map(move |name| self.tables.get(name).map(|t| (name.as_str(), t)))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> NetworkTable {
        NetworkTable::new(
            labels(&["Salvia a", "Thymus b"]),
            labels(&["Apis mellifera", "Bombus sp1", "Eristalis tenax"]),
            vec![vec![1.0, 0.0, 2.0], vec![0.0, 3.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn lookup_and_interactions() {
        let t = sample();
        assert_eq!(t.get("Thymus b", "Bombus sp1"), Some(3.0));
        assert_eq!(t.get("Thymus b", "Apis mellifera"), Some(0.0));
        assert_eq!(t.get("Missing", "Apis mellifera"), None);
        assert_eq!(t.interaction_count(), 3);

        let cells: Vec<_> = t.interactions().collect();
        assert_eq!(
            cells,
            vec![
                ("Salvia a", "Apis mellifera", 1.0),
                ("Salvia a", "Eristalis tenax", 2.0),
                ("Thymus b", "Bombus sp1", 3.0),
            ]
        );
    }

    #[test]
    fn rejects_bad_shape() {
        let err =
            NetworkTable::new(labels(&["a"]), labels(&["x", "y"]), vec![vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            DedupError::InvalidTable(TableError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_label() {
        let err = NetworkTable::new(
            labels(&["a", "a"]),
            labels(&["x"]),
            vec![vec![1.0], vec![0.0]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DedupError::InvalidTable(TableError::DuplicateLabel {
                axis: Axis::Row,
                label: "a".to_string()
            })
        );
    }

    #[test]
    fn rejects_negative_value() {
        let err = NetworkTable::new(labels(&["a"]), labels(&["x"]), vec![vec![-1.0]]).unwrap_err();
        assert!(matches!(
            err,
            DedupError::InvalidTable(TableError::InvalidValue { .. })
        ));
    }

    #[test]
    fn retain_drops_rows_and_cols() {
        let t = sample().retain_labels(|r| r != "Salvia a", |c| c != "Apis mellifera");
        assert_eq!(t.rows(), &labels(&["Thymus b"])[..]);
        assert_eq!(t.cols(), &labels(&["Bombus sp1", "Eristalis tenax"])[..]);
        assert_eq!(t.get("Thymus b", "Bombus sp1"), Some(3.0));
        assert_eq!(t.interaction_count(), 1);
    }

    #[test]
    fn corpus_keeps_insertion_order() {
        let mut corpus = Corpus::new();
        corpus.insert("M_PL_002", sample()).unwrap();
        corpus.insert("M_PL_001", sample()).unwrap();
        assert_eq!(corpus.names(), &labels(&["M_PL_002", "M_PL_001"])[..]);
        assert_eq!(
            corpus.insert("M_PL_001", sample()),
            Err(DedupError::DuplicateNetworkName("M_PL_001".to_string()))
        );
        assert_eq!(corpus.len(), 2);
    }
}
