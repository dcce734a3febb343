//! Tabular containers and train/test partitioning.
//!
//! `RawTable` is the loader's output: a column-major table of optional string
//! cells, one column per catalog field. `FeatureMatrix` is the harmonizer's
//! output: a dense numeric matrix with its ordered feature names. The split
//! helper produces the deterministic stratified 80/20 partition used by the
//! trainer.
use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::ClassifierError;
use crate::math::Matrix;

/// One named column of raw catalog cells. `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<String>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }
}

/// In-memory catalog table. Rows are observations; no uniqueness or ordering
/// invariant beyond row identity.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    columns: Vec<Column>,
}

impl RawTable {
    pub fn new(columns: Vec<Column>) -> Self {
        if let Some(first) = columns.first() {
            let n_rows = first.values.len();
            for column in &columns {
                assert_eq!(
                    column.values.len(),
                    n_rows,
                    "column '{}' has a different row count",
                    column.name
                );
            }
        }
        RawTable { columns }
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// First column with the given name, if any.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

/// Harmonized numeric features, ready for scaling and model fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub feature_names: Vec<String>,
    pub x: Matrix,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }
}

/// Partition row indices into train and test sets, preserving per-class
/// proportions, with a deterministic shuffle.
///
/// Fails with a precondition violation when stratification is impossible:
/// fewer than two distinct classes, or a class with fewer than two rows.
pub fn stratified_split(
    y: &[usize],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), ClassifierError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ClassifierError::Precondition(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, &class) in y.iter().enumerate() {
        by_class.entry(class).or_default().push(idx);
    }

    if by_class.len() < 2 {
        return Err(ClassifierError::Precondition(format!(
            "stratified split requires at least 2 target classes, found {}",
            by_class.len()
        )));
    }
    for (class, members) in &by_class {
        if members.len() < 2 {
            return Err(ClassifierError::Precondition(format!(
                "target class {} has only {} row(s); at least 2 are required per class",
                class,
                members.len()
            )));
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(y.len());
    let mut test = Vec::new();

    for members in by_class.into_values() {
        let mut members = members;
        members.shuffle(&mut rng);
        let n = members.len();
        let n_test = ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}
