//! Feature and label harmonization across source catalogs.
//!
//! Every catalog (Kepler, K2, TESS) publishes its own column names and label
//! vocabulary. This module reduces any raw table to one standardized schema:
//! the six `koi_*` measurement columns in a fixed order, fully numeric with no
//! missing values, plus an integer-encoded disposition target. The whole
//! transformation is a pure function of the input table and column mapping.
use std::collections::{BTreeSet, HashMap};

use statrs::statistics::{Data, OrderStatistics};

use crate::data_handling::{Column, FeatureMatrix, RawTable};
use crate::error::ClassifierError;
use crate::labels::{Disposition, TargetEncoder};
use crate::math::Matrix;

/// The standardized feature set, in canonical column order. Training and
/// inference both use exactly these columns, in exactly this order.
pub const STANDARD_FEATURES: [&str; 6] = [
    "koi_model_snr",
    "koi_depth",
    "koi_prad",
    "koi_teq",
    "koi_duration",
    "koi_period",
];

/// Identifier columns removed before feature selection, matched on the
/// lower-cased column name.
const ID_COLUMNS: [&str; 8] = [
    "id",
    "kepid",
    "rowid",
    "index",
    "kepoi_name",
    "kepler_name",
    "toi",
    "toi_name",
];

/// Categorical columns with more cardinality than this cannot be label
/// encoded and are rejected outright.
const MAX_CATEGORICAL_CARDINALITY: usize = 10;

/// Output of harmonization: features, encoded targets, and the fitted target
/// encoder needed to decode predictions later.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonizedData {
    pub features: FeatureMatrix,
    pub targets: Vec<usize>,
    pub target_encoder: TargetEncoder,
}

/// Harmonize a raw catalog table against the standardized schema.
///
/// Steps, in order: drop rows with a missing target; split off and normalize
/// the target column; rename mapped feature columns that exist in the table
/// (entries for absent columns are no-ops); drop identifier columns;
/// synthesize absent standard features as all-missing columns; reduce to the
/// six standard features in canonical order; impute missing values (column
/// median for numeric columns, `"Unknown"` for categorical ones); label
/// encode low-cardinality categorical columns; encode the target.
pub fn harmonize(
    table: &RawTable,
    target_column: &str,
    column_mapping: &HashMap<String, String>,
) -> Result<HarmonizedData, ClassifierError> {
    let target = table.column(target_column).ok_or_else(|| {
        ClassifierError::Precondition(format!(
            "target column '{}' not found in dataset",
            target_column
        ))
    })?;

    // Rows with a missing target never enter training or reporting.
    let keep_rows: Vec<usize> = target
        .values
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| value.is_some().then_some(idx))
        .collect();
    let dropped = table.n_rows() - keep_rows.len();
    if dropped > 0 {
        log::debug!("dropped {} rows with missing '{}'", dropped, target_column);
    }

    let labels: Vec<Disposition> = keep_rows
        .iter()
        .map(|&idx| Disposition::normalize(target.values[idx].as_deref()))
        .collect();

    // Remaining columns, renamed per the mapping and filtered to the kept rows.
    let mut working: Vec<Column> = Vec::with_capacity(table.n_cols().saturating_sub(1));
    for column in table.columns() {
        if column.name == target_column {
            continue;
        }
        let name = column_mapping
            .get(&column.name)
            .cloned()
            .unwrap_or_else(|| column.name.clone());
        let values = keep_rows
            .iter()
            .map(|&idx| column.values[idx].clone())
            .collect();
        working.push(Column::new(name, values));
    }
    working.retain(|column| !ID_COLUMNS.contains(&column.name.to_lowercase().as_str()));

    // Exactly the six standard features, synthesized as all-missing when absent.
    let n_rows = keep_rows.len();
    let mut numeric_columns = Vec::with_capacity(STANDARD_FEATURES.len());
    for feature in STANDARD_FEATURES {
        let column = working
            .iter()
            .find(|c| c.name == feature)
            .cloned()
            .unwrap_or_else(|| Column::new(feature, vec![None; n_rows]));
        numeric_columns.push(to_numeric(&column)?);
    }

    let x = Matrix::from_columns(&numeric_columns).expect("harmonized columns are row-aligned");
    let features = FeatureMatrix {
        feature_names: STANDARD_FEATURES.iter().map(|s| s.to_string()).collect(),
        x,
    };

    let (target_encoder, targets) = TargetEncoder::fit(&labels);

    Ok(HarmonizedData {
        features,
        targets,
        target_encoder,
    })
}

/// Convert one standardized column to imputed numeric values.
///
/// A column is numeric when every present cell parses as a finite float;
/// missing cells are imputed with the column median (0.0 when the column has
/// no data at all, so no NaN survives harmonization). Otherwise the column is
/// categorical: missing cells become the literal `"Unknown"` and values are
/// label encoded by sorted distinct value.
fn to_numeric(column: &Column) -> Result<Vec<f64>, ClassifierError> {
    let parsed: Vec<Option<f64>> = column
        .values
        .iter()
        .map(|value| {
            value
                .as_deref()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite())
        })
        .collect();

    let is_numeric = column
        .values
        .iter()
        .zip(&parsed)
        .all(|(raw, num)| raw.is_none() || num.is_some());

    if is_numeric {
        let present: Vec<f64> = parsed.iter().flatten().copied().collect();
        let fill = if present.is_empty() {
            0.0
        } else {
            let mut data = Data::new(present);
            data.median()
        };
        return Ok(parsed.into_iter().map(|v| v.unwrap_or(fill)).collect());
    }

    let filled: Vec<&str> = column
        .values
        .iter()
        .map(|v| v.as_deref().unwrap_or("Unknown"))
        .collect();
    let distinct: BTreeSet<&str> = filled.iter().copied().collect();
    if distinct.len() > MAX_CATEGORICAL_CARDINALITY {
        return Err(ClassifierError::Precondition(format!(
            "categorical column '{}' has {} distinct values (limit {}); cannot label encode",
            column.name,
            distinct.len(),
            MAX_CATEGORICAL_CARDINALITY
        )));
    }
    let codes: Vec<&str> = distinct.into_iter().collect();
    Ok(filled
        .into_iter()
        .map(|value| codes.iter().position(|c| *c == value).unwrap_or(0) as f64)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    fn kepler_table() -> RawTable {
        RawTable::new(vec![
            Column::new("koi_period", vec![cell("10"), cell("20"), cell("15")]),
            Column::new("koi_depth", vec![cell("500"), None, cell("600")]),
            Column::new(
                "koi_disposition",
                vec![cell("CONFIRMED"), cell("FALSE POSITIVE"), cell("CANDIDATE")],
            ),
        ])
    }

    #[test]
    fn output_has_exactly_the_six_standard_columns_in_order() {
        let data = harmonize(&kepler_table(), "koi_disposition", &HashMap::new()).unwrap();
        assert_eq!(data.features.feature_names, STANDARD_FEATURES.to_vec());
        assert_eq!(data.features.x.shape(), (3, 6));
        for r in 0..3 {
            for c in 0..6 {
                assert!(data.features.x[(r, c)].is_finite());
            }
        }
    }

    #[test]
    fn targets_are_normalized_and_missing_depths_take_the_median() {
        let data = harmonize(&kepler_table(), "koi_disposition", &HashMap::new()).unwrap();

        let decoded: Vec<Disposition> = data
            .targets
            .iter()
            .map(|&idx| data.target_encoder.decode(idx).unwrap())
            .collect();
        assert_eq!(
            decoded,
            vec![
                Disposition::Confirmed,
                Disposition::FalsePositive,
                Disposition::Candidate
            ]
        );

        // koi_depth is the second standard feature; the gap takes the median
        // of the two present values.
        let depth = data.features.x.column(1);
        assert_eq!(depth, vec![500.0, 550.0, 600.0]);
    }

    #[test]
    fn rows_with_missing_target_are_dropped_entirely() {
        let table = RawTable::new(vec![
            Column::new("koi_period", vec![cell("10"), cell("20"), cell("15")]),
            Column::new(
                "koi_disposition",
                vec![cell("CONFIRMED"), None, cell("CONFIRMED")],
            ),
        ]);
        let data = harmonize(&table, "koi_disposition", &HashMap::new()).unwrap();
        assert_eq!(data.features.n_rows(), 2);
        assert_eq!(data.targets.len(), 2);
        // koi_period is the last standard feature
        assert_eq!(data.features.x.column(5), vec![10.0, 15.0]);
    }

    #[test]
    fn column_mapping_renames_present_sources_and_ignores_absent_ones() {
        let table = RawTable::new(vec![
            Column::new("Period(days)", vec![cell("10"), cell("20")]),
            Column::new("disposition", vec![cell("CP"), cell("FP")]),
        ]);
        let mapping: HashMap<String, String> = [
            ("Period(days)".to_string(), "koi_period".to_string()),
            ("Depth(ppm)".to_string(), "koi_depth".to_string()),
        ]
        .into_iter()
        .collect();

        let data = harmonize(&table, "disposition", &mapping).unwrap();
        assert_eq!(data.features.x.column(5), vec![10.0, 20.0]);
        // the absent source left koi_depth synthesized, imputed to 0.0
        assert_eq!(data.features.x.column(1), vec![0.0, 0.0]);
    }

    #[test]
    fn identifier_columns_are_ignored() {
        let table = RawTable::new(vec![
            Column::new("kepid", vec![cell("100001"), cell("100002")]),
            Column::new("KepOI_Name", vec![cell("K00001.01"), cell("K00002.01")]),
            Column::new("koi_period", vec![cell("10"), cell("20")]),
            Column::new("koi_disposition", vec![cell("CONFIRMED"), cell("CANDIDATE")]),
        ]);
        let data = harmonize(&table, "koi_disposition", &HashMap::new()).unwrap();
        assert_eq!(data.features.feature_names, STANDARD_FEATURES.to_vec());
        assert_eq!(data.features.x.column(5), vec![10.0, 20.0]);
    }

    #[test]
    fn harmonization_is_idempotent() {
        let table = kepler_table();
        let first = harmonize(&table, "koi_disposition", &HashMap::new()).unwrap();
        let second = harmonize(&table, "koi_disposition", &HashMap::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn low_cardinality_categorical_columns_are_label_encoded() {
        let table = RawTable::new(vec![
            Column::new(
                "koi_teq",
                vec![cell("hot"), cell("cold"), None, cell("hot")],
            ),
            Column::new(
                "koi_disposition",
                vec![cell("CONFIRMED"), cell("CANDIDATE"), cell("CONFIRMED"), cell("CANDIDATE")],
            ),
        ]);
        let data = harmonize(&table, "koi_disposition", &HashMap::new()).unwrap();
        // sorted distinct: Unknown < cold < hot
        assert_eq!(data.features.x.column(3), vec![2.0, 1.0, 0.0, 2.0]);
    }

    #[test]
    fn high_cardinality_categorical_columns_fail_fast() {
        let values: Vec<Option<String>> = (0..11).map(|i| cell(&format!("bin_{i}"))).collect();
        let targets: Vec<Option<String>> = (0..11)
            .map(|i| cell(if i % 2 == 0 { "CONFIRMED" } else { "CANDIDATE" }))
            .collect();
        let table = RawTable::new(vec![
            Column::new("koi_teq", values),
            Column::new("koi_disposition", targets),
        ]);
        let err = harmonize(&table, "koi_disposition", &HashMap::new()).unwrap_err();
        match err {
            ClassifierError::Precondition(msg) => assert!(msg.contains("koi_teq")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_target_column_is_a_precondition_violation() {
        let table = RawTable::new(vec![Column::new("koi_period", vec![cell("10")])]);
        let err = harmonize(&table, "koi_disposition", &HashMap::new()).unwrap_err();
        assert!(matches!(err, ClassifierError::Precondition(_)));
    }
}
