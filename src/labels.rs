//! Disposition label normalization and target encoding.
//!
//! Source catalogs disagree on disposition vocabulary (Kepler spells out
//! `FALSE POSITIVE`, TESS abbreviates to `FP`). Every raw label is reduced to
//! one of four standardized categories before training. Strings outside the
//! known vocabulary map to [`Disposition::Unknown`]; that is an explicit
//! category of the model, not an error.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Standardized disposition of a candidate transit signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Candidate,
    Confirmed,
    FalsePositive,
    Unknown,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Candidate => "candidate",
            Disposition::Confirmed => "confirmed",
            Disposition::FalsePositive => "false_positive",
            Disposition::Unknown => "unknown",
        }
    }

    /// Map a raw catalog label to its standardized category.
    ///
    /// Missing values map to `Unknown`. Otherwise the trimmed value is looked
    /// up verbatim first, then upper-cased, in the fixed vocabulary table;
    /// anything else falls through to `Unknown`.
    pub fn normalize(raw: Option<&str>) -> Disposition {
        let Some(raw) = raw else {
            return Disposition::Unknown;
        };
        let trimmed = raw.trim();
        lookup(trimmed)
            .or_else(|| lookup(&trimmed.to_uppercase()))
            .unwrap_or(Disposition::Unknown)
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lookup(value: &str) -> Option<Disposition> {
    match value {
        "CANDIDATE" | "candidate" | "PC" => Some(Disposition::Candidate),
        "CONFIRMED" | "confirmed" | "CP" => Some(Disposition::Confirmed),
        "FALSE POSITIVE" | "false positive" | "false_positive" | "FP" => {
            Some(Disposition::FalsePositive)
        }
        "unknown" => Some(Disposition::Unknown),
        _ => None,
    }
}

/// Label encoding over the disposition categories actually observed in a
/// training set. Classes are sorted by their string form, matching the
/// conventional label-encoder ordering, so class indices are stable for a
/// given set of observed categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEncoder {
    classes: Vec<Disposition>,
}

impl TargetEncoder {
    /// Fit the encoder on observed labels and return their integer codes.
    pub fn fit(labels: &[Disposition]) -> (TargetEncoder, Vec<usize>) {
        let mut classes: Vec<Disposition> = labels.to_vec();
        classes.sort_by_key(|d| d.as_str());
        classes.dedup();

        let encoder = TargetEncoder { classes };
        let encoded = labels
            .iter()
            .map(|label| encoder.encode(*label).expect("label seen during fit"))
            .collect();
        (encoder, encoded)
    }

    pub fn encode(&self, label: Disposition) -> Option<usize> {
        self.classes.iter().position(|c| *c == label)
    }

    /// Decode an integer class index back to its disposition.
    pub fn decode(&self, index: usize) -> Option<Disposition> {
        self.classes.get(index).copied()
    }

    pub fn classes(&self) -> &[Disposition] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}
