//! Per-catalog presets.
//!
//! Each supported survey publishes dispositions under a different target
//! column and, for TESS, different feature names. These constructors bake in
//! the per-catalog wiring so callers only supply the data file.
use std::collections::HashMap;

use crate::classifier::DispositionClassifier;

/// Kepler cumulative KOI catalog: `koi_disposition` target, native `koi_*`
/// feature names.
pub fn kepler() -> DispositionClassifier {
    DispositionClassifier::new("Kepler").with_target_column("koi_disposition")
}

/// K2 planets-and-candidates catalog: `disposition` target.
pub fn k2() -> DispositionClassifier {
    DispositionClassifier::new("K2").with_target_column("disposition")
}

/// TESS objects-of-interest catalog: `tfopwg_disp` target, with the TOI
/// column names mapped onto the standardized `koi_*` vocabulary. The catalog
/// carries no detection SNR column, so `koi_model_snr` is synthesized during
/// harmonization.
pub fn tess() -> DispositionClassifier {
    let mapping: HashMap<String, String> = [
        ("pl_trandep", "koi_depth"),
        ("pl_trandur", "koi_duration"),
        ("pl_orbper", "koi_period"),
        ("pl_rade", "koi_prad"),
        ("st_teff", "koi_teq"),
    ]
    .into_iter()
    .map(|(src, dst)| (src.to_string(), dst.to_string()))
    .collect();

    DispositionClassifier::new("TESS")
        .with_target_column("tfopwg_disp")
        .with_column_mapping(mapping)
}

/// Human-readable explanations of the standardized features, for surfacing
/// alongside importance rankings.
pub fn feature_explanations() -> &'static [(&'static str, &'static str)] {
    &[
        (
            "koi_model_snr",
            "Signal-to-noise ratio: how clear the detection is. Higher = more reliable signal.",
        ),
        (
            "koi_depth",
            "Transit depth (ppm): how much the star dims when the object passes. Deeper = larger object.",
        ),
        (
            "koi_prad",
            "Planet radius (Earth radii): estimated size of the candidate planet.",
        ),
        (
            "koi_teq",
            "Equilibrium temperature (K): estimated temperature. Hotter = closer to the star.",
        ),
        (
            "koi_duration",
            "Transit duration (hours): how long the dimming lasts. Affected by orbit geometry.",
        ),
        (
            "koi_period",
            "Orbital period (days): how long the candidate takes to orbit its star.",
        ),
    ]
}
