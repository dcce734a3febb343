//! exovet-classifiers: disposition vetting models for transit survey catalogs.
//!
//! This crate trains tabular classifiers that predict exoplanet disposition
//! (candidate / confirmed / false positive) from astronomical survey
//! features. Source catalogs (Kepler, K2, TESS) disagree on column names and
//! label vocabulary, so the heart of the crate is harmonization: every input
//! table is reduced to one standardized six-feature schema and a four-way
//! standardized label before a scaler and random forest are fit.
//!
//! The design favors small, testable modules: loading, harmonization,
//! scaling, and the forest are independent pieces tied together by
//! [`classifier::DispositionClassifier`].
pub mod catalogs;
pub mod classifier;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod harmonize;
pub mod io;
pub mod labels;
pub mod math;
pub mod models;
pub mod preprocessing;

pub use classifier::{DispositionClassifier, FeatureImportance, FittedState, Prediction, Record};
pub use error::ClassifierError;
pub use labels::Disposition;
