//! The disposition classification pipeline.
//!
//! `DispositionClassifier` ties the stages together: load a catalog,
//! harmonize it, train a scaler plus forest on a stratified split, then
//! serve predictions and feature importances. Everything learned during
//! training lives in an immutable [`FittedState`] snapshot; retraining
//! builds a complete new snapshot and swaps it in with a single assignment,
//! so a snapshot in hand is never torn by a concurrent retrain.
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Serialize;

use crate::config::TrainConfig;
use crate::data_handling::{stratified_split, RawTable};
use crate::error::ClassifierError;
use crate::harmonize::{harmonize, HarmonizedData};
use crate::io::read_catalog_csv;
use crate::labels::{Disposition, TargetEncoder};
use crate::math::Matrix;
use crate::models::forest::argmax;
use crate::models::RandomForest;
use crate::preprocessing::StandardScaler;

/// A single named-field observation submitted for prediction.
pub type Record = HashMap<String, f64>;

/// Outcome of classifying one observation.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub predicted_class: Disposition,
    /// Probability of the predicted class.
    pub confidence: f64,
    /// Full distribution over every class the model was trained on, keyed by
    /// the standardized label string.
    pub probabilities: HashMap<String, f64>,
}

/// One ranked feature importance entry.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Immutable snapshot of everything a training run produced. Usable for
/// prediction on its own, independent of the classifier that created it.
#[derive(Debug, Clone)]
pub struct FittedState {
    model: RandomForest,
    scaler: StandardScaler,
    target_encoder: TargetEncoder,
    feature_names: Vec<String>,
}

impl FittedState {
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Classify a single record.
    ///
    /// Unlike training, inference never imputes: a record missing any of the
    /// standardized features is rejected with
    /// [`ClassifierError::MissingFeatures`] naming the absent fields.
    pub fn predict(&self, record: &Record) -> Result<Prediction, ClassifierError> {
        let mut results = self.predict_batch(std::slice::from_ref(record))?;
        Ok(results.remove(0))
    }

    /// Classify a batch of records, returning one prediction per row.
    pub fn predict_batch(&self, records: &[Record]) -> Result<Vec<Prediction>, ClassifierError> {
        self.validate_features(records)?;

        let mut cells = Vec::with_capacity(records.len() * self.feature_names.len());
        for record in records {
            for name in &self.feature_names {
                cells.push(record[name]);
            }
        }
        let x = Matrix::from_shape_vec((records.len(), self.feature_names.len()), cells)
            .expect("record cells are feature-aligned");
        let scaled = self.scaler.transform(&x);

        Ok(self
            .model
            .predict_proba(&scaled)
            .into_iter()
            .map(|dist| self.prediction_from_dist(&dist))
            .collect())
    }

    /// Top `top_n` features by importance, descending.
    pub fn feature_importance(&self, top_n: usize) -> Vec<FeatureImportance> {
        let mut ranked: Vec<FeatureImportance> = self
            .feature_names
            .iter()
            .zip(self.model.feature_importances())
            .map(|(feature, importance)| FeatureImportance {
                feature: feature.clone(),
                importance,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(top_n);
        ranked
    }

    fn validate_features(&self, records: &[Record]) -> Result<(), ClassifierError> {
        let mut missing = BTreeSet::new();
        for record in records {
            for name in &self.feature_names {
                if !record.contains_key(name) {
                    missing.insert(name.clone());
                }
            }
        }
        if !missing.is_empty() {
            return Err(ClassifierError::MissingFeatures(
                missing.into_iter().collect(),
            ));
        }
        Ok(())
    }

    fn prediction_from_dist(&self, dist: &[f64]) -> Prediction {
        let class_idx = argmax(dist);
        let decode = |idx: usize| {
            self.target_encoder
                .decode(idx)
                .expect("model classes match the fitted encoder")
        };
        Prediction {
            predicted_class: decode(class_idx),
            confidence: dist[class_idx],
            probabilities: dist
                .iter()
                .enumerate()
                .map(|(idx, &p)| (decode(idx).as_str().to_string(), p))
                .collect(),
        }
    }
}

/// Trains and serves a disposition model for one source catalog.
pub struct DispositionClassifier {
    name: String,
    target_column: String,
    column_mapping: HashMap<String, String>,
    config: TrainConfig,
    state: Option<FittedState>,
}

impl DispositionClassifier {
    /// Create an untrained classifier for the named dataset. The target
    /// column defaults to Kepler's `koi_disposition`; catalog presets in
    /// [`crate::catalogs`] override it.
    pub fn new(name: impl Into<String>) -> Self {
        DispositionClassifier {
            name: name.into(),
            target_column: "koi_disposition".to_string(),
            column_mapping: HashMap::new(),
            config: TrainConfig::default(),
            state: None,
        }
    }

    /// Set the per-catalog column mapping (source name → standardized name).
    pub fn with_column_mapping(mut self, mapping: HashMap<String, String>) -> Self {
        self.column_mapping = mapping;
        self
    }

    pub fn with_target_column(mut self, target_column: impl Into<String>) -> Self {
        self.target_column = target_column.into();
        self
    }

    pub fn with_config(mut self, config: TrainConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    /// The current training snapshot, if any.
    pub fn fitted(&self) -> Option<&FittedState> {
        self.state.as_ref()
    }

    /// Load a catalog CSV into memory.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<RawTable, ClassifierError> {
        read_catalog_csv(path)
    }

    /// Harmonize a raw table against the standardized schema.
    pub fn preprocess(
        &self,
        table: &RawTable,
        target_column: &str,
    ) -> Result<HarmonizedData, ClassifierError> {
        harmonize(table, target_column, &self.column_mapping)
    }

    /// Train on harmonized data and return held-out accuracy in [0, 1].
    ///
    /// Splits rows with a deterministic stratified 80/20 partition, fits the
    /// scaler on the training split only, fits the forest on the scaled
    /// training split, and scores accuracy on the scaled test split. On
    /// success the classifier's fitted state is replaced wholesale.
    pub fn train(&mut self, data: &HarmonizedData) -> Result<f64, ClassifierError> {
        let (train_idx, test_idx) = stratified_split(
            &data.targets,
            self.config.test_fraction,
            self.config.split_seed,
        )?;

        let x_train = data.features.x.select_rows(&train_idx);
        let x_test = data.features.x.select_rows(&test_idx);
        let y_train: Vec<usize> = train_idx.iter().map(|&i| data.targets[i]).collect();
        let y_test: Vec<usize> = test_idx.iter().map(|&i| data.targets[i]).collect();

        let scaler = StandardScaler::fit(&x_train);
        let x_train = scaler.transform(&x_train);
        let x_test = scaler.transform(&x_test);

        let model = RandomForest::fit(
            &x_train,
            &y_train,
            data.target_encoder.n_classes(),
            &self.config.forest,
        )?;

        let predicted = model.predict(&x_test);
        let correct = predicted.iter().zip(&y_test).filter(|(p, t)| p == t).count();
        let accuracy = correct as f64 / y_test.len() as f64;

        log::info!(
            "{}: trained on {} rows ({} classes), held-out accuracy {:.3}",
            self.name,
            y_train.len(),
            data.target_encoder.n_classes(),
            accuracy
        );

        self.state = Some(FittedState {
            model,
            scaler,
            target_encoder: data.target_encoder.clone(),
            feature_names: data.features.feature_names.clone(),
        });
        Ok(accuracy)
    }

    /// Load, harmonize, and train in one step using the configured target
    /// column. Returns held-out accuracy.
    pub fn load_and_train<P: AsRef<Path>>(&mut self, path: P) -> Result<f64, ClassifierError> {
        let table = self.load(path)?;
        let data = harmonize(&table, &self.target_column, &self.column_mapping)?;
        self.train(&data)
    }

    /// Classify a single record. Fails with [`ClassifierError::NotTrained`]
    /// before a successful `train` call.
    pub fn predict(&self, record: &Record) -> Result<Prediction, ClassifierError> {
        self.fitted_state()?.predict(record)
    }

    /// Classify a batch of records, one prediction per row.
    pub fn predict_batch(&self, records: &[Record]) -> Result<Vec<Prediction>, ClassifierError> {
        self.fitted_state()?.predict_batch(records)
    }

    /// Top `top_n` feature importances, descending.
    pub fn feature_importance(
        &self,
        top_n: usize,
    ) -> Result<Vec<FeatureImportance>, ClassifierError> {
        Ok(self.fitted_state()?.feature_importance(top_n))
    }

    fn fitted_state(&self) -> Result<&FittedState, ClassifierError> {
        self.state.as_ref().ok_or(ClassifierError::NotTrained)
    }
}
