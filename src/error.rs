use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Errors surfaced by the classification pipeline.
#[derive(Debug)]
pub enum ClassifierError {
    /// The catalog file does not exist at the given path.
    DataFileNotFound(PathBuf),
    /// Prediction or importance inspection requested before training.
    NotTrained,
    /// Prediction input lacks one or more of the standardized features.
    /// Names are sorted for stable error messages.
    MissingFeatures(Vec<String>),
    /// A precondition of harmonization or training does not hold
    /// (e.g. fewer than two target classes for a stratified split).
    Precondition(String),
    /// The catalog file exists but could not be parsed.
    Csv(csv::Error),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierError::DataFileNotFound(path) => {
                write!(f, "data file not found: {}", path.display())
            }
            ClassifierError::NotTrained => {
                write!(f, "model must be trained before making predictions")
            }
            ClassifierError::MissingFeatures(names) => {
                write!(f, "missing features: {}", names.join(", "))
            }
            ClassifierError::Precondition(msg) => write!(f, "precondition violated: {}", msg),
            ClassifierError::Csv(err) => write!(f, "failed to parse catalog file: {}", err),
        }
    }
}

impl Error for ClassifierError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClassifierError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<csv::Error> for ClassifierError {
    fn from(err: csv::Error) -> Self {
        ClassifierError::Csv(err)
    }
}
