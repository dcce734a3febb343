//! Tree-ensemble models.
pub mod forest;
pub mod tree;

pub use forest::RandomForest;
