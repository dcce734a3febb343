//! Minimal matrix type used throughout the crate.
//!
//! A row-major `f64` matrix with only the operations the pipeline needs.
//! Kept dependency-free so the public API does not leak a linear-algebra
//! crate.
pub mod matrix;

pub use matrix::{Matrix, ShapeError};
