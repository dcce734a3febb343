//! Catalog file readers.
pub mod catalog_csv;

pub use catalog_csv::read_catalog_csv;
