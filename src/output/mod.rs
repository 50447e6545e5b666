//! Output module for reporting on the product store
//!
//! This module handles:
//! - Aggregating catalog statistics
//! - Printing them for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, CatalogStatistics};
