//! Merge per-city weather CSV files into one normalized dataset.
//!
//! Headers from every file are normalized (`"Precipitação (mm)"` becomes
//! `precipitacao_mm`), the canonical meteorological columns are located among
//! them, their values are rounded to one decimal for display, and the rows are
//! written out sorted by city and date.

pub mod columns;
pub mod config;
pub mod pipeline;
pub mod process;

pub use config::MergeConfig;
pub use pipeline::{run, MergeSummary};
