//! Core types and configuration for the tariff dashboard.
//!
//! This crate provides shared types used across all other crates:
//! - Tariff rate parsing (`Rate`, `parse_rate`)
//! - Classification and time-series records
//! - The loaded dataset
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod dataset;
pub mod error;
pub mod rate;
pub mod types;

pub use config::Config;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use rate::{coerce_numeric, parse_rate, Rate};
pub use types::*;
