//! assetpull core: historical price acquisition for a fixed asset list.
//!
//! This crate contains everything except the command line:
//! - Provider contract and the Yahoo Finance chart provider
//! - Column flattening from provider frames to tagged price series
//! - Sequential batch fetcher with per-symbol failure isolation
//! - CSV sink for per-symbol and combined files
//! - TOML batch configuration

pub mod config;
pub mod data;

pub use config::{BatchConfig, ConfigError};
