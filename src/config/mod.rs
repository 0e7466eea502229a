//! Configuration for a harvest run
//!
//! This module provides the `HarvestConfig` struct and its type-safe builder
//! with validation and defaults for every timeout, cooldown and budget.

pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

pub use builder::{HarvestConfigBuilder, WithOutputDir, WithSiteUrl};
pub use types::{HarvestConfig, RetryPolicy};
