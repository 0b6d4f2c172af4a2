//! Configuration for the rotation engine
//!
//! This module provides two layers:
//! - **run_config**: RunConfig loaded from the JSON file (global defaults + collections)
//! - **resolve**: precedence merge of runtime overrides, collection overrides and defaults

pub mod resolve;
pub mod run_config;

// Re-export commonly used types
pub use resolve::{resolve, CollectionOverride, EffectiveSettings, GlobalDefaults, RuntimeOverride};
pub use run_config::RunConfig;
