//! Configuration module for ledger-import
//!
//! This module provides configuration management including:
//! - Platform path resolution
//! - User settings persistence (backend URL, token, wizard preferences)

pub mod paths;
pub mod settings;

pub use paths::ImportPaths;
pub use settings::Settings;
