//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the import session.

pub mod catalog;
pub mod config;
pub mod import;

pub use catalog::{handle_catalog_command, CatalogCommands};
pub use config::{handle_config_command, ConfigCommands};
pub use import::{handle_import_command, ImportCommands};
