//! ledger-import - statement import wizard for a personal-finance backend
//!
//! Bank and card statements are uploaded to the backend for parsing, then
//! audited locally: rows can be edited, split, deleted, flagged as tax events
//! and matched against reimbursements before the result is committed in one
//! request.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Catalog entries and the wire types of the import endpoints
//! - `wizard`: Step controller, commit form, reimbursements, suggestions
//! - `api`: The backend trait and its HTTP client
//! - `storage`: Draft and catalog persistence
//! - `audit`: Audit logging of every wizard change
//! - `services`: The import session that ties the above together
//! - `export`: CSV/JSON/YAML export of the audited rows
//! - `display` and `cli`: Terminal output and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_import::config::{ImportPaths, Settings};
//!
//! let paths = ImportPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod api;
pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;
pub mod wizard;

pub use error::{ImportError, ImportResult};
