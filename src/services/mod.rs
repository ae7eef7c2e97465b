//! Service layer for ledger-import
//!
//! Runs the wizard against the backend and the local stores, recording every
//! change in the audit log.

pub mod import;

pub use import::{ImportSession, ParseOutcome};
