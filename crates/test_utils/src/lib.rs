//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! invoicing test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for customers, dates, and catalogue items
//! - `builders`: Builder patterns for drafts and line items
//! - `memory`: In-memory `InvoiceStorePort` with race simulation hooks
//! - `database`: PostgreSQL testcontainer management
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod memory;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use memory::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
