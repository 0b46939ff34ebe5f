//! Repository implementations
//!
//! Repositories encapsulate SQL and map between database rows and plain
//! record structs. They know nothing about domain types; the adapters in
//! [`crate::adapters`] do that translation.

pub mod invoice;

pub use invoice::InvoiceRepository;
