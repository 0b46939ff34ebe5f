//! Core Kernel - Foundational types and utilities for the invoicing system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic and Indian digit grouping
//! - Serial identifiers for persisted records
//! - Port abstractions shared by domain ports and their adapters

pub mod money;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate, round_half_up, format_indian};
pub use identifiers::{InvoiceId, InvoiceItemId, CustomerId, ProductId, ShippingId};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use error::CoreError;
