//! Core Kernel - Foundational types and utilities for the checkout core
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers for orders, lines, sources, and events
//! - Port infrastructure with a unified adapter error type

pub mod identifiers;
pub mod money;
pub mod ports;

pub use identifiers::{LineId, OrderId, PaymentEventId, SourceId};
pub use money::{Currency, Money, MoneyError};
pub use ports::{DomainPort, PortError};
