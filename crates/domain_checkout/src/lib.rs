//! Checkout Domain - Payment Method Strategies and Orchestration
//!
//! This crate turns a client's checkout submission into ledger activity:
//!
//! - `PaymentMethod` is the strategy seam; `Cash`, `PayLater`, and `Stripe`
//!   are the stock variants
//! - `MethodRegistry` wires methods up at startup, by code
//! - `PaymentMethodSelection` validates what the client asked for
//! - `CheckoutProcessor` voids, records, and settles payments and decides
//!   the order's payment status
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_checkout::{CheckoutProcessor, MethodRegistry};
//!
//! let processor = CheckoutProcessor::new(
//!     MethodRegistry::with_default_methods(),
//!     sources,
//!     orders,
//!     states,
//! );
//! let states = processor.record_payments(&mut order, &selections).await?;
//! ```

pub mod error;
pub mod methods;
pub mod processor;
pub mod registry;
pub mod selection;
pub mod state_store;

pub use error::CheckoutError;
pub use methods::{Cash, PayLater, PaymentMethod, Stripe};
pub use processor::CheckoutProcessor;
pub use registry::MethodRegistry;
pub use selection::{FieldError, PaymentAmount, PaymentMethodSelection, ValidatedSelection};
pub use state_store::{InMemoryStateStore, PaymentStateStore, RecordedPayment};
