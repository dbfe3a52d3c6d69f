//! Payment Domain - Source Ledger and Outcome States
//!
//! This crate implements the payment ledger for the checkout core: typed
//! sources tracking allocated/debited/refunded amounts per order and
//! method, an append-only event trail fanned out per order line, and the
//! closed vocabulary of outcome states methods report back.
//!
//! # Ledger rules
//!
//! - Mutations are signed deltas against current totals, so replays of the
//!   same target amount are no-ops
//! - Debits never exceed allocations; refunds never exceed debits
//! - Voids release allocations, floored at zero
//! - Events are journaled append-only and never mutated
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_payment::{PaymentSource, PaymentEvent, PaymentEventType};
//!
//! let mut source = store.get_or_create(&order, "Cash", "").await?;
//! source.allocate(delta)?;
//! source.debit(delta)?;
//! store.commit(source, vec![event]).await?;
//! ```

pub mod error;
pub mod events;
pub mod order;
pub mod repository;
pub mod source;
pub mod states;

pub use error::PaymentError;
pub use events::{PaymentEvent, PaymentEventQuantity, PaymentEventType};
pub use order::{Order, OrderLine, OrderStatus};
pub use repository::{InMemoryPaymentStore, OrderRepository, PaymentSourceRepository};
pub use source::PaymentSource;
pub use states::PaymentState;
