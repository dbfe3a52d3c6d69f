//! Per-order payment-state storage
//!
//! The active method-key → state mapping is the order's current payment
//! standing. It is derived data (each state is recomputed from ledger
//! totals whenever a method runs) but must survive between the checkout
//! submission and the processor's settlement callbacks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use core_kernel::{DomainPort, OrderId, PortError};
use domain_payment::PaymentState;

/// One method's recorded contribution to an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedPayment {
    /// Code of the method that produced the state
    pub method_code: String,
    pub state: PaymentState,
}

/// Port over the order's payment-state mapping
#[async_trait]
pub trait PaymentStateStore: DomainPort {
    /// Current states for an order, keyed by method key
    async fn states_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<BTreeMap<String, RecordedPayment>, PortError>;

    /// Replaces the full mapping for an order
    async fn set_states(
        &self,
        order_id: OrderId,
        states: BTreeMap<String, RecordedPayment>,
    ) -> Result<(), PortError>;

    /// Updates a single method key (settlement callbacks)
    async fn update_state(
        &self,
        order_id: OrderId,
        method_key: &str,
        payment: RecordedPayment,
    ) -> Result<(), PortError>;
}

/// In-memory state store used by the server binary and tests
#[derive(Default)]
pub struct InMemoryStateStore {
    inner: Mutex<HashMap<OrderId, BTreeMap<String, RecordedPayment>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<OrderId, BTreeMap<String, RecordedPayment>>>, PortError>
    {
        self.inner
            .lock()
            .map_err(|_| PortError::internal("state store lock poisoned"))
    }
}

impl DomainPort for InMemoryStateStore {}

#[async_trait]
impl PaymentStateStore for InMemoryStateStore {
    async fn states_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<BTreeMap<String, RecordedPayment>, PortError> {
        let inner = self.lock()?;
        Ok(inner.get(&order_id).cloned().unwrap_or_default())
    }

    async fn set_states(
        &self,
        order_id: OrderId,
        states: BTreeMap<String, RecordedPayment>,
    ) -> Result<(), PortError> {
        let mut inner = self.lock()?;
        inner.insert(order_id, states);
        Ok(())
    }

    async fn update_state(
        &self,
        order_id: OrderId,
        method_key: &str,
        payment: RecordedPayment,
    ) -> Result<(), PortError> {
        let mut inner = self.lock()?;
        inner
            .entry(order_id)
            .or_default()
            .insert(method_key.to_string(), payment);
        Ok(())
    }
}
