//! Persistence ports for the payment ledger
//!
//! The real order/source store belongs to the host commerce platform; the
//! checkout core consumes it through these traits. `InMemoryPaymentStore`
//! is the adapter used by the server binary and the test suite. Its single
//! lock makes every `commit` atomic (source update + event appends land
//! together or not at all) and doubles as the guard against two checkout
//! submissions applying stale deltas to the same source.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use core_kernel::{DomainPort, OrderId, PortError, SourceId};

use crate::events::PaymentEvent;
use crate::order::Order;
use crate::source::PaymentSource;

/// Port over the payment-source ledger store
#[async_trait]
pub trait PaymentSourceRepository: DomainPort {
    /// Fetches the source for (order, method, reference), creating it with
    /// zero balances on first use
    async fn get_or_create(
        &self,
        order: &Order,
        method_name: &str,
        reference: &str,
    ) -> Result<PaymentSource, PortError>;

    /// Looks up a source by id
    async fn find_source(&self, id: SourceId) -> Result<Option<PaymentSource>, PortError>;

    /// Atomically persists an updated source together with any events it
    /// produced; rolls back entirely on failure
    ///
    /// The source carries the version it was read at; a commit over a
    /// source someone else has committed since is rejected as a conflict,
    /// so two racing submissions cannot both apply deltas computed from
    /// the same snapshot.
    async fn commit(
        &self,
        source: PaymentSource,
        events: Vec<PaymentEvent>,
    ) -> Result<(), PortError>;

    /// All events journaled for an order, oldest first
    async fn events_for_order(&self, order_id: OrderId) -> Result<Vec<PaymentEvent>, PortError>;
}

/// Port over the host platform's order store
#[async_trait]
pub trait OrderRepository: DomainPort {
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, PortError>;
    async fn save_order(&self, order: &Order) -> Result<(), PortError>;
}

#[derive(Default)]
struct StoreInner {
    sources: HashMap<SourceId, PaymentSource>,
    // (order, method name, reference) -> source
    source_index: HashMap<(OrderId, String, String), SourceId>,
    events: Vec<PaymentEvent>,
    orders: HashMap<OrderId, Order>,
}

/// In-memory adapter backing both ledger and order ports
///
/// Lock discipline: every operation takes the one mutex for its full
/// duration and never awaits while holding it.
#[derive(Default)]
pub struct InMemoryPaymentStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreInner>, PortError> {
        self.inner
            .lock()
            .map_err(|_| PortError::internal("payment store lock poisoned"))
    }
}

impl DomainPort for InMemoryPaymentStore {}

#[async_trait]
impl PaymentSourceRepository for InMemoryPaymentStore {
    async fn get_or_create(
        &self,
        order: &Order,
        method_name: &str,
        reference: &str,
    ) -> Result<PaymentSource, PortError> {
        let mut inner = self.lock()?;
        let key = (order.id, method_name.to_string(), reference.to_string());

        if let Some(id) = inner.source_index.get(&key) {
            let source = inner
                .sources
                .get(id)
                .cloned()
                .ok_or_else(|| PortError::internal("source index points at missing source"))?;
            return Ok(source);
        }

        let source = PaymentSource::new(order.id, method_name, reference, order.currency);
        tracing::debug!(
            order = %order.number,
            method = method_name,
            source_id = %source.id,
            "created payment source"
        );
        inner.source_index.insert(key, source.id);
        inner.sources.insert(source.id, source.clone());
        Ok(source)
    }

    async fn find_source(&self, id: SourceId) -> Result<Option<PaymentSource>, PortError> {
        let inner = self.lock()?;
        Ok(inner.sources.get(&id).cloned())
    }

    async fn commit(
        &self,
        mut source: PaymentSource,
        events: Vec<PaymentEvent>,
    ) -> Result<(), PortError> {
        let mut inner = self.lock()?;
        let stored = inner
            .sources
            .get(&source.id)
            .ok_or_else(|| PortError::not_found("PaymentSource", source.id))?;
        if stored.version != source.version {
            return Err(PortError::conflict(format!(
                "payment source {} was committed by someone else",
                source.id
            )));
        }
        source.version += 1;
        inner.sources.insert(source.id, source);
        inner.events.extend(events);
        Ok(())
    }

    async fn events_for_order(&self, order_id: OrderId) -> Result<Vec<PaymentEvent>, PortError> {
        let inner = self.lock()?;
        Ok(inner
            .events
            .iter()
            .filter(|e| e.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderRepository for InMemoryPaymentStore {
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>, PortError> {
        let inner = self.lock()?;
        Ok(inner.orders.get(&id).cloned())
    }

    async fn save_order(&self, order: &Order) -> Result<(), PortError> {
        let mut inner = self.lock()?;
        inner.orders.insert(order.id, order.clone());
        Ok(())
    }
}
