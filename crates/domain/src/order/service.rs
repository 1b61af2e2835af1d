//! In-memory order registry and the per-order serialization point.
//!
//! The domain layer itself is synchronous and single-threaded per order;
//! the service provides the single-writer guarantee the aggregate
//! requires: one logical mutation in flight per order identity, with
//! reads taking the same lock so they never observe a half-applied
//! mutation.

use std::collections::HashMap;
use std::sync::Arc;

use common::OrderId;
use tokio::sync::{Mutex, RwLock};

use super::OrderError;
use super::aggregate::Order;
use super::value_objects::FulfillmentId;
use super::wire::{
    FulfillmentUpdateResponse, FulfillmentUpdateTrackingInput, OrderSnapshot, WireError,
};

/// Hosts order aggregates behind per-order locks.
#[derive(Default)]
pub struct OrderService {
    orders: RwLock<HashMap<OrderId, Arc<Mutex<Order>>>>,
}

impl OrderService {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an order, replacing any previous aggregate under the
    /// same ID.
    pub async fn insert(&self, order: Order) {
        let mut orders = self.orders.write().await;
        orders.insert(order.id(), Arc::new(Mutex::new(order)));
    }

    /// Returns a snapshot clone of an order.
    pub async fn get(&self, order_id: OrderId) -> Option<Order> {
        let handle = self.handle(order_id).await?;
        let order = handle.lock().await;
        Some(order.clone())
    }

    /// Finds the order owning a fulfillment, for callers that only hold
    /// the fulfillment ID.
    pub async fn find_order_by_fulfillment(
        &self,
        fulfillment_id: &FulfillmentId,
    ) -> Option<OrderId> {
        let handles: Vec<Arc<Mutex<Order>>> =
            self.orders.read().await.values().cloned().collect();
        for handle in handles {
            let order = handle.lock().await;
            if order.fulfillment(fulfillment_id).is_some() {
                return Some(order.id());
            }
        }
        None
    }

    /// Runs one mutation against an order under its lock.
    ///
    /// This is the entry point every order mutation goes through; the
    /// per-order mutex makes the aggregate's check-then-act sequences
    /// safe without any locking inside the domain types.
    pub async fn execute<F, T>(&self, order_id: OrderId, mutation: F) -> Result<T, OrderError>
    where
        F: FnOnce(&mut Order) -> Result<T, OrderError>,
    {
        let handle = self
            .handle(order_id)
            .await
            .ok_or(OrderError::OrderNotFound { id: order_id })?;
        let mut order = handle.lock().await;
        mutation(&mut order)
    }

    /// Applies a tracking-number update to a fulfillment and returns the
    /// wire response: either the updated order snapshot or a non-empty
    /// error list, never both.
    #[tracing::instrument(skip(self, input), fields(%order_id))]
    pub async fn update_fulfillment_tracking(
        &self,
        order_id: OrderId,
        fulfillment_id: &FulfillmentId,
        input: FulfillmentUpdateTrackingInput,
    ) -> FulfillmentUpdateResponse {
        let outcome = self
            .execute(order_id, |order| {
                order.update_fulfillment_tracking(
                    fulfillment_id,
                    &input.tracking_number,
                    input.notify_customer,
                )?;
                OrderSnapshot::capture(order)
            })
            .await;

        match outcome {
            Ok(snapshot) => {
                metrics::counter!("order_tracking_updates_total").increment(1);
                FulfillmentUpdateResponse::success(snapshot)
            }
            Err(error) => {
                metrics::counter!("order_tracking_update_failures_total").increment(1);
                tracing::warn!(%error, "tracking update rejected");
                FulfillmentUpdateResponse::failure(vec![WireError::from(&error)])
            }
        }
    }

    async fn handle(&self, order_id: OrderId) -> Option<Arc<Mutex<Order>>> {
        self.orders.read().await.get(&order_id).cloned()
    }
}
