use std::sync::RwLock;

use cafekiosk_orders::{Order, OrderId, OrderStore, OrderStoreError};

/// In-memory append-only order store; assigns order identity on save.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every persisted order, in save order.
    pub fn find_all(&self) -> Result<Vec<Order>, OrderStoreError> {
        let orders = self
            .orders
            .read()
            .map_err(|_| OrderStoreError::Storage("lock poisoned".to_string()))?;
        Ok(orders.clone())
    }
}

impl OrderStore for InMemoryOrderStore {
    fn save(&self, order: Order) -> Result<Order, OrderStoreError> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| OrderStoreError::Storage("lock poisoned".to_string()))?;

        let saved = order.with_id(OrderId::new());
        orders.push(saved.clone());
        Ok(saved)
    }
}
