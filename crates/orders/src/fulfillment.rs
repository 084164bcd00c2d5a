use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use cafekiosk_catalog::{CatalogError, Product, ProductCatalog, ProductResolver};
use cafekiosk_core::{DomainError, ProductNumber};
use cafekiosk_stock::{StockError, StockLedger};

use crate::order::Order;

/// Order persistence collaborator contract: append-only save that assigns
/// the order's identity.
pub trait OrderStore: Send + Sync {
    fn save(&self, order: Order) -> Result<Order, OrderStoreError>;
}

impl<O> OrderStore for Arc<O>
where
    O: OrderStore + ?Sized,
{
    fn save(&self, order: Order) -> Result<Order, OrderStoreError> {
        (**self).save(order)
    }
}

/// Order persistence error.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    #[error("order storage unavailable: {0}")]
    Storage(String),
}

/// Failure of a single order-placement attempt.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Persistence(#[from] OrderStoreError),
}

/// Orchestrates one order request: resolve → deduct stock → assemble →
/// persist. No side effect (stock deduction, order persistence) stays
/// observable if any later step fails.
#[derive(Debug)]
pub struct OrderFulfillment<C, L, O> {
    resolver: ProductResolver<C>,
    ledger: L,
    orders: O,
}

impl<C, L, O> OrderFulfillment<C, L, O>
where
    C: ProductCatalog,
    L: StockLedger,
    O: OrderStore,
{
    pub fn new(catalog: C, ledger: L, orders: O) -> Self {
        Self {
            resolver: ProductResolver::new(catalog),
            ledger,
            orders,
        }
    }

    /// Place an order for the requested product numbers (repeats allowed).
    ///
    /// Returns the persisted order, or the first failure with every stock
    /// deduction of this attempt compensated.
    pub fn place_order(
        &self,
        requested: &[ProductNumber],
        registered_at: DateTime<Utc>,
    ) -> Result<Order, FulfillmentError> {
        let products = self.resolver.resolve(requested)?;

        let quantities = Self::stock_quantities(&products);
        self.deduct_stock(&quantities)?;

        let order = match Order::assemble(&products, registered_at) {
            Ok(order) => order,
            Err(err) => {
                self.roll_back(&quantities);
                return Err(err.into());
            }
        };

        match self.orders.save(order) {
            Ok(saved) => {
                tracing::info!(
                    order_id = ?saved.id(),
                    total_price = saved.total_price(),
                    line_items = saved.line_items().len(),
                    "order placed"
                );
                Ok(saved)
            }
            Err(err) => {
                self.roll_back(&quantities);
                Err(err.into())
            }
        }
    }

    /// Deduction quantity per distinct stock-tracked product: requesting the
    /// same product N times becomes one deduction of N, never N deductions
    /// of one.
    fn stock_quantities(products: &[Product]) -> BTreeMap<ProductNumber, u32> {
        let mut quantities = BTreeMap::new();
        for product in products.iter().filter(|p| p.is_stock_tracked()) {
            *quantities.entry(product.number()).or_insert(0u32) += 1;
        }
        quantities
    }

    /// Deduct every distinct stock-tracked product once. On the first
    /// failure, deductions already committed in this pass are restored
    /// before the failure surfaces.
    fn deduct_stock(
        &self,
        quantities: &BTreeMap<ProductNumber, u32>,
    ) -> Result<(), FulfillmentError> {
        let mut deducted: Vec<(ProductNumber, u32)> = Vec::with_capacity(quantities.len());

        for (&number, &quantity) in quantities {
            if let Err(err) = self.ledger.check_and_deduct(number, quantity) {
                tracing::warn!(product_number = %number, quantity, %err, "stock deduction failed");
                self.restore_deducted(&deducted);
                return Err(err.into());
            }
            deducted.push((number, quantity));
        }

        Ok(())
    }

    fn roll_back(&self, quantities: &BTreeMap<ProductNumber, u32>) {
        let deducted: Vec<(ProductNumber, u32)> =
            quantities.iter().map(|(&n, &q)| (n, q)).collect();
        self.restore_deducted(&deducted);
    }

    /// Compensate committed deductions. A failed restore is logged and does
    /// not mask the failure that triggered the rollback.
    fn restore_deducted(&self, deducted: &[(ProductNumber, u32)]) {
        for &(number, quantity) in deducted {
            if let Err(err) = self.ledger.restore(number, quantity) {
                tracing::error!(
                    product_number = %number,
                    quantity,
                    %err,
                    "stock restore failed while rolling back an order"
                );
            }
        }
    }
}
