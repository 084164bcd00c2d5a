use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use cafekiosk_core::ProductNumber;

use crate::record::StockRecord;

/// Result type for stock ledger operations.
pub type StockResult<T> = Result<T, StockError>;

/// Stock ledger operation error.
#[derive(Debug, Error)]
pub enum StockError {
    /// Available quantity is less than requested. Not retried by the core;
    /// the caller may retry after replenishment.
    #[error(
        "insufficient stock for product {product_number}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_number: ProductNumber,
        requested: u32,
        available: u32,
    },

    /// No stock record tracks this product number.
    #[error("no stock record for product {0}")]
    RecordNotFound(ProductNumber),

    /// Deduction and restore quantities must be positive.
    #[error("stock quantity must be positive")]
    NonPositiveQuantity,

    /// The backing store failed (e.g. poisoned lock).
    #[error("stock storage unavailable: {0}")]
    Storage(String),
}

/// Stock ledger collaborator contract.
///
/// `check_and_deduct` must be linearizable per product number: two
/// concurrent orders for the same product can never both pass the
/// availability check and both deduct. Whether that is achieved with an
/// exclusive lock or a version check is the implementation's policy; the
/// coordinator never cares.
pub trait StockLedger: Send + Sync {
    /// Fetch stock records for a distinct set of product numbers.
    fn find_by_numbers(&self, numbers: &BTreeSet<ProductNumber>) -> StockResult<Vec<StockRecord>>;

    /// Atomically verify availability and deduct `quantity` units.
    ///
    /// When an order requests the same product N times this is called once
    /// with quantity = N, keeping the check-then-deduct window single-shot
    /// per product per order. On `InsufficientStock` no state is mutated.
    fn check_and_deduct(&self, product_number: ProductNumber, quantity: u32) -> StockResult<()>;

    /// Add `quantity` units back: the compensating inverse of a committed
    /// deduction, used to roll back a partially-deducted order.
    fn restore(&self, product_number: ProductNumber, quantity: u32) -> StockResult<()>;
}

impl<L> StockLedger for Arc<L>
where
    L: StockLedger + ?Sized,
{
    fn find_by_numbers(&self, numbers: &BTreeSet<ProductNumber>) -> StockResult<Vec<StockRecord>> {
        (**self).find_by_numbers(numbers)
    }

    fn check_and_deduct(&self, product_number: ProductNumber, quantity: u32) -> StockResult<()> {
        (**self).check_and_deduct(product_number, quantity)
    }

    fn restore(&self, product_number: ProductNumber, quantity: u32) -> StockResult<()> {
        (**self).restore(product_number, quantity)
    }
}
