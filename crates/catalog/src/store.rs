use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use cafekiosk_core::{DomainError, ProductNumber};

use crate::product::Product;

/// Result type for catalog collaborator operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog operation error.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A requested product number has no catalog entry. Not retried;
    /// surfaced to the caller as a rejected request.
    #[error("no catalog entry for product number {0}")]
    UnresolvedProduct(ProductNumber),

    /// A product with this number is already registered.
    #[error("product number {0} is already registered")]
    DuplicateNumber(ProductNumber),

    /// The allocation counter advanced concurrently; the allocator retries
    /// this internally.
    #[error("product number counter advanced concurrently")]
    StaleCounter,

    /// Concurrent allocation kept colliding past the retry budget.
    #[error("product number allocation conflicted after {attempts} attempts")]
    AllocationConflict { attempts: u32 },

    /// The backing store failed (e.g. poisoned lock).
    #[error("catalog storage unavailable: {0}")]
    Storage(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Catalog collaborator contract.
///
/// Lookup serves order resolution; `insert` and the counter pair serve the
/// product-creation path. The counter is the catalog's own atomic primitive:
/// `advance_product_number` must be linearizable so two concurrent
/// allocations can never both advance from the same latest value.
pub trait ProductCatalog: Send + Sync {
    /// Fetch catalog entries for a distinct set of product numbers.
    /// Numbers without an entry are simply absent from the result.
    fn find_by_numbers(&self, numbers: &BTreeSet<ProductNumber>) -> CatalogResult<Vec<Product>>;

    /// Products whose selling status is displayable on the storefront.
    fn find_displayable(&self) -> CatalogResult<Vec<Product>>;

    /// Register a new product. Fails with `DuplicateNumber` when the number
    /// is already taken.
    fn insert(&self, product: Product) -> CatalogResult<Product>;

    /// The highest product number known to the catalog, if any.
    fn latest_product_number(&self) -> CatalogResult<Option<ProductNumber>>;

    /// Atomically advance the number counter from `expected` to `next`.
    /// Fails with `StaleCounter` when another allocation got there first.
    fn advance_product_number(
        &self,
        expected: Option<ProductNumber>,
        next: ProductNumber,
    ) -> CatalogResult<()>;
}

impl<C> ProductCatalog for Arc<C>
where
    C: ProductCatalog + ?Sized,
{
    fn find_by_numbers(&self, numbers: &BTreeSet<ProductNumber>) -> CatalogResult<Vec<Product>> {
        (**self).find_by_numbers(numbers)
    }

    fn find_displayable(&self) -> CatalogResult<Vec<Product>> {
        (**self).find_displayable()
    }

    fn insert(&self, product: Product) -> CatalogResult<Product> {
        (**self).insert(product)
    }

    fn latest_product_number(&self) -> CatalogResult<Option<ProductNumber>> {
        (**self).latest_product_number()
    }

    fn advance_product_number(
        &self,
        expected: Option<ProductNumber>,
        next: ProductNumber,
    ) -> CatalogResult<()> {
        (**self).advance_product_number(expected, next)
    }
}
