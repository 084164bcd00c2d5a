use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, RwLock};

use cafekiosk_catalog::{CatalogError, CatalogResult, Product, ProductCatalog};
use cafekiosk_core::ProductNumber;

/// In-memory product catalog.
///
/// Intended for tests/dev. The number counter is kept separate from the
/// product map so a claimed-but-not-yet-inserted number is never issued
/// twice; seeding products directly through `insert` also bumps the counter
/// past their numbers.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<BTreeMap<ProductNumber, Product>>,
    counter: Mutex<Option<ProductNumber>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn find_by_numbers(&self, numbers: &BTreeSet<ProductNumber>) -> CatalogResult<Vec<Product>> {
        let products = self
            .products
            .read()
            .map_err(|_| CatalogError::Storage("lock poisoned".to_string()))?;

        Ok(numbers
            .iter()
            .filter_map(|number| products.get(number).cloned())
            .collect())
    }

    fn find_displayable(&self) -> CatalogResult<Vec<Product>> {
        let products = self
            .products
            .read()
            .map_err(|_| CatalogError::Storage("lock poisoned".to_string()))?;

        Ok(products
            .values()
            .filter(|product| product.selling_status().is_displayable())
            .cloned()
            .collect())
    }

    fn insert(&self, product: Product) -> CatalogResult<Product> {
        let number = product.number();

        let mut products = self
            .products
            .write()
            .map_err(|_| CatalogError::Storage("lock poisoned".to_string()))?;
        if products.contains_key(&number) {
            return Err(CatalogError::DuplicateNumber(number));
        }
        products.insert(number, product.clone());
        drop(products);

        let mut counter = self
            .counter
            .lock()
            .map_err(|_| CatalogError::Storage("lock poisoned".to_string()))?;
        if counter.is_none_or(|latest| latest < number) {
            *counter = Some(number);
        }

        Ok(product)
    }

    fn latest_product_number(&self) -> CatalogResult<Option<ProductNumber>> {
        let counter = self
            .counter
            .lock()
            .map_err(|_| CatalogError::Storage("lock poisoned".to_string()))?;
        Ok(*counter)
    }

    fn advance_product_number(
        &self,
        expected: Option<ProductNumber>,
        next: ProductNumber,
    ) -> CatalogResult<()> {
        let mut counter = self
            .counter
            .lock()
            .map_err(|_| CatalogError::Storage("lock poisoned".to_string()))?;

        if *counter != expected {
            return Err(CatalogError::StaleCounter);
        }
        *counter = Some(next);
        Ok(())
    }
}
