use serde::{Deserialize, Serialize};

use crate::allocator::ProductNumberAllocator;
use crate::product::{Product, ProductCategory, SellingStatus};
use crate::store::{CatalogResult, ProductCatalog};

/// Attributes of a product being registered; the number is allocated here,
/// never supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub category: ProductCategory,
    pub selling_status: SellingStatus,
    pub name: String,
    pub price: u64,
}

/// Catalog application service: product registration and storefront queries.
#[derive(Debug)]
pub struct CatalogService<C> {
    catalog: C,
    allocator: ProductNumberAllocator<C>,
}

impl<C> CatalogService<C>
where
    C: ProductCatalog + Clone,
{
    pub fn new(catalog: C) -> Self {
        let allocator = ProductNumberAllocator::new(catalog.clone());
        Self { catalog, allocator }
    }

    /// Register a new catalog entry under the next product number.
    pub fn register_product(&self, new: NewProduct) -> CatalogResult<Product> {
        let number = self.allocator.next_product_number()?;
        let product = Product::new(
            number,
            new.category,
            new.selling_status,
            new.name,
            new.price,
        )?;

        let registered = self.catalog.insert(product)?;
        tracing::info!(number = %registered.number(), name = registered.name(), "product registered");
        Ok(registered)
    }

    /// Products currently shown on the storefront.
    pub fn displayable_products(&self) -> CatalogResult<Vec<Product>> {
        self.catalog.find_displayable()
    }
}
