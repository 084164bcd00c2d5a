use std::collections::{BTreeSet, HashMap};

use cafekiosk_core::{DomainError, ProductNumber};

use crate::product::Product;
use crate::store::{CatalogError, CatalogResult, ProductCatalog};

/// Maps a requested sequence of product numbers (duplicates allowed) to the
/// matching catalog entries, preserving order and multiplicity.
#[derive(Debug)]
pub struct ProductResolver<C> {
    catalog: C,
}

impl<C> ProductResolver<C>
where
    C: ProductCatalog,
{
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Resolve every requested number to its product.
    ///
    /// The result has the same length and order as the request: position `i`
    /// is the product for the `i`-th requested number. The catalog is hit
    /// once with the distinct number set, so lookup cost is bounded by the
    /// distinct count, not the request length. Any number without a catalog
    /// entry fails the whole resolution.
    pub fn resolve(&self, requested: &[ProductNumber]) -> CatalogResult<Vec<Product>> {
        if requested.is_empty() {
            return Err(DomainError::validation("at least one product number is required").into());
        }

        let distinct: BTreeSet<ProductNumber> = requested.iter().copied().collect();
        let products = self.catalog.find_by_numbers(&distinct)?;

        let index: HashMap<ProductNumber, Product> = products
            .into_iter()
            .map(|product| (product.number(), product))
            .collect();

        requested
            .iter()
            .map(|number| {
                index
                    .get(number)
                    .cloned()
                    .ok_or(CatalogError::UnresolvedProduct(*number))
            })
            .collect()
    }
}
