use cafekiosk_core::ProductNumber;

use crate::store::{CatalogError, CatalogResult, ProductCatalog};

/// Retry budget for concurrent allocation collisions.
const MAX_ALLOCATION_ATTEMPTS: u32 = 5;

/// Issues the next product number for new catalog entries.
///
/// Stateless: the latest-number state lives in the catalog collaborator's
/// counter. Allocation is an optimistic read-increment-claim loop; a claim
/// that loses the race is retried against the fresh latest value, so two
/// concurrent allocations can never both receive the same number.
#[derive(Debug)]
pub struct ProductNumberAllocator<C> {
    catalog: C,
}

impl<C> ProductNumberAllocator<C>
where
    C: ProductCatalog,
{
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Allocate the next product number.
    ///
    /// An empty catalog yields "001"; otherwise the latest number plus one,
    /// zero-padded ("009" → "010", "999" → "1000"). Surfaces
    /// `AllocationConflict` when the retry budget is exhausted.
    pub fn next_product_number(&self) -> CatalogResult<ProductNumber> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let latest = self.catalog.latest_product_number()?;
            let next = match latest {
                None => ProductNumber::FIRST,
                Some(latest) => latest.next(),
            };

            match self.catalog.advance_product_number(latest, next) {
                Ok(()) => return Ok(next),
                Err(CatalogError::StaleCounter) => {
                    tracing::warn!(attempt, %next, "product number claim lost the race, retrying");
                }
                Err(other) => return Err(other),
            }
        }

        Err(CatalogError::AllocationConflict {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }
}
