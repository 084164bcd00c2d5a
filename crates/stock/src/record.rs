use serde::{Deserialize, Serialize};

use cafekiosk_core::{DomainError, DomainResult, Entity, ProductNumber};

/// Available quantity for one stock-tracked product.
///
/// Created alongside the product, mutated only through the ledger's
/// check-and-deduct (and its compensating restore), never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    product_number: ProductNumber,
    quantity: u32,
}

impl StockRecord {
    pub fn new(product_number: ProductNumber, quantity: u32) -> Self {
        Self {
            product_number,
            quantity,
        }
    }

    pub fn product_number(&self) -> ProductNumber {
        self.product_number
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Whether the available quantity is less than `requested`.
    pub fn is_quantity_less_than(&self, requested: u32) -> bool {
        self.quantity < requested
    }

    /// Deduct `quantity` units. Errors without mutating when the available
    /// quantity is insufficient; the quantity can never go negative.
    pub fn deduct(&mut self, quantity: u32) -> DomainResult<()> {
        if self.is_quantity_less_than(quantity) {
            return Err(DomainError::invariant(
                "no stock quantity left to deduct",
            ));
        }
        self.quantity -= quantity;
        Ok(())
    }

    /// Add `quantity` units back (compensation for a committed deduction).
    pub fn restore(&mut self, quantity: u32) {
        self.quantity += quantity;
    }
}

impl Entity for StockRecord {
    type Id = ProductNumber;

    fn id(&self) -> &Self::Id {
        &self.product_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(s: &str) -> ProductNumber {
        s.parse().unwrap()
    }

    #[test]
    fn detects_quantity_below_request() {
        let stock = StockRecord::new(number("001"), 1);
        assert!(stock.is_quantity_less_than(2));
        assert!(!stock.is_quantity_less_than(1));
    }

    #[test]
    fn deducts_the_given_quantity() {
        let mut stock = StockRecord::new(number("001"), 1);
        stock.deduct(1).unwrap();
        assert_eq!(stock.quantity(), 0);
    }

    #[test]
    fn deducting_more_than_available_fails_without_mutation() {
        let mut stock = StockRecord::new(number("001"), 1);

        let err = stock.deduct(2).unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation for oversized deduction"),
        }
        assert_eq!(stock.quantity(), 1);
    }

    #[test]
    fn restore_adds_quantity_back() {
        let mut stock = StockRecord::new(number("001"), 3);
        stock.deduct(2).unwrap();
        stock.restore(2);
        assert_eq!(stock.quantity(), 3);
    }
}
