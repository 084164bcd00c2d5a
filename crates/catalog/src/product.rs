use serde::{Deserialize, Serialize};

use cafekiosk_core::{DomainError, DomainResult, Entity, ProductNumber};

/// Product category.
///
/// A closed set: the stock-tracked check below must stay an exhaustive
/// match so adding a category is a compile-time-visible change everywhere
/// it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    /// Made to order; no quantity ledger.
    Handmade,
    /// Bottled goods, drawn from a finite stock.
    Bottle,
    /// Bakery goods, drawn from a finite stock.
    Bakery,
}

impl ProductCategory {
    /// Whether units of this category are drawn from a depletable quantity.
    pub fn is_stock_tracked(self) -> bool {
        match self {
            ProductCategory::Handmade => false,
            ProductCategory::Bottle | ProductCategory::Bakery => true,
        }
    }
}

/// Selling status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellingStatus {
    Selling,
    Hold,
    StopSelling,
}

impl SellingStatus {
    /// Statuses shown on the storefront listing.
    pub fn for_display() -> [SellingStatus; 2] {
        [SellingStatus::Selling, SellingStatus::Hold]
    }

    pub fn is_displayable(self) -> bool {
        match self {
            SellingStatus::Selling | SellingStatus::Hold => true,
            SellingStatus::StopSelling => false,
        }
    }
}

/// Catalog entry. Immutable after creation; orders reference it by number
/// and snapshot its price, they never own it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    number: ProductNumber,
    category: ProductCategory,
    selling_status: SellingStatus,
    name: String,
    /// Unit price in the smallest currency unit.
    price: u64,
}

impl Product {
    pub fn new(
        number: ProductNumber,
        category: ProductCategory,
        selling_status: SellingStatus,
        name: impl Into<String>,
        price: u64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if price == 0 {
            return Err(DomainError::validation("price must be positive"));
        }
        Ok(Self {
            number,
            category,
            selling_status,
            name,
            price,
        })
    }

    pub fn number(&self) -> ProductNumber {
        self.number
    }

    pub fn category(&self) -> ProductCategory {
        self.category
    }

    pub fn selling_status(&self) -> SellingStatus {
        self.selling_status
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    /// Whether this product's units deplete a stock record.
    pub fn is_stock_tracked(&self) -> bool {
        self.category.is_stock_tracked()
    }
}

impl Entity for Product {
    type Id = ProductNumber;

    fn id(&self) -> &Self::Id {
        &self.number
    }
}
