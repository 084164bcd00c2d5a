use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cafekiosk_catalog::Product;
use cafekiosk_core::{DomainError, DomainResult, ProductNumber, ValueObject};

/// Order identifier, assigned by the persistence collaborator on save.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Create a new identifier (UUIDv7, time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order status lifecycle: `Init` → `PaymentCompleted` (terminal).
///
/// This core only ever produces `Init`; the payment transition belongs to
/// external payment collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Init,
    PaymentCompleted,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        match self {
            OrderStatus::Init => false,
            OrderStatus::PaymentCompleted => true,
        }
    }
}

/// One unit of a product within an order, with the unit price snapshotted
/// at order time so later catalog price changes never alter history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    product_number: ProductNumber,
    unit_price: u64,
}

impl OrderLineItem {
    fn snapshot(product: &Product) -> Self {
        Self {
            product_number: product.number(),
            unit_price: product.price(),
        }
    }

    pub fn product_number(&self) -> ProductNumber {
        self.product_number
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }
}

impl ValueObject for OrderLineItem {}

/// Immutable priced order record.
///
/// One line item per resolved product in input order (duplicates expanded,
/// never deduplicated); total price is the sum of line-item prices. After
/// assembly only the status may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: Option<OrderId>,
    status: OrderStatus,
    total_price: u64,
    registered_at: DateTime<Utc>,
    line_items: Vec<OrderLineItem>,
}

impl Order {
    /// Assemble an order from resolved products and a caller-supplied
    /// registration timestamp (never captured internally — deterministic
    /// tests). Identity stays unset until persistence.
    pub fn assemble(products: &[Product], registered_at: DateTime<Utc>) -> DomainResult<Self> {
        if products.is_empty() {
            return Err(DomainError::validation(
                "cannot assemble an order without products",
            ));
        }

        let line_items: Vec<OrderLineItem> =
            products.iter().map(OrderLineItem::snapshot).collect();
        let total_price = line_items.iter().map(OrderLineItem::unit_price).sum();

        Ok(Self {
            id: None,
            status: OrderStatus::Init,
            total_price,
            registered_at,
            line_items,
        })
    }

    /// Attach the persistence-assigned identity.
    pub fn with_id(mut self, id: OrderId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<OrderId> {
        self.id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn total_price(&self) -> u64 {
        self.total_price
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn line_items(&self) -> &[OrderLineItem] {
        &self.line_items
    }

    /// Mark the order's payment as completed.
    ///
    /// Owned by external payment collaborators; only valid from `Init`.
    pub fn complete_payment(&mut self) -> DomainResult<()> {
        match self.status {
            OrderStatus::Init => {
                self.status = OrderStatus::PaymentCompleted;
                Ok(())
            }
            OrderStatus::PaymentCompleted => Err(DomainError::invariant(
                "payment is already completed for this order",
            )),
        }
    }
}
