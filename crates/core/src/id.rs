//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Product number: the catalog-assigned product identity ("001", "002", …).
///
/// Stored as the numeric value; rendered zero-padded to at least three
/// digits, so "999" is followed by "1000" with no fixed cap. Ordered and
/// hashable so identifier sets and counting maps stay deterministic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ProductNumber(u32);

impl ProductNumber {
    /// The minimum product number, issued when the catalog is empty.
    pub const FIRST: ProductNumber = ProductNumber(1);

    /// The next product number in allocation order.
    pub fn next(self) -> ProductNumber {
        ProductNumber(self.0 + 1)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ProductNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl FromStr for ProductNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::invalid_id(format!(
                "ProductNumber: '{s}' is not a numeric string"
            )));
        }
        let value: u32 = s
            .parse()
            .map_err(|e| DomainError::invalid_id(format!("ProductNumber: {e}")))?;
        if value == 0 {
            return Err(DomainError::invalid_id(
                "ProductNumber: must be positive".to_string(),
            ));
        }
        Ok(ProductNumber(value))
    }
}

impl From<ProductNumber> for String {
    fn from(value: ProductNumber) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ProductNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
