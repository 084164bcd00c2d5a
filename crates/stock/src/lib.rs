//! `cafekiosk-stock` — stock ledger domain.
//!
//! Holds per-product available quantity for stock-tracked products and the
//! ledger collaborator contract whose check-and-deduct is the oversell
//! guard under concurrent orders.

pub mod ledger;
pub mod record;

pub use ledger::{StockError, StockLedger, StockResult};
pub use record::StockRecord;
