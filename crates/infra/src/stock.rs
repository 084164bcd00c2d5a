use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use cafekiosk_core::ProductNumber;
use cafekiosk_stock::{StockError, StockLedger, StockRecord, StockResult};

/// In-memory stock ledger with pessimistic concurrency control.
///
/// The whole check-and-deduct runs under the map's exclusive write lock, so
/// deductions are linearizable per product number (and, in this small
/// implementation, across the whole ledger).
#[derive(Debug, Default)]
pub struct InMemoryStockLedger {
    records: RwLock<HashMap<ProductNumber, StockRecord>>,
}

impl InMemoryStockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replenish a stock record.
    pub fn upsert(&self, record: StockRecord) -> StockResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StockError::Storage("lock poisoned".to_string()))?;
        records.insert(record.product_number(), record);
        Ok(())
    }
}

impl StockLedger for InMemoryStockLedger {
    fn find_by_numbers(&self, numbers: &BTreeSet<ProductNumber>) -> StockResult<Vec<StockRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| StockError::Storage("lock poisoned".to_string()))?;

        Ok(numbers
            .iter()
            .filter_map(|number| records.get(number).cloned())
            .collect())
    }

    fn check_and_deduct(&self, product_number: ProductNumber, quantity: u32) -> StockResult<()> {
        if quantity == 0 {
            return Err(StockError::NonPositiveQuantity);
        }

        let mut records = self
            .records
            .write()
            .map_err(|_| StockError::Storage("lock poisoned".to_string()))?;
        let record = records
            .get_mut(&product_number)
            .ok_or(StockError::RecordNotFound(product_number))?;

        let available = record.quantity();
        record
            .deduct(quantity)
            .map_err(|_| StockError::InsufficientStock {
                product_number,
                requested: quantity,
                available,
            })
    }

    fn restore(&self, product_number: ProductNumber, quantity: u32) -> StockResult<()> {
        if quantity == 0 {
            return Err(StockError::NonPositiveQuantity);
        }

        let mut records = self
            .records
            .write()
            .map_err(|_| StockError::Storage("lock poisoned".to_string()))?;
        let record = records
            .get_mut(&product_number)
            .ok_or(StockError::RecordNotFound(product_number))?;

        record.restore(quantity);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Versioned {
    version: u64,
    record: StockRecord,
}

/// In-memory stock ledger with optimistic concurrency control.
///
/// Check-and-deduct works on a snapshot and commits only if the record's
/// version is unchanged; a lost race retries against the fresh state. The
/// availability check is re-run on every retry, so a deduction that became
/// insufficient mid-race is rejected, not committed.
#[derive(Debug, Default)]
pub struct OptimisticStockLedger {
    records: RwLock<HashMap<ProductNumber, Versioned>>,
}

impl OptimisticStockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replenish a stock record.
    pub fn upsert(&self, record: StockRecord) -> StockResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StockError::Storage("lock poisoned".to_string()))?;
        let version = records
            .get(&record.product_number())
            .map_or(0, |v| v.version + 1);
        records.insert(record.product_number(), Versioned { version, record });
        Ok(())
    }

    fn snapshot(&self, product_number: ProductNumber) -> StockResult<Versioned> {
        let records = self
            .records
            .read()
            .map_err(|_| StockError::Storage("lock poisoned".to_string()))?;
        records
            .get(&product_number)
            .cloned()
            .ok_or(StockError::RecordNotFound(product_number))
    }
}

impl StockLedger for OptimisticStockLedger {
    fn find_by_numbers(&self, numbers: &BTreeSet<ProductNumber>) -> StockResult<Vec<StockRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| StockError::Storage("lock poisoned".to_string()))?;

        Ok(numbers
            .iter()
            .filter_map(|number| records.get(number).map(|v| v.record.clone()))
            .collect())
    }

    fn check_and_deduct(&self, product_number: ProductNumber, quantity: u32) -> StockResult<()> {
        if quantity == 0 {
            return Err(StockError::NonPositiveQuantity);
        }

        loop {
            let Versioned {
                version,
                mut record,
            } = self.snapshot(product_number)?;

            let available = record.quantity();
            record
                .deduct(quantity)
                .map_err(|_| StockError::InsufficientStock {
                    product_number,
                    requested: quantity,
                    available,
                })?;

            let mut records = self
                .records
                .write()
                .map_err(|_| StockError::Storage("lock poisoned".to_string()))?;
            let current = records
                .get_mut(&product_number)
                .ok_or(StockError::RecordNotFound(product_number))?;

            if current.version == version {
                *current = Versioned {
                    version: version + 1,
                    record,
                };
                return Ok(());
            }

            // Another deduction committed first; re-check against the
            // fresh quantity.
            tracing::debug!(%product_number, quantity, "stock version conflict, retrying deduction");
        }
    }

    fn restore(&self, product_number: ProductNumber, quantity: u32) -> StockResult<()> {
        if quantity == 0 {
            return Err(StockError::NonPositiveQuantity);
        }

        let mut records = self
            .records
            .write()
            .map_err(|_| StockError::Storage("lock poisoned".to_string()))?;
        let current = records
            .get_mut(&product_number)
            .ok_or(StockError::RecordNotFound(product_number))?;

        current.record.restore(quantity);
        current.version += 1;
        Ok(())
    }
}
