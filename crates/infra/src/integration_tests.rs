//! Integration tests for the full order-fulfillment pipeline.
//!
//! Wires the in-memory collaborators the way a production composition
//! would: catalog + stock ledger + order store behind the coordinator.
//!
//! Verifies:
//! - end-to-end order placement (pricing, line items, stock deduction)
//! - atomic rejection with no partial deduction left committed
//! - both ledger strategies behind the same contract
//! - allocator monotonicity and ledger non-negativity under real threads

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, TimeZone, Utc};

use cafekiosk_catalog::{
    CatalogService, NewProduct, Product, ProductCatalog, ProductCategory, ProductNumberAllocator,
    SellingStatus,
};
use cafekiosk_core::ProductNumber;
use cafekiosk_orders::{FulfillmentError, OrderFulfillment};
use cafekiosk_stock::{StockError, StockLedger, StockRecord};

use crate::{InMemoryCatalog, InMemoryOrderStore, InMemoryStockLedger, OptimisticStockLedger};

fn number(s: &str) -> ProductNumber {
    s.parse().unwrap()
}

fn product(num: &str, category: ProductCategory, price: u64) -> Product {
    Product::new(
        number(num),
        category,
        SellingStatus::Selling,
        format!("product {num}"),
        price,
    )
    .unwrap()
}

fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 3, 8, 9, 30, 0).unwrap()
}

fn seeded_catalog(products: Vec<Product>) -> Arc<InMemoryCatalog> {
    let catalog = Arc::new(InMemoryCatalog::new());
    for p in products {
        catalog.insert(p).unwrap();
    }
    catalog
}

fn quantity_of<L: StockLedger>(ledger: &L, num: &str) -> u32 {
    let numbers: BTreeSet<ProductNumber> = [number(num)].into_iter().collect();
    ledger.find_by_numbers(&numbers).unwrap()[0].quantity()
}

#[test]
fn places_an_order_and_deducts_tracked_stock() {
    let catalog = seeded_catalog(vec![
        product("001", ProductCategory::Bottle, 1000),
        product("002", ProductCategory::Handmade, 3000),
    ]);
    let ledger = Arc::new(InMemoryStockLedger::new());
    ledger.upsert(StockRecord::new(number("001"), 1)).unwrap();
    let orders = Arc::new(InMemoryOrderStore::new());

    let fulfillment = OrderFulfillment::new(catalog, ledger.clone(), orders.clone());

    let order = fulfillment
        .place_order(&[number("001"), number("002")], test_time())
        .unwrap();

    assert!(order.id().is_some());
    assert_eq!(order.total_price(), 4000);
    assert_eq!(order.line_items().len(), 2);
    assert_eq!(quantity_of(&*ledger, "001"), 0);
    assert_eq!(orders.find_all().unwrap().len(), 1);
}

#[test]
fn duplicate_request_beyond_stock_is_rejected_without_deduction() {
    let catalog = seeded_catalog(vec![product("001", ProductCategory::Bottle, 1000)]);
    let ledger = Arc::new(InMemoryStockLedger::new());
    ledger.upsert(StockRecord::new(number("001"), 1)).unwrap();
    let orders = Arc::new(InMemoryOrderStore::new());

    let fulfillment = OrderFulfillment::new(catalog, ledger.clone(), orders.clone());

    let err = fulfillment
        .place_order(&[number("001"), number("001")], test_time())
        .unwrap_err();

    match err {
        FulfillmentError::Stock(StockError::InsufficientStock {
            requested,
            available,
            ..
        }) => {
            assert_eq!(requested, 2);
            assert_eq!(available, 1);
        }
        _ => panic!("Expected InsufficientStock error"),
    }
    assert_eq!(quantity_of(&*ledger, "001"), 1);
    assert!(orders.find_all().unwrap().is_empty());
}

#[test]
fn mixed_order_failure_restores_the_committed_deduction() {
    let catalog = seeded_catalog(vec![
        product("001", ProductCategory::Bottle, 1000),
        product("002", ProductCategory::Bakery, 3000),
    ]);
    let ledger = Arc::new(InMemoryStockLedger::new());
    ledger.upsert(StockRecord::new(number("001"), 5)).unwrap();
    ledger.upsert(StockRecord::new(number("002"), 0)).unwrap();
    let orders = Arc::new(InMemoryOrderStore::new());

    let fulfillment = OrderFulfillment::new(catalog, ledger.clone(), orders.clone());

    let err = fulfillment
        .place_order(&[number("001"), number("002")], test_time())
        .unwrap_err();

    match err {
        FulfillmentError::Stock(StockError::InsufficientStock { product_number, .. }) => {
            assert_eq!(product_number, number("002"));
        }
        _ => panic!("Expected InsufficientStock error"),
    }
    assert_eq!(quantity_of(&*ledger, "001"), 5);
    assert_eq!(quantity_of(&*ledger, "002"), 0);
    assert!(orders.find_all().unwrap().is_empty());
}

#[test]
fn coordinator_runs_unchanged_on_the_optimistic_ledger() {
    let catalog = seeded_catalog(vec![
        product("001", ProductCategory::Bottle, 1000),
        product("002", ProductCategory::Handmade, 3000),
    ]);
    let ledger = Arc::new(OptimisticStockLedger::new());
    ledger.upsert(StockRecord::new(number("001"), 1)).unwrap();
    let orders = Arc::new(InMemoryOrderStore::new());

    let fulfillment = OrderFulfillment::new(catalog, ledger.clone(), orders.clone());

    let order = fulfillment
        .place_order(&[number("001"), number("002")], test_time())
        .unwrap();

    assert_eq!(order.total_price(), 4000);
    assert_eq!(quantity_of(&*ledger, "001"), 0);
}

fn assert_deduct_contract<L: StockLedger>(ledger: &L) {
    // Seeded with "001" → 5 by the caller.
    ledger.check_and_deduct(number("001"), 3).unwrap();
    assert_eq!(quantity_of(ledger, "001"), 2);

    let err = ledger.check_and_deduct(number("001"), 3).unwrap_err();
    match err {
        StockError::InsufficientStock {
            requested,
            available,
            ..
        } => {
            assert_eq!(requested, 3);
            assert_eq!(available, 2);
        }
        _ => panic!("Expected InsufficientStock error"),
    }
    assert_eq!(quantity_of(ledger, "001"), 2);

    match ledger.check_and_deduct(number("001"), 0).unwrap_err() {
        StockError::NonPositiveQuantity => {}
        _ => panic!("Expected NonPositiveQuantity error"),
    }

    match ledger.check_and_deduct(number("404"), 1).unwrap_err() {
        StockError::RecordNotFound(n) => assert_eq!(n, number("404")),
        _ => panic!("Expected RecordNotFound error"),
    }

    ledger.restore(number("001"), 3).unwrap();
    assert_eq!(quantity_of(ledger, "001"), 5);
}

#[test]
fn in_memory_ledger_honors_the_deduct_contract() {
    let ledger = InMemoryStockLedger::new();
    ledger.upsert(StockRecord::new(number("001"), 5)).unwrap();
    assert_deduct_contract(&ledger);
}

#[test]
fn optimistic_ledger_honors_the_deduct_contract() {
    let ledger = OptimisticStockLedger::new();
    ledger.upsert(StockRecord::new(number("001"), 5)).unwrap();
    assert_deduct_contract(&ledger);
}

fn assert_no_oversell_under_contention<L>(ledger: Arc<L>)
where
    L: StockLedger + 'static,
{
    // Seeded with "001" → 5 by the caller; 10 threads race for one unit each.
    let handles: Vec<_> = (0..10)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || ledger.check_and_deduct(number("001"), 1).is_ok())
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|&ok| ok)
        .count();

    assert_eq!(successes, 5);
    assert_eq!(quantity_of(&*ledger, "001"), 0);
}

#[test]
fn in_memory_ledger_never_oversells_under_contention() {
    let ledger = Arc::new(InMemoryStockLedger::new());
    ledger.upsert(StockRecord::new(number("001"), 5)).unwrap();
    assert_no_oversell_under_contention(ledger);
}

#[test]
fn optimistic_ledger_never_oversells_under_contention() {
    let ledger = Arc::new(OptimisticStockLedger::new());
    ledger.upsert(StockRecord::new(number("001"), 5)).unwrap();
    assert_no_oversell_under_contention(ledger);
}

#[test]
fn concurrent_orders_share_the_stock_without_overselling() {
    let catalog = seeded_catalog(vec![product("001", ProductCategory::Bottle, 1000)]);
    let ledger = Arc::new(InMemoryStockLedger::new());
    ledger.upsert(StockRecord::new(number("001"), 5)).unwrap();
    let orders = Arc::new(InMemoryOrderStore::new());

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            let ledger = Arc::clone(&ledger);
            let orders = Arc::clone(&orders);
            thread::spawn(move || {
                let fulfillment = OrderFulfillment::new(catalog, ledger, orders);
                fulfillment.place_order(&[number("001")], test_time()).is_ok()
            })
        })
        .collect();

    let placed = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|&ok| ok)
        .count();

    assert_eq!(placed, 5);
    assert_eq!(quantity_of(&*ledger, "001"), 0);
    assert_eq!(orders.find_all().unwrap().len(), 5);
}

#[test]
fn concurrent_allocations_are_distinct_and_contiguous() {
    let catalog = seeded_catalog(
        (1..=5)
            .map(|i| product(&format!("{i:03}"), ProductCategory::Handmade, 1000))
            .collect(),
    );

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                ProductNumberAllocator::new(catalog)
                    .next_product_number()
                    .unwrap()
                    .to_string()
            })
        })
        .collect();

    let allocated: BTreeSet<String> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let expected: BTreeSet<String> = ["006", "007", "008", "009", "010"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(allocated, expected);
}

#[test]
fn register_product_allocates_sequential_numbers() {
    let catalog = Arc::new(InMemoryCatalog::new());
    let service = CatalogService::new(Arc::clone(&catalog));

    let first = service
        .register_product(NewProduct {
            category: ProductCategory::Handmade,
            selling_status: SellingStatus::Selling,
            name: "americano".to_string(),
            price: 4000,
        })
        .unwrap();
    let second = service
        .register_product(NewProduct {
            category: ProductCategory::Bottle,
            selling_status: SellingStatus::Hold,
            name: "cola".to_string(),
            price: 1500,
        })
        .unwrap();

    assert_eq!(first.number().to_string(), "001");
    assert_eq!(second.number().to_string(), "002");
    assert_eq!(second.name(), "cola");
    assert_eq!(second.price(), 1500);
}

#[test]
fn displayable_products_exclude_stopped_entries() {
    let catalog = Arc::new(InMemoryCatalog::new());
    let service = CatalogService::new(Arc::clone(&catalog));

    for (name, status) in [
        ("americano", SellingStatus::Selling),
        ("latte", SellingStatus::Hold),
        ("shaved ice", SellingStatus::StopSelling),
    ] {
        service
            .register_product(NewProduct {
                category: ProductCategory::Handmade,
                selling_status: status,
                name: name.to_string(),
                price: 4000,
            })
            .unwrap();
    }

    let displayable = service.displayable_products().unwrap();
    let names: Vec<_> = displayable.iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, vec!["americano", "latte"]);
}
