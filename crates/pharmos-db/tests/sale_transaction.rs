//! Sale transaction properties against a real SQLite database.

use std::time::Duration;

use chrono::NaiveDate;
use pharmos_core::{CoreError, NewItem, SaleLineRequest};
use pharmos_db::{Database, DbConfig, DbError};

fn new_item(name: &str, price_sell_cents: i64, stock: i64) -> NewItem {
    NewItem {
        name: name.to_string(),
        description: None,
        price_buy_cents: price_sell_cents / 2,
        price_sell_cents,
        stock,
        expire_date: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
        category: None,
        barcode: None,
    }
}

async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

#[tokio::test]
async fn end_to_end_scenario() {
    let db = memory_db().await;
    let item = db.items().create(&new_item("Paracetamol", 1000, 5)).await.unwrap();

    let sale = db
        .sales()
        .create_sale(&[SaleLineRequest::new(&item.id, 3)], "pharmacist-1")
        .await
        .unwrap();

    assert_eq!(sale.total_cents, 3000);
    assert_eq!(sale.lines.len(), 1);
    assert_eq!(sale.lines[0].item_id.as_deref(), Some(item.id.as_str()));
    assert_eq!(sale.lines[0].quantity, 3);
    assert_eq!(sale.lines[0].price_at_sale_cents, 1000);
    assert_eq!(db.items().get(&item.id).await.unwrap().stock, 2);

    let err = db
        .sales()
        .create_sale(&[SaleLineRequest::new(&item.id, 3)], "pharmacist-1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::InsufficientStock {
            available: 2,
            requested: 3,
            ..
        })
    ));
    assert_eq!(db.items().get(&item.id).await.unwrap().stock, 2);
    assert_eq!(db.sales().count().await.unwrap(), 1);
}

#[tokio::test]
async fn total_equals_sum_of_lines() {
    let db = memory_db().await;
    let a = db.items().create(&new_item("A", 10, 100)).await.unwrap();
    let b = db.items().create(&new_item("B", 20, 100)).await.unwrap();
    let c = db.items().create(&new_item("C", 1999, 100)).await.unwrap();

    let lines = [
        SaleLineRequest::new(&a.id, 3),
        SaleLineRequest::new(&b.id, 1),
        SaleLineRequest::new(&c.id, 7),
        SaleLineRequest::new(&a.id, 2),
    ];
    let sale = db.sales().create_sale(&lines, "u").await.unwrap();

    let expected: i64 = sale
        .lines
        .iter()
        .map(|l| l.quantity * l.price_at_sale_cents)
        .sum();
    assert_eq!(sale.total_cents, expected);
    assert_eq!(sale.total_cents, 3 * 10 + 20 + 7 * 1999 + 2 * 10);
    assert_eq!(sale.total(), sale.lines_total());

    // Same item on two lines is decremented twice
    assert_eq!(db.items().get(&a.id).await.unwrap().stock, 95);
}

#[tokio::test]
async fn failing_line_rolls_back_everything() {
    let db = memory_db().await;
    let first = db.items().create(&new_item("First", 500, 10)).await.unwrap();
    let second = db.items().create(&new_item("Second", 700, 10)).await.unwrap();
    let scarce = db.items().create(&new_item("Scarce", 900, 1)).await.unwrap();

    let lines = [
        SaleLineRequest::new(&first.id, 4),
        SaleLineRequest::new(&second.id, 2),
        SaleLineRequest::new(&scarce.id, 2),
        SaleLineRequest::new(&first.id, 1),
    ];
    let err = db.sales().create_sale(&lines, "u").await.unwrap_err();
    assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));

    assert_eq!(db.items().get(&first.id).await.unwrap().stock, 10);
    assert_eq!(db.items().get(&second.id).await.unwrap().stock, 10);
    assert_eq!(db.items().get(&scarce.id).await.unwrap().stock, 1);
    assert_eq!(db.sales().count().await.unwrap(), 0);
    assert!(db.sales().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_item_rolls_back_everything() {
    let db = memory_db().await;
    let item = db.items().create(&new_item("Real", 500, 10)).await.unwrap();

    let lines = [
        SaleLineRequest::new(&item.id, 4),
        SaleLineRequest::new("does-not-exist", 1),
    ];
    let err = db.sales().create_sale(&lines, "u").await.unwrap_err();
    assert!(matches!(err, DbError::Domain(CoreError::ItemNotFound(id)) if id == "does-not-exist"));

    assert_eq!(db.items().get(&item.id).await.unwrap().stock, 10);
    assert_eq!(db.sales().count().await.unwrap(), 0);
}

#[tokio::test]
async fn first_failing_line_decides_the_error() {
    let db = memory_db().await;
    let scarce = db.items().create(&new_item("Scarce", 900, 1)).await.unwrap();

    let lines = [
        SaleLineRequest::new(&scarce.id, 5),
        SaleLineRequest::new("does-not-exist", 1),
    ];
    let err = db.sales().create_sale(&lines, "u").await.unwrap_err();
    assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));
}

#[tokio::test]
async fn price_is_snapshotted_at_sale_time() {
    let db = memory_db().await;
    let item = db.items().create(&new_item("Ibuprofen", 550, 10)).await.unwrap();

    let sale = db
        .sales()
        .create_sale(&[SaleLineRequest::new(&item.id, 2)], "u")
        .await
        .unwrap();

    let patch = pharmos_core::ItemPatch {
        price_sell_cents: Some(9999),
        ..Default::default()
    };
    db.items().update(&item.id, &patch).await.unwrap();

    let stored = db.sales().get(&sale.id).await.unwrap();
    assert_eq!(stored.lines[0].price_at_sale_cents, 550);
    assert_eq!(stored.total_cents, 1100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_never_oversell() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("concurrency.db")).max_connections(4);
    let db = Database::new(config).await.unwrap();

    let item = db.items().create(&new_item("Amoxicillin", 1000, 5)).await.unwrap();

    let attempt = |db: Database, id: String| async move {
        db.sales()
            .create_sale(&[SaleLineRequest::new(id, 3)], "u")
            .await
    };
    let (a, b) = tokio::join!(
        tokio::spawn(attempt(db.clone(), item.id.clone())),
        tokio::spawn(attempt(db.clone(), item.id.clone())),
    );
    let results = [a.unwrap(), b.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(DbError::Domain(CoreError::InsufficientStock { .. }))
    )));
    assert_eq!(db.items().get(&item.id).await.unwrap().stock, 2);
    assert_eq!(db.sales().count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_concurrent_sales_sell_at_most_the_stock() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("stress.db")).max_connections(8);
    let db = Database::new(config).await.unwrap();

    let item = db.items().create(&new_item("Cetirizine", 300, 17)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..12 {
        let db = db.clone();
        let id = item.id.clone();
        handles.push(tokio::spawn(async move {
            db.sales()
                .create_sale(&[SaleLineRequest::new(id, 2)], "u")
                .await
        }));
    }

    let mut sold = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(sale) => sold += sale.lines[0].quantity,
            Err(DbError::Domain(CoreError::InsufficientStock { .. })) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    let remaining = db.items().get(&item.id).await.unwrap().stock;
    assert_eq!(sold, 16);
    assert_eq!(remaining, 1);
    assert_eq!(sold + remaining, 17);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn timed_out_sale_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("timeout.db"))
        .max_connections(2)
        .busy_timeout(Duration::from_secs(5))
        .sale_timeout(Duration::from_millis(300));
    let db = Database::new(config).await.unwrap();

    let item = db.items().create(&new_item("Omeprazole", 800, 5)).await.unwrap();

    // Another writer holds SQLite's write lock past the sale's bound
    let mut blocker = db.pool().begin().await.unwrap();
    sqlx::query("UPDATE items SET stock = stock WHERE id = ?")
        .bind(&item.id)
        .execute(&mut *blocker)
        .await
        .unwrap();

    let err = db
        .sales()
        .create_sale(&[SaleLineRequest::new(&item.id, 2)], "u")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Timeout(t) if t == Duration::from_millis(300)));

    blocker.rollback().await.unwrap();

    assert_eq!(db.items().get(&item.id).await.unwrap().stock, 5);
    assert_eq!(db.sales().count().await.unwrap(), 0);
}
