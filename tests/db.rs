//! Store-level tests: guarded status transitions, the machine-binding
//! compare-and-set, and uniqueness enforcement, run against an on-disk
//! database so the pool behaves as it does in production.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tempfile::TempDir;

mod common;
use common::*;

fn disk_pool() -> (TempDir, license_server::db::DbPool) {
    let dir = TempDir::new().unwrap();
    let manager = SqliteConnectionManager::file(dir.path().join("test.db"));
    let pool = Pool::builder().max_size(4).build(manager).unwrap();
    init_db(&pool.get().unwrap()).unwrap();
    (dir, pool)
}

fn pending_order(pool: &license_server::db::DbPool, tier: &str) -> Order {
    let mut conn = pool.get().unwrap();
    create_pending_order(&mut conn, tier)
}

#[test]
fn completed_orders_cannot_be_cancelled() {
    let (_dir, pool) = disk_pool();
    let order = pending_order(&pool, "1month");
    let conn = pool.get().unwrap();

    assert!(queries::complete_order(&conn, order.id, Some("FT1")).unwrap());
    assert!(!queries::cancel_order(&conn, order.id).unwrap());
    assert!(!queries::complete_order(&conn, order.id, Some("FT2")).unwrap());

    let order = queries::get_order_by_code(&conn, order.order_code)
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.transaction_ref.as_deref(), Some("FT1"));
}

#[test]
fn cancelled_orders_cannot_be_completed() {
    let (_dir, pool) = disk_pool();
    let order = pending_order(&pool, "1month");
    let conn = pool.get().unwrap();

    assert!(queries::cancel_order(&conn, order.id).unwrap());
    assert!(!queries::complete_order(&conn, order.id, None).unwrap());

    let order = queries::get_order_by_code(&conn, order.order_code)
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[test]
fn bind_machine_is_a_compare_and_set() {
    let (_dir, pool) = disk_pool();
    let order = pending_order(&pool, "3months");
    let conn = pool.get().unwrap();
    let issued = issue_test_license(&conn, order.id);
    let key = issued.license_key.as_str();

    // Unbound: first claim wins.
    assert!(queries::bind_machine(&conn, key, "machine-a").unwrap());
    // Same machine: still succeeds.
    assert!(queries::bind_machine(&conn, key, "machine-a").unwrap());
    // Different machine: refused, binding untouched.
    assert!(!queries::bind_machine(&conn, key, "machine-b").unwrap());

    let license = queries::get_license_by_key(&conn, key).unwrap().unwrap();
    assert_eq!(license.bound_machine_id.as_deref(), Some("machine-a"));
}

#[test]
fn record_activation_ignores_duplicates() {
    let (_dir, pool) = disk_pool();
    let order = pending_order(&pool, "3months");
    let conn = pool.get().unwrap();
    let issued = issue_test_license(&conn, order.id);
    let key = issued.license_key.as_str();

    for _ in 0..3 {
        queries::record_activation(&conn, key, "machine-a").unwrap();
    }
    queries::record_activation(&conn, key, "machine-b").unwrap();

    assert_eq!(queries::count_activations(&conn, key).unwrap(), 2);
    let rows = queries::list_activations(&conn, key).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].machine_id, "machine-a");
    assert_eq!(rows[1].machine_id, "machine-b");
}

#[test]
fn duplicate_license_keys_are_a_unique_violation() {
    let (_dir, pool) = disk_pool();
    let conn = pool.get().unwrap();
    let first = pending_order(&pool, "1month");
    let second = pending_order(&pool, "1month");

    queries::insert_license(&conn, "PAID-20260830-AAAAAA", first.id, "1month", 30, now(), now() + 30 * 86400)
        .unwrap();
    let err = queries::insert_license(
        &conn,
        "PAID-20260830-AAAAAA",
        second.id,
        "1month",
        30,
        now(),
        now() + 30 * 86400,
    )
    .unwrap_err();

    match err {
        license_server::error::AppError::Database(e) => {
            assert!(queries::is_unique_violation(&e))
        }
        other => panic!("expected a database error, got {other:?}"),
    }
}

#[test]
fn order_lookup_joins_the_issued_license() {
    let (_dir, pool) = disk_pool();
    let order = pending_order(&pool, "3months");
    let conn = pool.get().unwrap();

    let before = queries::get_order_with_license(&conn, order.order_code)
        .unwrap()
        .unwrap();
    assert!(before.license_key.is_none());

    let issued = issue_test_license(&conn, order.id);
    queries::complete_order(&conn, order.id, None).unwrap();

    let after = queries::get_order_with_license(&conn, order.order_code)
        .unwrap()
        .unwrap();
    assert_eq!(after.order.status, OrderStatus::Completed);
    assert_eq!(after.license_key.as_deref(), Some(issued.license_key.as_str()));
    assert_eq!(after.license_expires_at, Some(issued.expires_at));
}
