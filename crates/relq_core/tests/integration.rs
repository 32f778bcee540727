//! Integration tests for sessions over file-backed SQLite.

use proptest::prelude::*;
use relq_core::{
    descriptor, CoreError, Entity, EntityShape, FieldSpec, Filter, NavigationSpec, QuerySpec,
    ScalarKind, ScalarValue, Session, SessionConfig,
};
use tempfile::{tempdir, TempDir};

#[derive(Debug, Default, Clone, PartialEq)]
struct Customer {
    id: i64,
    name: String,
    tier: i64,
}

impl Entity for Customer {
    fn shape() -> EntityShape {
        EntityShape::new("Customer")
            .field(FieldSpec::new("id", ScalarKind::Integer).key())
            .field(FieldSpec::new("name", ScalarKind::Text))
            .field(FieldSpec::new("tier", ScalarKind::Integer))
    }

    fn get(&self, field: &str) -> Option<ScalarValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "tier" => Some(self.tier.into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: ScalarValue) -> bool {
        match field {
            "id" => self.id = value.as_integer().unwrap_or_default(),
            "name" => self.name = value.as_text().unwrap_or_default().to_string(),
            "tier" => self.tier = value.as_integer().unwrap_or_default(),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Order {
    id: i64,
    item: String,
    qty: i64,
    paid: bool,
    customer_id: i64,
}

impl Entity for Order {
    fn shape() -> EntityShape {
        EntityShape::new("Order")
            .field(FieldSpec::new("id", ScalarKind::Integer).key())
            .field(FieldSpec::new("item", ScalarKind::Text))
            .field(FieldSpec::new("qty", ScalarKind::Integer))
            .field(FieldSpec::new("paid", ScalarKind::Bool))
            .field(FieldSpec::new("customer_id", ScalarKind::Integer))
            .navigation(NavigationSpec::new("Customer", descriptor::<Customer>))
    }

    fn get(&self, field: &str) -> Option<ScalarValue> {
        match field {
            "id" => Some(self.id.into()),
            "item" => Some(self.item.as_str().into()),
            "qty" => Some(self.qty.into()),
            "paid" => Some(self.paid.into()),
            "customer_id" => Some(self.customer_id.into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: ScalarValue) -> bool {
        match field {
            "id" => self.id = value.as_integer().unwrap_or_default(),
            "item" => self.item = value.as_text().unwrap_or_default().to_string(),
            "qty" => self.qty = value.as_integer().unwrap_or_default(),
            "paid" => self.paid = value.as_bool().unwrap_or_default(),
            "customer_id" => self.customer_id = value.as_integer().unwrap_or_default(),
            _ => return false,
        }
        true
    }
}

fn open_at(dir: &TempDir) -> Session {
    let path = dir.path().join("shop.db");
    Session::open(SessionConfig::sqlite(path.to_string_lossy())).unwrap()
}

fn create_schema(session: &Session) {
    for ddl in [
        "CREATE TABLE IF NOT EXISTS Customer (id INTEGER PRIMARY KEY, name TEXT, tier INTEGER)",
        "CREATE TABLE IF NOT EXISTS [Order] (id INTEGER PRIMARY KEY, item TEXT, qty INTEGER, \
         paid INTEGER, customer_id INTEGER)",
    ] {
        session.execute_raw(ddl, &[]).unwrap();
    }
}

/// Two customers with four orders between them.
fn seeded(dir: &TempDir) -> Session {
    let mut session = open_at(dir);
    create_schema(&session);

    let alice = session.add(Customer {
        name: "Alice".into(),
        tier: 1,
        ..Customer::default()
    });
    let bruno = session.add(Customer {
        name: "Bruno".into(),
        tier: 2,
        ..Customer::default()
    });
    session.save_changes().unwrap();
    let (alice_id, bruno_id) = (alice.value().id, bruno.value().id);

    for (item, qty, paid, customer_id) in [
        ("keyboard", 2, true, alice_id),
        ("mouse", 1, false, alice_id),
        ("monitor", 1, true, bruno_id),
        ("100% wool hat", 3, false, bruno_id),
    ] {
        session.add(Order {
            item: item.into(),
            qty,
            paid,
            customer_id,
            ..Order::default()
        });
    }
    session.save_changes().unwrap();
    session
}

#[test]
fn rows_persist_across_sessions() {
    let dir = tempdir().unwrap();
    let session = seeded(&dir);
    drop(session);

    let reopened = open_at(&dir);
    let orders: Vec<Order> = reopened.query(&QuerySpec::new()).unwrap();
    assert_eq!(orders.len(), 4);

    // Default order is primary key ascending.
    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[test]
fn identity_keys_continue_across_sessions() {
    let dir = tempdir().unwrap();
    let first = seeded(&dir);
    let max_id = first
        .query::<Order>(&QuerySpec::new())
        .unwrap()
        .iter()
        .map(|o| o.id)
        .max()
        .unwrap();
    drop(first);

    let mut second = open_at(&dir);
    let late = second.add(Order {
        item: "stand".into(),
        qty: 1,
        ..Order::default()
    });
    second.save_changes().unwrap();
    assert!(late.value().id > max_id);
}

#[test]
fn filters_narrow_results() {
    let dir = tempdir().unwrap();
    let session = seeded(&dir);

    let unpaid: Vec<Order> = session
        .query(&QuerySpec::new().filter(Filter::eq("paid", false)))
        .unwrap();
    assert_eq!(unpaid.len(), 2);

    let bulk: Vec<Order> = session
        .query(&QuerySpec::new().filter(Filter::ge("qty", 2).and(Filter::ne("item", "keyboard"))))
        .unwrap();
    assert_eq!(bulk.len(), 1);
    assert_eq!(bulk[0].item, "100% wool hat");
}

#[test]
fn like_wildcards_in_needles_match_literally() {
    let dir = tempdir().unwrap();
    let session = seeded(&dir);

    let hits: Vec<Order> = session
        .query(&QuerySpec::new().filter(Filter::contains("item", "100%")))
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].item, "100% wool hat");

    // "mo%" means a literal percent sign, so neither monitor nor mouse match.
    let none: Vec<Order> = session
        .query(&QuerySpec::new().filter(Filter::starts_with("item", "mo%")))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn navigation_members_filter_through_the_join() {
    let dir = tempdir().unwrap();
    let session = seeded(&dir);

    let alices: Vec<Order> = session
        .query(&QuerySpec::new().filter(Filter::eq("Customer.name", "Alice")))
        .unwrap();
    assert_eq!(alices.len(), 2);
    assert!(alices
        .iter()
        .all(|o| o.item == "keyboard" || o.item == "mouse"));
}

#[test]
fn explicit_includes_replace_join_inference() {
    let dir = tempdir().unwrap();
    let session = seeded(&dir);

    let with_customer: Vec<Order> = session
        .query(
            &QuerySpec::new()
                .include("Customer")
                .filter(Filter::eq("Customer.tier", 2)),
        )
        .unwrap();
    assert_eq!(with_customer.len(), 2);

    // Unknown includes are skipped, so the query still runs.
    let all: Vec<Order> = session
        .query(&QuerySpec::new().include("Warehouse"))
        .unwrap();
    assert_eq!(all.len(), 4);

    // With inference disabled the navigation is no longer joined.
    let err = session
        .query::<Order>(
            &QuerySpec::new()
                .include("Warehouse")
                .filter(Filter::eq("Customer.name", "Alice")),
        )
        .unwrap_err();
    assert!(matches!(err, CoreError::Translation { .. }));
}

#[test]
fn paged_queries_carry_the_unpaged_total() {
    let dir = tempdir().unwrap();
    let session = seeded(&dir);

    let page = session
        .query_paged::<Order>(&QuerySpec::new().page(1, 3))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 4);
    assert_eq!((page.page_index, page.page_size), (1, 3));

    let past_the_end = session
        .query_paged::<Order>(&QuerySpec::new().page(9, 3))
        .unwrap();
    assert!(past_the_end.items.is_empty());
    assert_eq!(past_the_end.total, 0);
}

#[test]
fn sorting_overrides_the_key_order() {
    let dir = tempdir().unwrap();
    let session = seeded(&dir);

    let orders: Vec<Order> = session
        .query(&QuerySpec::new().sort_by_desc("qty").sort_by("item"))
        .unwrap();
    let quantities: Vec<i64> = orders.iter().map(|o| o.qty).collect();
    assert_eq!(quantities, vec![3, 2, 1, 1]);

    // Ties break on the secondary key.
    assert!(orders[2].item < orders[3].item);
}

#[test]
fn count_honors_filters() {
    let dir = tempdir().unwrap();
    let session = seeded(&dir);

    assert_eq!(session.count::<Order>(None).unwrap(), 4);
    assert_eq!(
        session
            .count::<Order>(Some(&Filter::eq("paid", true)))
            .unwrap(),
        2
    );
}

#[test]
fn find_update_remove_round_trip() {
    let dir = tempdir().unwrap();
    let mut session = seeded(&dir);

    let keyboard_id = session
        .query::<Order>(&QuerySpec::new().filter(Filter::eq("item", "keyboard")))
        .unwrap()[0]
        .id;

    let mut fetched = session.find::<Order>(keyboard_id).unwrap().unwrap();
    fetched.qty = 5;
    session.update(fetched);
    session.save_changes().unwrap();

    let fetched = session.find::<Order>(keyboard_id).unwrap().unwrap();
    assert_eq!(fetched.qty, 5);

    session.remove(fetched);
    session.save_changes().unwrap();
    assert_eq!(session.find::<Order>(keyboard_id).unwrap(), None);
}

#[test]
fn plain_calls_leave_no_connection_behind() {
    let dir = tempdir().unwrap();
    let session = seeded(&dir);

    // Every seeding call opened and closed its own connection, so a second
    // session can take the write lock immediately.
    let writer = open_at(&dir);
    let affected = writer
        .execute_raw("UPDATE [Order] SET qty = qty + 1", &[])
        .unwrap();
    assert_eq!(affected, 4);
    assert_eq!(session.count::<Order>(None).unwrap(), 4);
}

#[test]
fn uncommitted_writes_stay_invisible_to_other_sessions() {
    let dir = tempdir().unwrap();
    let mut writer = seeded(&dir);
    let reader = open_at(&dir);

    writer.begin_transaction().unwrap();
    writer.add(Customer {
        name: "Cleo".into(),
        tier: 3,
        ..Customer::default()
    });
    writer.save_changes().unwrap();

    assert_eq!(writer.count::<Customer>(None).unwrap(), 3);
    assert_eq!(reader.count::<Customer>(None).unwrap(), 2);

    writer.commit().unwrap();
    assert_eq!(reader.count::<Customer>(None).unwrap(), 3);
}

#[test]
fn rollback_discards_flushed_changes() {
    let dir = tempdir().unwrap();
    let mut session = seeded(&dir);
    let victim = session.query::<Order>(&QuerySpec::new()).unwrap().remove(0);

    session.begin_transaction().unwrap();
    session.remove(victim);
    session.save_changes().unwrap();
    assert_eq!(session.count::<Order>(None).unwrap(), 3);

    session.rollback().unwrap();
    assert_eq!(session.count::<Order>(None).unwrap(), 4);
}

#[test]
fn cancellation_is_scoped_to_one_session() {
    let dir = tempdir().unwrap();
    let session = seeded(&dir);
    session.cancel_token().cancel();
    assert!(matches!(
        session.query::<Order>(&QuerySpec::new()),
        Err(CoreError::Cancelled)
    ));

    // No lock or state leaks into a fresh session on the same file.
    let fresh = open_at(&dir);
    assert_eq!(fresh.count::<Order>(None).unwrap(), 4);
}

#[test]
fn raw_statements_use_named_parameters() {
    let dir = tempdir().unwrap();
    let session = seeded(&dir);

    let affected = session
        .execute_raw(
            "UPDATE [Order] SET qty = qty + @bump WHERE paid = @paid",
            &[
                ("@bump".to_string(), ScalarValue::Integer(10)),
                ("@paid".to_string(), ScalarValue::Bool(false)),
            ],
        )
        .unwrap();
    assert_eq!(affected, 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn pages_partition_the_rows(rows in 1i64..30, size in 1i64..8) {
        let dir = tempdir().unwrap();
        let mut session = open_at(&dir);
        create_schema(&session);
        for n in 0..rows {
            session.add(Order {
                item: format!("item-{n}"),
                qty: n,
                ..Order::default()
            });
        }
        session.save_changes().unwrap();

        let mut seen = Vec::new();
        let mut index = 0;
        loop {
            let page = session
                .query_paged::<Order>(&QuerySpec::new().page(index, size))
                .unwrap();
            if page.items.is_empty() {
                break;
            }
            prop_assert!(page.items.len() as i64 <= size);
            prop_assert_eq!(page.total, rows);
            seen.extend(page.items.iter().map(|o| o.id));
            index += 1;
        }

        let expected: Vec<i64> = session
            .query::<Order>(&QuerySpec::new())
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        prop_assert_eq!(seen, expected);
    }
}
