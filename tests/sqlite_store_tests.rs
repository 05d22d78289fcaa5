#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use tempfile::tempdir;
use workload_planner::{
    CapacityTier, PersistenceError, Planner, PlannerError, PlannerSettings, Resource, SqliteStore,
    WorkItem, WorkItemDraft, WorkloadStore,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn sqlite_round_trip_preserves_records() {
    let dir = tempdir().expect("temp dir");
    let db_path = dir.path().join("workload.db");
    let bob = Resource::new("bob", "Bob", CapacityTier::Red).with_pto([d(2025, 1, 8)]);
    let item = WorkItem::new(3, "Migrate", 6.0, "bob", d(2025, 1, 6)).with_due_date(d(2025, 1, 9));

    {
        let mut store = SqliteStore::new(&db_path).unwrap();
        store
            .upsert_resource(Resource::new("amy", "Amy", CapacityTier::Green))
            .unwrap();
        store.upsert_resource(bob.clone()).unwrap();
        store.upsert_work_item(item.clone()).unwrap();
        assert!(store.add_holiday(d(2025, 12, 25)).unwrap());
        assert!(store.add_holiday(d(2025, 1, 1)).unwrap());
        assert!(!store.add_holiday(d(2025, 1, 1)).unwrap());
    }

    let store = SqliteStore::new(&db_path).unwrap();
    let ids: Vec<String> = store.list_resources().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["amy", "bob"]);
    assert_eq!(store.find_resource("bob").unwrap(), Some(bob));
    assert_eq!(store.find_work_item(3).unwrap(), Some(item));
    assert_eq!(store.list_holidays().unwrap(), vec![d(2025, 1, 1), d(2025, 12, 25)]);
}

#[test]
fn sqlite_enforces_references() {
    let mut store = SqliteStore::in_memory().unwrap();
    let orphan = WorkItem::new(1, "Orphan", 1.0, "ghost", d(2025, 1, 6));
    assert!(matches!(
        store.upsert_work_item(orphan),
        Err(PersistenceError::Constraint(_))
    ));

    store
        .upsert_resource(Resource::new("amy", "Amy", CapacityTier::Green))
        .unwrap();
    store
        .upsert_work_item(WorkItem::new(1, "Task", 1.0, "amy", d(2025, 1, 6)))
        .unwrap();
    assert!(matches!(
        store.delete_resource("amy"),
        Err(PersistenceError::Constraint(_))
    ));
    // renaming a referenced resource is an update, not a delete
    store
        .upsert_resource(Resource::new("amy", "Amy Pond", CapacityTier::Yellow))
        .unwrap();
    assert_eq!(store.find_resource("amy").unwrap().unwrap().name, "Amy Pond");

    assert!(store.delete_work_item(1).unwrap());
    assert!(!store.delete_work_item(1).unwrap());
    assert!(store.delete_resource("amy").unwrap());
    assert!(!store.delete_resource("amy").unwrap());
}

#[test]
fn planner_runs_on_sqlite() {
    let store = SqliteStore::in_memory().unwrap();
    let monday = d(2025, 1, 6);
    let mut planner = Planner::new(store, PlannerSettings::default())
        .unwrap()
        .with_reference_date(monday);
    planner
        .create_resource(Resource::new("amy", "Amy", CapacityTier::Green))
        .unwrap();
    let item = planner
        .create_work_item(WorkItemDraft::new("Build", 20.0, "amy", monday))
        .unwrap();
    assert_eq!(item.expected_end, Some(d(2025, 1, 8)));

    planner.add_holiday(d(2025, 1, 7)).unwrap();
    assert_eq!(planner.work_item(item.id).unwrap().expected_end, Some(d(2025, 1, 9)));

    let err = planner.delete_resource("amy").unwrap_err();
    assert!(matches!(err, PlannerError::Constraint(_)));
}
