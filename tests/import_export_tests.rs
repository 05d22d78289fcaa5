use chrono::NaiveDate;
use std::fs;
use tempfile::NamedTempFile;
use workload_planner::{
    CapacityTier, PersistenceError, Resource, WorkItem, Workbook, load_workbook_from_json,
    save_workbook_to_json,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn workbook_snapshot_round_trips_through_json() {
    let workbook = Workbook::from_parts(
        vec![Resource::new("alice", "Alice", CapacityTier::Green).with_pto([d(2025, 1, 9)])],
        vec![WorkItem::new(1, "Build", 20.0, "alice", d(2025, 1, 6))],
        [d(2025, 1, 7)],
    )
    .unwrap();

    let tmp = NamedTempFile::new().expect("temp file");
    save_workbook_to_json(&workbook, tmp.path()).unwrap();
    let loaded = load_workbook_from_json(tmp.path()).unwrap();
    assert_eq!(loaded, workbook);
}

#[test]
fn snapshot_with_dangling_reference_is_rejected() {
    let tmp = NamedTempFile::new().expect("temp file");
    fs::write(
        tmp.path(),
        r#"{
            "resources": [],
            "work_items": [
                { "id": 1, "name": "Lost", "estimated_hours": 2.0,
                  "resource_id": "ghost", "start_date": "2025-01-06" }
            ]
        }"#,
    )
    .unwrap();
    assert!(matches!(
        load_workbook_from_json(tmp.path()),
        Err(PersistenceError::InvalidData(_))
    ));

    assert!(Workbook::from_parts(
        vec![
            Resource::new("dup", "One", CapacityTier::Green),
            Resource::new("dup", "Two", CapacityTier::Red),
        ],
        Vec::new(),
        Vec::<NaiveDate>::new(),
    )
    .is_err());
}
