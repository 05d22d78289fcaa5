use chrono::NaiveDate;
use workload_planner::{
    AvailabilityStatus, CapacityPolicy, CapacityTier, Planner, PlannerError, PlannerSettings,
    Resource, Status, WorkItem, Workbook, WorkItemDraft,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn monday() -> NaiveDate {
    d(2025, 1, 6)
}

fn planner() -> Planner<Workbook> {
    Planner::new(Workbook::new(), PlannerSettings::default())
        .unwrap()
        .with_reference_date(monday())
}

fn planner_with_alice() -> Planner<Workbook> {
    let mut planner = planner();
    planner
        .create_resource(Resource::new("alice", "Alice", CapacityTier::Green))
        .unwrap();
    planner
}

fn draft(hours: f64) -> WorkItemDraft {
    WorkItemDraft::new("Build API", hours, "alice", monday())
}

#[test]
fn create_work_item_computes_end_and_status() {
    let mut planner = planner_with_alice();
    let item = planner
        .create_work_item(draft(20.0).with_due_date(d(2025, 1, 8)))
        .unwrap();
    assert_eq!(item.id, 1);
    assert_eq!(item.expected_end, Some(d(2025, 1, 8)));
    assert_eq!(item.status, Some(Status::OnTrack));
    assert!(item.assigned_at.is_some());
    assert_eq!(planner.work_item(1).unwrap(), item);
}

#[test]
fn ids_follow_the_current_maximum_and_blank_names_get_a_default() {
    let mut planner = planner_with_alice();
    let first = planner.create_work_item(draft(1.0)).unwrap();
    let second = planner
        .create_work_item(WorkItemDraft::new("  ", 1.0, "alice", monday()))
        .unwrap();
    assert_eq!((first.id, second.id), (1, 2));
    assert_eq!(second.name, "WorkItem#2");

    planner.delete_work_item(2).unwrap();
    assert_eq!(planner.create_work_item(draft(1.0)).unwrap().id, 2);
}

#[test]
fn tier_change_recomputes_assigned_items() {
    let mut planner = planner_with_alice();
    planner.create_work_item(draft(20.0)).unwrap();

    let mut alice = planner.resource("alice").unwrap();
    alice.tier = CapacityTier::Yellow;
    planner.save_resource(alice).unwrap();

    // 20h at 4h/day = five working days
    let item = planner.work_item(1).unwrap();
    assert_eq!(item.expected_end, Some(d(2025, 1, 10)));
}

#[test]
fn holiday_changes_recompute_every_item() {
    let mut planner = planner_with_alice();
    planner.create_work_item(draft(20.0).with_due_date(d(2025, 1, 8))).unwrap();

    assert!(planner.add_holiday(d(2025, 1, 7)).unwrap());
    let item = planner.work_item(1).unwrap();
    assert_eq!(item.expected_end, Some(d(2025, 1, 9)));
    assert_eq!(item.status, Some(Status::AtRisk));
    assert!(!planner.add_holiday(d(2025, 1, 7)).unwrap());
    assert_eq!(planner.holidays(), vec![d(2025, 1, 7)]);

    assert!(planner.remove_holiday(d(2025, 1, 7)).unwrap());
    let item = planner.work_item(1).unwrap();
    assert_eq!(item.expected_end, Some(d(2025, 1, 8)));
    assert_eq!(item.status, Some(Status::OnTrack));
}

#[test]
fn pto_only_moves_the_resources_own_items() {
    let mut planner = planner_with_alice();
    planner
        .create_resource(Resource::new("bob", "Bob", CapacityTier::Green))
        .unwrap();
    planner.create_work_item(draft(20.0)).unwrap();
    planner
        .create_work_item(WorkItemDraft::new("Docs", 20.0, "bob", monday()))
        .unwrap();

    assert!(planner.add_pto("alice", d(2025, 1, 7)).unwrap());
    assert!(!planner.add_pto("alice", d(2025, 1, 7)).unwrap());
    assert_eq!(planner.work_item(1).unwrap().expected_end, Some(d(2025, 1, 9)));
    assert_eq!(planner.work_item(2).unwrap().expected_end, Some(d(2025, 1, 8)));

    assert!(planner.remove_pto("alice", d(2025, 1, 7)).unwrap());
    assert_eq!(planner.work_item(1).unwrap().expected_end, Some(d(2025, 1, 8)));
}

#[test]
fn referenced_resource_cannot_be_deleted() {
    let mut planner = planner_with_alice();
    planner.create_work_item(draft(4.0)).unwrap();

    let err = planner.delete_resource("alice").unwrap_err();
    assert!(matches!(err, PlannerError::Constraint(_)), "got {err:?}");
    assert!(planner.resource("alice").is_ok());

    planner.delete_work_item(1).unwrap();
    planner.delete_resource("alice").unwrap();
    assert!(matches!(
        planner.resource("alice").unwrap_err(),
        PlannerError::NotFound { entity: "resource", .. }
    ));
}

#[test]
fn missing_records_are_not_found() {
    let mut planner = planner_with_alice();
    assert!(matches!(
        planner.delete_resource("nobody").unwrap_err(),
        PlannerError::NotFound { .. }
    ));
    assert!(matches!(
        planner.work_item(42).unwrap_err(),
        PlannerError::NotFound { entity: "work item", .. }
    ));
    assert!(matches!(
        planner.delete_work_item(42).unwrap_err(),
        PlannerError::NotFound { .. }
    ));
    let err = planner
        .create_work_item(WorkItemDraft::new("x", 1.0, "nobody", monday()))
        .unwrap_err();
    assert!(matches!(err, PlannerError::NotFound { .. }));
    assert!(planner.work_items().unwrap().is_empty());
}

#[test]
fn duplicate_resource_is_a_constraint_violation() {
    let mut planner = planner_with_alice();
    let err = planner
        .create_resource(Resource::new("alice", "Other Alice", CapacityTier::Red))
        .unwrap_err();
    assert!(matches!(err, PlannerError::Constraint(_)));
    assert_eq!(planner.resource("alice").unwrap().name, "Alice");
}

#[test]
fn invalid_estimates_are_rejected_and_nothing_is_saved() {
    let mut planner = planner_with_alice();
    let err = planner.create_work_item(draft(-1.0)).unwrap_err();
    assert_eq!(err.field(), Some("estimated_hours"));
    assert!(planner.work_items().unwrap().is_empty());
}

#[test]
fn update_reassigns_and_recomputes() {
    let mut planner = planner_with_alice();
    planner
        .create_resource(Resource::new("rita", "Rita", CapacityTier::Red))
        .unwrap();
    let created = planner.create_work_item(draft(8.0)).unwrap();
    assert_eq!(created.expected_end, Some(monday()));

    let mut change = WorkItemDraft::from(&created);
    change.resource_id = "rita".into();
    let updated = planner.update_work_item(created.id, change).unwrap();
    // 8h at 2h/day
    assert_eq!(updated.expected_end, Some(d(2025, 1, 9)));
    assert_eq!(updated.name, "Build API");
    assert_eq!(planner.work_item(created.id).unwrap().resource_id, "rita");
}

#[test]
fn forecast_does_not_persist() {
    let planner = planner_with_alice();
    let forecast = planner.forecast(&draft(200.0)).unwrap();
    // 25 working days from Monday 2025-01-06
    assert_eq!(forecast.expected_end, d(2025, 2, 7));
    assert_eq!(forecast.status, Status::VeryRisky);
    assert!(planner.work_items().unwrap().is_empty());
}

#[test]
fn availability_ranks_each_resource() {
    let mut planner = planner_with_alice();
    planner
        .create_resource(Resource::new("yuri", "Yuri", CapacityTier::Yellow))
        .unwrap();
    planner
        .create_resource(Resource::new("rita", "Rita", CapacityTier::Red))
        .unwrap();

    let rows = planner.availability(monday(), d(2025, 1, 10), 20.0).unwrap();
    let status_of = |id: &str| {
        rows.iter()
            .find(|row| row.resource_id == id)
            .map(|row| (row.available_hours, row.status))
            .unwrap()
    };
    assert_eq!(status_of("alice"), (40.0, AvailabilityStatus::Available));
    assert_eq!(status_of("yuri"), (20.0, AvailabilityStatus::Available));
    assert_eq!(status_of("rita"), (10.0, AvailabilityStatus::Insufficient));

    let err = planner.availability(d(2025, 1, 10), monday(), 1.0).unwrap_err();
    assert_eq!(err.field(), Some("end"));
}

#[test]
fn refresh_summarises_statuses() {
    let mut planner = planner_with_alice();
    planner.create_work_item(draft(8.0)).unwrap();
    planner.create_work_item(draft(120.0)).unwrap();
    planner.create_work_item(draft(200.0)).unwrap();

    let summary = planner.refresh().unwrap();
    assert_eq!(summary.item_count, 3);
    assert_eq!(summary.on_track_count, 1);
    assert_eq!(summary.at_risk_count, 1);
    assert_eq!(summary.very_risky_count, 1);
    assert_eq!(summary.latest_end, Some(d(2025, 2, 7)));
    assert!(summary.to_cli_summary().starts_with("items=3, on_track=1"));
}

#[test]
fn settings_are_validated_on_construction() {
    let mut settings = PlannerSettings::default();
    settings.working_days.clear();
    assert!(Planner::new(Workbook::new(), settings).is_err());
}

#[test]
fn reopening_with_new_capacity_recomputes_stored_items() {
    let mut planner = planner_with_alice();
    planner.create_work_item(draft(20.0)).unwrap();
    assert_eq!(planner.work_item(1).unwrap().expected_end, Some(d(2025, 1, 8)));
    let store = planner.into_store();

    let settings = PlannerSettings {
        capacity: CapacityPolicy::new(4.0, 2.0, 1.0).unwrap(),
        ..PlannerSettings::default()
    };
    let reopened = Planner::new(store, settings).unwrap();
    let item = reopened.work_item(1).unwrap();
    assert_eq!(item.expected_end, Some(d(2025, 1, 10)));
    assert_eq!(
        item.expected_end,
        Some(reopened.forecast(&WorkItemDraft::from(&item)).unwrap().expected_end)
    );
}

#[test]
fn exhausted_id_space_is_a_constraint_violation() {
    let workbook = Workbook::from_parts(
        vec![Resource::new("alice", "Alice", CapacityTier::Green)],
        vec![WorkItem::new(i32::MAX, "Last", 1.0, "alice", monday())],
        Vec::<NaiveDate>::new(),
    )
    .unwrap();
    let mut planner = Planner::new(workbook, PlannerSettings::default())
        .unwrap()
        .with_reference_date(monday());

    let err = planner.create_work_item(draft(1.0)).unwrap_err();
    assert!(matches!(err, PlannerError::Constraint(_)), "got {err:?}");
    assert_eq!(planner.work_items().unwrap().len(), 1);
}
