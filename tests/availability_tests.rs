use chrono::NaiveDate;
use workload_planner::calculations::{assess, available_hours};
use workload_planner::{AvailabilityPolicy, AvailabilityStatus, CapacityTier, Resource, WorkCalendar};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn full_week_of_green_capacity_is_forty_hours() {
    let cal = WorkCalendar::default();
    assert_eq!(available_hours(&cal, 8.0, d(2025, 1, 6), d(2025, 1, 12)), 40.0);
    // single day window
    assert_eq!(available_hours(&cal, 8.0, d(2025, 1, 6), d(2025, 1, 6)), 8.0);
    assert_eq!(available_hours(&cal, 8.0, d(2025, 1, 4), d(2025, 1, 5)), 0.0);
}

#[test]
fn holidays_and_pto_reduce_available_hours() {
    let cal = WorkCalendar::with_holidays([d(2025, 1, 7)]);
    let resource = Resource::new("carol", "Carol", CapacityTier::Yellow).with_pto([d(2025, 1, 9)]);
    let view = cal.for_resource(&resource);
    assert_eq!(available_hours(&cal, 4.0, d(2025, 1, 6), d(2025, 1, 10)), 16.0);
    assert_eq!(available_hours(&view, 4.0, d(2025, 1, 6), d(2025, 1, 10)), 12.0);
}

#[test]
fn inverted_window_has_no_hours() {
    let cal = WorkCalendar::default();
    assert_eq!(available_hours(&cal, 8.0, d(2025, 1, 10), d(2025, 1, 6)), 0.0);
}

#[test]
fn assessment_thresholds() {
    let policy = AvailabilityPolicy::default();
    assert_eq!(assess(&policy, 40.0, 40.0), AvailabilityStatus::Available);
    assert_eq!(assess(&policy, 48.0, 40.0), AvailabilityStatus::Available);
    assert_eq!(assess(&policy, 30.0, 40.0), AvailabilityStatus::AtRisk);
    assert_eq!(assess(&policy, 20.0, 40.0), AvailabilityStatus::Insufficient);
    assert_eq!(assess(&policy, 0.0, 0.0), AvailabilityStatus::Available);
}

#[test]
fn ratio_outside_unit_interval_is_rejected() {
    for ratio in [-0.1, 1.5, f64::NAN] {
        let policy = AvailabilityPolicy { at_risk_ratio: ratio };
        assert_eq!(policy.validate().unwrap_err().field(), Some("at_risk_ratio"));
    }
    assert!(AvailabilityPolicy { at_risk_ratio: 1.0 }.validate().is_ok());
}

#[test]
fn long_windows_are_counted_without_listing_days() {
    let cal = WorkCalendar::default();
    let hours = available_hours(&cal, 2.0, d(2000, 1, 1), d(2399, 12, 31));
    assert_eq!(hours, (20871 * 5 * 2) as f64);
}
