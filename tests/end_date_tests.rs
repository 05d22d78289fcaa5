use chrono::NaiveDate;
use workload_planner::calendar::WorkCalendar;
use workload_planner::calculations::EndDatePass;
use workload_planner::{CapacityTier, PlannerError, Resource, compute_end_date};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// 2025-01-06 is a Monday.
fn monday() -> NaiveDate {
    d(2025, 1, 6)
}

#[test]
fn twenty_hours_at_eight_per_day_ends_wednesday() {
    let cal = WorkCalendar::default();
    let end = compute_end_date(&cal, 20.0, 8.0, monday()).unwrap();
    assert_eq!(end, d(2025, 1, 8));
}

#[test]
fn tuesday_holiday_shifts_end_to_thursday() {
    let cal = WorkCalendar::with_holidays([d(2025, 1, 7)]);
    let end = compute_end_date(&cal, 20.0, 8.0, monday()).unwrap();
    assert_eq!(end, d(2025, 1, 9));
}

#[test]
fn exact_multiple_ends_on_the_day_hours_reach_zero() {
    let cal = WorkCalendar::default();
    assert_eq!(compute_end_date(&cal, 16.0, 8.0, monday()).unwrap(), d(2025, 1, 7));
    assert_eq!(compute_end_date(&cal, 16.5, 8.0, monday()).unwrap(), d(2025, 1, 8));
    assert_eq!(compute_end_date(&cal, 0.5, 8.0, monday()).unwrap(), monday());
}

#[test]
fn work_spills_over_the_weekend() {
    let cal = WorkCalendar::default();
    // Friday start, 12h at 8h/day -> Friday + Monday
    let end = compute_end_date(&cal, 12.0, 8.0, d(2025, 1, 10)).unwrap();
    assert_eq!(end, d(2025, 1, 13));
}

#[test]
fn non_working_start_contributes_no_capacity() {
    let cal = WorkCalendar::default();
    let saturday = d(2025, 1, 4);
    assert_eq!(compute_end_date(&cal, 1.0, 1.0, saturday).unwrap(), monday());
}

#[test]
fn zero_hours_lands_on_first_working_day() {
    let cal = WorkCalendar::with_holidays([d(2025, 1, 7)]);
    assert_eq!(compute_end_date(&cal, 0.0, 8.0, monday()).unwrap(), monday());
    assert_eq!(compute_end_date(&cal, 0.0, 8.0, d(2025, 1, 4)).unwrap(), monday());
    assert_eq!(compute_end_date(&cal, 0.0, 8.0, d(2025, 1, 7)).unwrap(), d(2025, 1, 8));
}

#[test]
fn negative_or_non_finite_hours_are_rejected() {
    let cal = WorkCalendar::default();
    for hours in [-1.0, f64::NAN, f64::INFINITY] {
        let err = compute_end_date(&cal, hours, 8.0, monday()).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::InvalidInput {
                field: "estimated_hours",
                ..
            }
        ));
    }
}

#[test]
fn non_positive_capacity_is_rejected() {
    let cal = WorkCalendar::default();
    for capacity in [0.0, -2.0, f64::NAN] {
        let err = compute_end_date(&cal, 8.0, capacity, monday()).unwrap_err();
        assert_eq!(err.field(), Some("daily_capacity_hours"));
    }
    assert!(EndDatePass::new(&cal, 0.0).is_err());
}

#[test]
fn result_is_never_before_start_and_is_repeatable() {
    let cal = WorkCalendar::with_holidays([d(2025, 1, 7), d(2025, 1, 20)]);
    for offset in 0..21 {
        let start = monday() + chrono::Duration::days(offset);
        for hours in [0.0, 1.0, 7.5, 20.0, 64.0] {
            let first = compute_end_date(&cal, hours, 6.0, start).unwrap();
            let second = compute_end_date(&cal, hours, 6.0, start).unwrap();
            assert!(first >= start);
            assert_eq!(first, second);
        }
    }
}

#[test]
fn more_hours_never_finish_earlier() {
    let cal = WorkCalendar::with_holidays([d(2025, 1, 7)]);
    let pass = EndDatePass::new(&cal, 3.0).unwrap();
    let mut previous = pass.execute(0.0, monday()).unwrap();
    for step in 1..=120 {
        let end = pass.execute(step as f64 * 0.5, monday()).unwrap();
        assert!(end >= previous, "{} hours finished before a smaller estimate", step as f64 * 0.5);
        previous = end;
    }
}

#[test]
fn more_capacity_never_finishes_later() {
    let cal = WorkCalendar::with_holidays([d(2025, 1, 9)]);
    let mut previous = compute_end_date(&cal, 60.0, 0.5, monday()).unwrap();
    for capacity in [1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 10.0, 24.0] {
        let end = compute_end_date(&cal, 60.0, capacity, monday()).unwrap();
        assert!(end <= previous, "capacity {capacity} finished later");
        previous = end;
    }
}

#[test]
fn resource_pto_is_skipped() {
    let cal = WorkCalendar::default();
    let resource = Resource::new("bob", "Bob", CapacityTier::Green).with_pto([d(2025, 1, 7)]);
    let end = compute_end_date(&cal.for_resource(&resource), 20.0, 8.0, monday()).unwrap();
    assert_eq!(end, d(2025, 1, 9));
}
