use crate::calendar::WorkingDays;
use crate::capacity::ensure_positive_capacity;
use crate::error::{PlannerError, PlannerResult};
use chrono::NaiveDate;

/// Walks a calendar day by day, draining an hours budget at a fixed daily rate.
pub struct EndDatePass<'a, C: WorkingDays + ?Sized> {
    calendar: &'a C,
    daily_capacity_hours: f64,
}

impl<'a, C: WorkingDays + ?Sized> EndDatePass<'a, C> {
    pub fn new(calendar: &'a C, daily_capacity_hours: f64) -> PlannerResult<Self> {
        ensure_positive_capacity(daily_capacity_hours)?;
        Ok(Self {
            calendar,
            daily_capacity_hours,
        })
    }

    /// Returns the first working day on which the remaining hours reach zero or below.
    ///
    /// A zero-hour estimate ends on the first working day on or after `start`.
    pub fn execute(&self, estimated_hours: f64, start: NaiveDate) -> PlannerResult<NaiveDate> {
        if !estimated_hours.is_finite() || estimated_hours < 0.0 {
            return Err(PlannerError::invalid(
                "estimated_hours",
                format!("estimate must be a non-negative number of hours (got {estimated_hours})"),
            ));
        }

        let mut remaining = estimated_hours;
        let mut day = start;
        loop {
            if self.calendar.is_working_day(day) {
                remaining -= self.daily_capacity_hours;
                if remaining <= 0.0 {
                    return Ok(day);
                }
            }
            day = day.succ_opt().ok_or_else(|| {
                PlannerError::invalid(
                    "start_date",
                    format!("schedule starting {start} runs past the last representable date"),
                )
            })?;
        }
    }
}

pub fn compute_end_date<C>(
    calendar: &C,
    estimated_hours: f64,
    daily_capacity_hours: f64,
    start_date: NaiveDate,
) -> PlannerResult<NaiveDate>
where
    C: WorkingDays + ?Sized,
{
    EndDatePass::new(calendar, daily_capacity_hours)?.execute(estimated_hours, start_date)
}
