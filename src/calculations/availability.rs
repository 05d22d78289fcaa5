use crate::calendar::{WorkingDays, count_working_days};
use crate::error::{PlannerError, PlannerResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How well a resource's free hours in a window cover an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    AtRisk,
    Insufficient,
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AvailabilityStatus::Available => "Available",
            AvailabilityStatus::AtRisk => "At Risk",
            AvailabilityStatus::Insufficient => "Insufficient",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityPolicy {
    /// Fraction of the estimate that still counts as AtRisk rather than Insufficient.
    pub at_risk_ratio: f64,
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self { at_risk_ratio: 0.7 }
    }
}

impl AvailabilityPolicy {
    pub fn validate(&self) -> PlannerResult<()> {
        if !self.at_risk_ratio.is_finite() || !(0.0..=1.0).contains(&self.at_risk_ratio) {
            return Err(PlannerError::invalid(
                "at_risk_ratio",
                format!("ratio must be between 0 and 1 (got {})", self.at_risk_ratio),
            ));
        }
        Ok(())
    }
}

/// Capacity over the working days of `[start, end]`. Empty windows yield zero.
pub fn available_hours<C>(
    calendar: &C,
    daily_capacity_hours: f64,
    start: NaiveDate,
    end: NaiveDate,
) -> f64
where
    C: WorkingDays + ?Sized,
{
    if start > end {
        return 0.0;
    }
    count_working_days(calendar, start, end) as f64 * daily_capacity_hours
}

pub fn assess(policy: &AvailabilityPolicy, available: f64, required: f64) -> AvailabilityStatus {
    if available >= required {
        AvailabilityStatus::Available
    } else if available >= required * policy.at_risk_ratio {
        AvailabilityStatus::AtRisk
    } else {
        AvailabilityStatus::Insufficient
    }
}
