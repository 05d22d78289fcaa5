use crate::error::{PlannerError, PlannerResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    OnTrack,
    AtRisk,
    VeryRisky,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::OnTrack, Status::AtRisk, Status::VeryRisky];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::OnTrack => "on_track",
            Status::AtRisk => "at_risk",
            Status::VeryRisky => "very_risky",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::OnTrack => "On Track",
            Status::AtRisk => "At Risk",
            Status::VeryRisky => "Very Risky",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = PlannerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| {
                status.as_str().eq_ignore_ascii_case(value.trim())
                    || status.label().eq_ignore_ascii_case(value.trim())
            })
            .ok_or_else(|| PlannerError::invalid("status", format!("unknown status '{value}'")))
    }
}

/// Day thresholds separating the three status tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusPolicy {
    /// A late item becomes VeryRisky once it overruns its due date by more than this.
    pub very_risky_late_days: i64,
    /// Without a due date: OnTrack when finishing within this many days of the reference date.
    pub open_ended_on_track_days: i64,
    /// Without a due date: VeryRisky when finishing more than this many days out.
    pub open_ended_very_risky_days: i64,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            very_risky_late_days: 5,
            open_ended_on_track_days: 10,
            open_ended_very_risky_days: 20,
        }
    }
}

impl StatusPolicy {
    pub fn validate(&self) -> PlannerResult<()> {
        if self.very_risky_late_days < 0 {
            return Err(PlannerError::invalid(
                "very_risky_late_days",
                "threshold must not be negative",
            ));
        }
        if self.open_ended_on_track_days < 0 {
            return Err(PlannerError::invalid(
                "open_ended_on_track_days",
                "threshold must not be negative",
            ));
        }
        if self.open_ended_very_risky_days < self.open_ended_on_track_days {
            return Err(PlannerError::invalid(
                "open_ended_very_risky_days",
                format!(
                    "threshold {} is below open_ended_on_track_days {}",
                    self.open_ended_very_risky_days, self.open_ended_on_track_days
                ),
            ));
        }
        Ok(())
    }
}

pub fn classify(
    policy: &StatusPolicy,
    end_date: NaiveDate,
    reference_date: NaiveDate,
    due_date: Option<NaiveDate>,
) -> Status {
    match due_date {
        Some(due) => {
            let late_days = (end_date - due).num_days();
            if late_days <= 0 {
                Status::OnTrack
            } else if late_days > policy.very_risky_late_days {
                Status::VeryRisky
            } else {
                Status::AtRisk
            }
        }
        None => {
            let slack_days = (end_date - reference_date).num_days();
            if slack_days <= policy.open_ended_on_track_days {
                Status::OnTrack
            } else if slack_days > policy.open_ended_very_risky_days {
                Status::VeryRisky
            } else {
                Status::AtRisk
            }
        }
    }
}
