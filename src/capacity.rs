use crate::error::{PlannerError, PlannerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Capacity tier of a resource. Hours per tier come from [`CapacityPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityTier {
    Green,
    Yellow,
    Red,
}

impl CapacityTier {
    pub const ALL: [CapacityTier; 3] = [CapacityTier::Green, CapacityTier::Yellow, CapacityTier::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityTier::Green => "green",
            CapacityTier::Yellow => "yellow",
            CapacityTier::Red => "red",
        }
    }
}

impl fmt::Display for CapacityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapacityTier {
    type Err = PlannerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(CapacityTier::Green),
            "yellow" => Ok(CapacityTier::Yellow),
            "red" => Ok(CapacityTier::Red),
            other => Err(PlannerError::invalid(
                "tier",
                format!("unknown capacity tier '{other}' (expected green, yellow or red)"),
            )),
        }
    }
}

/// Hours of work per day for each capacity tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapacityPolicy {
    hours: BTreeMap<CapacityTier, f64>,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            hours: BTreeMap::from([
                (CapacityTier::Green, 8.0),
                (CapacityTier::Yellow, 4.0),
                (CapacityTier::Red, 2.0),
            ]),
        }
    }
}

impl CapacityPolicy {
    pub fn new(green: f64, yellow: f64, red: f64) -> PlannerResult<Self> {
        let policy = Self {
            hours: BTreeMap::from([
                (CapacityTier::Green, green),
                (CapacityTier::Yellow, yellow),
                (CapacityTier::Red, red),
            ]),
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn hours_for(&self, tier: CapacityTier) -> PlannerResult<f64> {
        let hours = self.hours.get(&tier).copied().ok_or_else(|| {
            PlannerError::invalid(
                "daily_capacity_hours",
                format!("no hours configured for tier '{tier}'"),
            )
        })?;
        ensure_positive_capacity(hours)?;
        Ok(hours)
    }

    pub fn set_hours(&mut self, tier: CapacityTier, hours: f64) -> PlannerResult<()> {
        ensure_positive_capacity(hours)?;
        self.hours.insert(tier, hours);
        Ok(())
    }

    /// Every tier must map to a finite, positive number of hours.
    pub fn validate(&self) -> PlannerResult<()> {
        for tier in CapacityTier::ALL {
            self.hours_for(tier)?;
        }
        Ok(())
    }
}

pub(crate) fn ensure_positive_capacity(hours: f64) -> PlannerResult<()> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(PlannerError::invalid(
            "daily_capacity_hours",
            format!("daily capacity must be a positive number of hours (got {hours})"),
        ));
    }
    Ok(())
}
