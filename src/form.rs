//! Raw string input from a presentation layer (HTML form, JSON body, CLI).
//!
//! Parsing happens here so the planner only ever sees typed values, and every
//! rejection names the field it came from.

use crate::error::{PlannerError, PlannerResult};
use crate::{CapacityTier, Resource, WorkItemDraft};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceForm {
    pub id: String,
    pub name: String,
    pub tier: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkItemForm {
    pub name: String,
    pub estimated_hours: String,
    pub resource_id: String,
    pub start_date: String,
    pub due_date: String,
}

impl ResourceForm {
    pub fn new(id: impl Into<String>, name: impl Into<String>, tier: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tier: tier.into(),
        }
    }

    /// A blank tier means Green; a blank name falls back to the id.
    pub fn parse(&self) -> PlannerResult<Resource> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(PlannerError::invalid("id", "resource id is required"));
        }
        if id.contains(char::is_whitespace) {
            return Err(PlannerError::invalid(
                "id",
                format!("resource id '{id}' must not contain whitespace"),
            ));
        }
        let name = match self.name.trim() {
            "" => id,
            name => name,
        };
        let tier = if self.tier.trim().is_empty() {
            CapacityTier::Green
        } else {
            CapacityTier::from_str(&self.tier)?
        };
        Ok(Resource::new(id, name, tier))
    }
}

impl WorkItemForm {
    /// `reference_date` fills in a blank start date.
    pub fn parse(&self, reference_date: NaiveDate) -> PlannerResult<WorkItemDraft> {
        let estimated_hours = parse_hours(&self.estimated_hours)?;

        let resource_id = self.resource_id.trim();
        if resource_id.is_empty() {
            return Err(PlannerError::invalid(
                "resource_id",
                "a resource must be selected",
            ));
        }

        let start_date = parse_optional_date("start_date", &self.start_date)?.unwrap_or(reference_date);
        let due_date = parse_optional_date("due_date", &self.due_date)?;

        Ok(WorkItemDraft {
            name: self.name.trim().to_string(),
            estimated_hours,
            resource_id: resource_id.to_string(),
            start_date,
            due_date,
        })
    }
}

fn parse_hours(input: &str) -> PlannerResult<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PlannerError::invalid("estimated_hours", "estimate is required"));
    }
    let hours = trimmed.parse::<f64>().map_err(|_| {
        PlannerError::invalid(
            "estimated_hours",
            format!("estimate must be a number (got '{trimmed}')"),
        )
    })?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(PlannerError::invalid(
            "estimated_hours",
            format!("estimate must be a non-negative number of hours (got {trimmed})"),
        ));
    }
    Ok(hours)
}

/// Parses `YYYY-MM-DD`, or a `datetime-local` style value whose date part is kept.
pub fn parse_date(field: &'static str, input: &str) -> PlannerResult<NaiveDate> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime.date());
        }
    }
    Err(PlannerError::invalid(
        field,
        format!("'{trimmed}' is not a date (expected YYYY-MM-DD)"),
    ))
}

pub fn parse_optional_date(field: &'static str, input: &str) -> PlannerResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    parse_date(field, input).map(Some)
}
