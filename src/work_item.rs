use crate::calculations::status::Status;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A task with an effort estimate, assigned to exactly one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: i32,
    pub name: String,
    pub estimated_hours: f64,
    /// Identity of the assigned resource. The resource is not embedded.
    pub resource_id: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<NaiveDateTime>,
}

impl WorkItem {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        estimated_hours: f64,
        resource_id: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            estimated_hours,
            resource_id: resource_id.into(),
            start_date,
            due_date: None,
            expected_end: None,
            status: None,
            assigned_at: None,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn default_name(id: i32) -> String {
        format!("WorkItem#{id}")
    }
}

/// User-supplied fields of a work item, before an id or computed fields exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItemDraft {
    #[serde(default)]
    pub name: String,
    pub estimated_hours: f64,
    pub resource_id: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl WorkItemDraft {
    pub fn new(
        name: impl Into<String>,
        estimated_hours: f64,
        resource_id: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            estimated_hours,
            resource_id: resource_id.into(),
            start_date,
            due_date: None,
        }
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

impl From<&WorkItem> for WorkItemDraft {
    fn from(item: &WorkItem) -> Self {
        Self {
            name: item.name.clone(),
            estimated_hours: item.estimated_hours,
            resource_id: item.resource_id.clone(),
            start_date: item.start_date,
            due_date: item.due_date,
        }
    }
}
