use crate::{Resource, WorkItem};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("{0}")]
    Constraint(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Record store for resources, work items and the holiday list.
///
/// Implementations enforce referential integrity: a work item must point at an
/// existing resource, and a resource cannot be deleted while referenced.
pub trait WorkloadStore {
    fn list_resources(&self) -> PersistenceResult<Vec<Resource>>;

    fn find_resource(&self, id: &str) -> PersistenceResult<Option<Resource>> {
        Ok(self.list_resources()?.into_iter().find(|r| r.id == id))
    }

    fn upsert_resource(&mut self, resource: Resource) -> PersistenceResult<()>;

    /// Returns `false` when no resource has this id.
    fn delete_resource(&mut self, id: &str) -> PersistenceResult<bool>;

    fn list_work_items(&self) -> PersistenceResult<Vec<WorkItem>>;

    fn find_work_item(&self, id: i32) -> PersistenceResult<Option<WorkItem>> {
        Ok(self.list_work_items()?.into_iter().find(|w| w.id == id))
    }

    fn upsert_work_item(&mut self, item: WorkItem) -> PersistenceResult<()>;

    fn delete_work_item(&mut self, id: i32) -> PersistenceResult<bool>;

    fn list_holidays(&self) -> PersistenceResult<Vec<NaiveDate>>;

    fn add_holiday(&mut self, date: NaiveDate) -> PersistenceResult<bool>;

    fn remove_holiday(&mut self, date: NaiveDate) -> PersistenceResult<bool>;
}

pub type BoxedStore = Box<dyn WorkloadStore + Send + Sync>;

impl<S: WorkloadStore + ?Sized> WorkloadStore for Box<S> {
    fn list_resources(&self) -> PersistenceResult<Vec<Resource>> {
        (**self).list_resources()
    }

    fn find_resource(&self, id: &str) -> PersistenceResult<Option<Resource>> {
        (**self).find_resource(id)
    }

    fn upsert_resource(&mut self, resource: Resource) -> PersistenceResult<()> {
        (**self).upsert_resource(resource)
    }

    fn delete_resource(&mut self, id: &str) -> PersistenceResult<bool> {
        (**self).delete_resource(id)
    }

    fn list_work_items(&self) -> PersistenceResult<Vec<WorkItem>> {
        (**self).list_work_items()
    }

    fn find_work_item(&self, id: i32) -> PersistenceResult<Option<WorkItem>> {
        (**self).find_work_item(id)
    }

    fn upsert_work_item(&mut self, item: WorkItem) -> PersistenceResult<()> {
        (**self).upsert_work_item(item)
    }

    fn delete_work_item(&mut self, id: i32) -> PersistenceResult<bool> {
        (**self).delete_work_item(id)
    }

    fn list_holidays(&self) -> PersistenceResult<Vec<NaiveDate>> {
        (**self).list_holidays()
    }

    fn add_holiday(&mut self, date: NaiveDate) -> PersistenceResult<bool> {
        (**self).add_holiday(date)
    }

    fn remove_holiday(&mut self, date: NaiveDate) -> PersistenceResult<bool> {
        (**self).remove_holiday(date)
    }
}

pub fn validate_resource(resource: &Resource) -> PersistenceResult<()> {
    if resource.id.trim().is_empty() {
        return Err(PersistenceError::InvalidData(
            "resource requires a non-empty id".into(),
        ));
    }
    Ok(())
}

pub fn validate_work_item(item: &WorkItem) -> PersistenceResult<()> {
    if item.id <= 0 {
        return Err(PersistenceError::InvalidData(format!(
            "work item id must be positive (got {})",
            item.id
        )));
    }
    if !item.estimated_hours.is_finite() || item.estimated_hours < 0.0 {
        return Err(PersistenceError::InvalidData(format!(
            "work item {} has invalid estimated_hours {}",
            item.id, item.estimated_hours
        )));
    }
    if item.resource_id.trim().is_empty() {
        return Err(PersistenceError::InvalidData(format!(
            "work item {} requires a resource_id",
            item.id
        )));
    }
    Ok(())
}

/// Checks a full set of records the way a store would on load.
pub fn validate_records(resources: &[Resource], work_items: &[WorkItem]) -> PersistenceResult<()> {
    let mut resource_ids = HashSet::with_capacity(resources.len());
    for resource in resources {
        validate_resource(resource)?;
        if !resource_ids.insert(resource.id.as_str()) {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate resource id '{}'",
                resource.id
            )));
        }
    }

    let mut item_ids = HashSet::with_capacity(work_items.len());
    for item in work_items {
        validate_work_item(item)?;
        if !item_ids.insert(item.id) {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate work item id {}",
                item.id
            )));
        }
        if !resource_ids.contains(item.resource_id.as_str()) {
            return Err(PersistenceError::InvalidData(format!(
                "work item {} references unknown resource '{}'",
                item.id, item.resource_id
            )));
        }
    }
    Ok(())
}

pub(crate) fn referenced_resource_error(resource_id: &str, item_ids: &[i32]) -> PersistenceError {
    let ids = item_ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    PersistenceError::Constraint(format!(
        "resource '{resource_id}' is still assigned to work items {ids}"
    ))
}

pub(crate) fn missing_resource_error(item_id: i32, resource_id: &str) -> PersistenceError {
    PersistenceError::Constraint(format!(
        "work item {item_id} references unknown resource '{resource_id}'"
    ))
}

pub mod file;
pub mod spreadsheet;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod workbook;

pub use file::{load_workbook_from_json, save_workbook_to_json};
pub use spreadsheet::SpreadsheetStore;
pub use workbook::Workbook;
