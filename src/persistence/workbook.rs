use super::{
    PersistenceResult, WorkloadStore, missing_resource_error, referenced_resource_error,
    validate_records, validate_resource, validate_work_item,
};
use crate::{Resource, WorkItem};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// In-memory set of sheets: resources, work items and holidays, in row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    work_items: Vec<WorkItem>,
    #[serde(default)]
    holidays: BTreeSet<NaiveDate>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        resources: Vec<Resource>,
        work_items: Vec<WorkItem>,
        holidays: impl IntoIterator<Item = NaiveDate>,
    ) -> PersistenceResult<Self> {
        validate_records(&resources, &work_items)?;
        Ok(Self {
            resources,
            work_items,
            holidays: holidays.into_iter().collect(),
        })
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn work_items(&self) -> &[WorkItem] {
        &self.work_items
    }

    pub fn holidays(&self) -> &BTreeSet<NaiveDate> {
        &self.holidays
    }

    pub fn validate(&self) -> PersistenceResult<()> {
        validate_records(&self.resources, &self.work_items)
    }
}

impl WorkloadStore for Workbook {
    fn list_resources(&self) -> PersistenceResult<Vec<Resource>> {
        Ok(self.resources.clone())
    }

    fn find_resource(&self, id: &str) -> PersistenceResult<Option<Resource>> {
        Ok(self.resources.iter().find(|r| r.id == id).cloned())
    }

    fn upsert_resource(&mut self, resource: Resource) -> PersistenceResult<()> {
        validate_resource(&resource)?;
        match self.resources.iter_mut().find(|r| r.id == resource.id) {
            Some(existing) => *existing = resource,
            None => self.resources.push(resource),
        }
        Ok(())
    }

    fn delete_resource(&mut self, id: &str) -> PersistenceResult<bool> {
        let referencing: Vec<i32> = self
            .work_items
            .iter()
            .filter(|w| w.resource_id == id)
            .map(|w| w.id)
            .collect();
        if !referencing.is_empty() {
            return Err(referenced_resource_error(id, &referencing));
        }
        let before = self.resources.len();
        self.resources.retain(|r| r.id != id);
        Ok(self.resources.len() != before)
    }

    fn list_work_items(&self) -> PersistenceResult<Vec<WorkItem>> {
        Ok(self.work_items.clone())
    }

    fn find_work_item(&self, id: i32) -> PersistenceResult<Option<WorkItem>> {
        Ok(self.work_items.iter().find(|w| w.id == id).cloned())
    }

    fn upsert_work_item(&mut self, item: WorkItem) -> PersistenceResult<()> {
        validate_work_item(&item)?;
        if !self.resources.iter().any(|r| r.id == item.resource_id) {
            return Err(missing_resource_error(item.id, &item.resource_id));
        }
        match self.work_items.iter_mut().find(|w| w.id == item.id) {
            Some(existing) => *existing = item,
            None => self.work_items.push(item),
        }
        Ok(())
    }

    fn delete_work_item(&mut self, id: i32) -> PersistenceResult<bool> {
        let before = self.work_items.len();
        self.work_items.retain(|w| w.id != id);
        Ok(self.work_items.len() != before)
    }

    fn list_holidays(&self) -> PersistenceResult<Vec<NaiveDate>> {
        Ok(self.holidays.iter().copied().collect())
    }

    fn add_holiday(&mut self, date: NaiveDate) -> PersistenceResult<bool> {
        Ok(self.holidays.insert(date))
    }

    fn remove_holiday(&mut self, date: NaiveDate) -> PersistenceResult<bool> {
        Ok(self.holidays.remove(&date))
    }
}
