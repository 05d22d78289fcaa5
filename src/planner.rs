use crate::calculations::{
    AvailabilityPolicy, AvailabilityStatus, Status, StatusPolicy, assess, available_hours,
    classify, compute_end_date,
};
use crate::calendar::WorkCalendar;
use crate::capacity::CapacityPolicy;
use crate::error::{PlannerError, PlannerResult};
use crate::persistence::WorkloadStore;
use crate::{Resource, WorkItem, WorkItemDraft};
use chrono::{Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Policies the planner computes with. All of it is configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub working_days: Vec<Weekday>,
    pub capacity: CapacityPolicy,
    pub status: StatusPolicy,
    pub availability: AvailabilityPolicy,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            capacity: CapacityPolicy::default(),
            status: StatusPolicy::default(),
            availability: AvailabilityPolicy::default(),
        }
    }
}

impl PlannerSettings {
    pub fn validate(&self) -> PlannerResult<()> {
        if self.working_days.is_empty() {
            return Err(PlannerError::invalid(
                "working_days",
                "at least one working day is required",
            ));
        }
        self.capacity.validate()?;
        self.status.validate()?;
        self.availability.validate()?;
        Ok(())
    }
}

/// Computed schedule for a work item that has not necessarily been saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub expected_end: NaiveDate,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAvailability {
    pub resource_id: String,
    pub resource_name: String,
    pub available_hours: f64,
    pub status: AvailabilityStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub item_count: usize,
    pub on_track_count: usize,
    pub at_risk_count: usize,
    pub very_risky_count: usize,
    pub latest_end: Option<NaiveDate>,
}

impl RefreshSummary {
    fn record(&mut self, forecast: Forecast) {
        self.item_count += 1;
        match forecast.status {
            Status::OnTrack => self.on_track_count += 1,
            Status::AtRisk => self.at_risk_count += 1,
            Status::VeryRisky => self.very_risky_count += 1,
        }
        self.latest_end = self.latest_end.max(Some(forecast.expected_end));
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = vec![
            format!("items={}", self.item_count),
            format!("on_track={}", self.on_track_count),
            format!("at_risk={}", self.at_risk_count),
            format!("very_risky={}", self.very_risky_count),
        ];
        if let Some(date) = self.latest_end {
            parts.push(format!("latest_end={date}"));
        }
        parts.join(", ")
    }
}

/// Resource and work item bookkeeping on top of a [`WorkloadStore`].
///
/// Expected end dates and statuses are recomputed every time one of their inputs
/// changes, so stored work items never go stale relative to the store.
pub struct Planner<S: WorkloadStore> {
    store: S,
    calendar: WorkCalendar,
    settings: PlannerSettings,
    reference_date: Option<NaiveDate>,
}

impl<S: WorkloadStore> Planner<S> {
    pub fn new(store: S, settings: PlannerSettings) -> PlannerResult<Self> {
        settings.validate()?;
        let mut calendar = WorkCalendar::with_holidays(store.list_holidays()?);
        calendar.set_working_days(&settings.working_days)?;
        let mut planner = Self {
            store,
            calendar,
            settings,
            reference_date: None,
        };
        // Stored end dates may predate the current capacity and calendar settings.
        planner.refresh()?;
        Ok(planner)
    }

    /// Pins "today" instead of reading the local clock.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn resources(&self) -> PlannerResult<Vec<Resource>> {
        Ok(self.store.list_resources()?)
    }

    pub fn resource(&self, id: &str) -> PlannerResult<Resource> {
        self.store
            .find_resource(id)?
            .ok_or_else(|| PlannerError::not_found("resource", id))
    }

    pub fn daily_capacity(&self, resource: &Resource) -> PlannerResult<f64> {
        self.settings.capacity.hours_for(resource.tier)
    }

    /// Adds a resource; fails if the id is taken.
    pub fn create_resource(&mut self, resource: Resource) -> PlannerResult<Resource> {
        if self.store.find_resource(&resource.id)?.is_some() {
            return Err(PlannerError::Constraint(format!(
                "resource '{}' already exists",
                resource.id
            )));
        }
        self.save_resource(resource)
    }

    /// Inserts or replaces a resource and reschedules the work assigned to it.
    pub fn save_resource(&mut self, resource: Resource) -> PlannerResult<Resource> {
        if resource.id.trim().is_empty() {
            return Err(PlannerError::invalid("id", "resource id is required"));
        }
        self.daily_capacity(&resource)?;
        self.store.upsert_resource(resource.clone())?;
        tracing::info!(resource = %resource.id, tier = %resource.tier, "saved resource");
        self.recompute_for_resource(&resource.id)?;
        Ok(resource)
    }

    pub fn delete_resource(&mut self, id: &str) -> PlannerResult<()> {
        if !self.store.delete_resource(id)? {
            return Err(PlannerError::not_found("resource", id));
        }
        tracing::info!(resource = %id, "deleted resource");
        Ok(())
    }

    /// Returns `false` when the date was already booked.
    pub fn add_pto(&mut self, resource_id: &str, date: NaiveDate) -> PlannerResult<bool> {
        let mut resource = self.resource(resource_id)?;
        if !resource.pto.insert(date) {
            return Ok(false);
        }
        self.save_resource(resource)?;
        Ok(true)
    }

    pub fn remove_pto(&mut self, resource_id: &str, date: NaiveDate) -> PlannerResult<bool> {
        let mut resource = self.resource(resource_id)?;
        if !resource.pto.remove(&date) {
            return Ok(false);
        }
        self.save_resource(resource)?;
        Ok(true)
    }

    pub fn holidays(&self) -> Vec<NaiveDate> {
        self.calendar.holidays()
    }

    pub fn add_holiday(&mut self, date: NaiveDate) -> PlannerResult<bool> {
        let added = self.store.add_holiday(date)?;
        self.calendar.add_holiday(date);
        if added {
            tracing::info!(%date, "added holiday");
            self.refresh()?;
        }
        Ok(added)
    }

    pub fn remove_holiday(&mut self, date: NaiveDate) -> PlannerResult<bool> {
        let removed = self.store.remove_holiday(date)?;
        self.calendar.remove_holiday(date);
        if removed {
            tracing::info!(%date, "removed holiday");
            self.refresh()?;
        }
        Ok(removed)
    }

    pub fn work_items(&self) -> PlannerResult<Vec<WorkItem>> {
        Ok(self.store.list_work_items()?)
    }

    pub fn work_item(&self, id: i32) -> PlannerResult<WorkItem> {
        self.store
            .find_work_item(id)?
            .ok_or_else(|| PlannerError::not_found("work item", id))
    }

    /// End date and status for a draft, without saving anything.
    pub fn forecast(&self, draft: &WorkItemDraft) -> PlannerResult<Forecast> {
        let resource = self.resource(&draft.resource_id)?;
        self.forecast_with(&resource, draft)
    }

    fn forecast_with(&self, resource: &Resource, draft: &WorkItemDraft) -> PlannerResult<Forecast> {
        let daily_capacity = self.daily_capacity(resource)?;
        let expected_end = compute_end_date(
            &self.calendar.for_resource(resource),
            draft.estimated_hours,
            daily_capacity,
            draft.start_date,
        )?;
        let status = classify(
            &self.settings.status,
            expected_end,
            self.reference_date(),
            draft.due_date,
        );
        Ok(Forecast {
            expected_end,
            status,
        })
    }

    pub fn create_work_item(&mut self, draft: WorkItemDraft) -> PlannerResult<WorkItem> {
        let id = self.next_work_item_id()?;
        let name = if draft.name.trim().is_empty() {
            WorkItem::default_name(id)
        } else {
            draft.name.trim().to_string()
        };
        let mut item = WorkItem::new(
            id,
            name,
            draft.estimated_hours,
            draft.resource_id.clone(),
            draft.start_date,
        );
        item.due_date = draft.due_date;
        item.assigned_at = Some(Local::now().naive_local());
        self.apply_forecast(&mut item)?;
        self.store.upsert_work_item(item.clone())?;
        tracing::info!(
            work_item = item.id,
            resource = %item.resource_id,
            expected_end = ?item.expected_end,
            "created work item"
        );
        Ok(item)
    }

    pub fn update_work_item(&mut self, id: i32, draft: WorkItemDraft) -> PlannerResult<WorkItem> {
        let mut item = self.work_item(id)?;
        if item.resource_id != draft.resource_id {
            item.assigned_at = Some(Local::now().naive_local());
        }
        if !draft.name.trim().is_empty() {
            item.name = draft.name.trim().to_string();
        }
        item.estimated_hours = draft.estimated_hours;
        item.resource_id = draft.resource_id;
        item.start_date = draft.start_date;
        item.due_date = draft.due_date;
        self.apply_forecast(&mut item)?;
        self.store.upsert_work_item(item.clone())?;
        tracing::info!(work_item = id, expected_end = ?item.expected_end, "updated work item");
        Ok(item)
    }

    pub fn delete_work_item(&mut self, id: i32) -> PlannerResult<()> {
        if !self.store.delete_work_item(id)? {
            return Err(PlannerError::not_found("work item", id));
        }
        tracing::info!(work_item = id, "deleted work item");
        Ok(())
    }

    /// Free hours per resource in `[start, end]` measured against `estimated_hours`.
    pub fn availability(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        estimated_hours: f64,
    ) -> PlannerResult<Vec<ResourceAvailability>> {
        if start > end {
            return Err(PlannerError::invalid(
                "end",
                format!("window end {end} is before its start {start}"),
            ));
        }
        if !estimated_hours.is_finite() || estimated_hours < 0.0 {
            return Err(PlannerError::invalid(
                "estimated_hours",
                format!("estimate must be a non-negative number of hours (got {estimated_hours})"),
            ));
        }
        self.store
            .list_resources()?
            .into_iter()
            .map(|resource| -> PlannerResult<ResourceAvailability> {
                let hours = available_hours(
                    &self.calendar.for_resource(&resource),
                    self.daily_capacity(&resource)?,
                    start,
                    end,
                );
                Ok(ResourceAvailability {
                    status: assess(&self.settings.availability, hours, estimated_hours),
                    available_hours: hours,
                    resource_id: resource.id,
                    resource_name: resource.name,
                })
            })
            .collect()
    }

    /// Recomputes every stored work item.
    pub fn refresh(&mut self) -> PlannerResult<RefreshSummary> {
        let summary = self.recompute_where(|_| true)?;
        tracing::debug!(summary = %summary.to_cli_summary(), "refreshed work items");
        Ok(summary)
    }

    fn recompute_for_resource(&mut self, resource_id: &str) -> PlannerResult<RefreshSummary> {
        self.recompute_where(|item| item.resource_id == resource_id)
    }

    fn recompute_where<F>(&mut self, predicate: F) -> PlannerResult<RefreshSummary>
    where
        F: Fn(&WorkItem) -> bool,
    {
        let mut summary = RefreshSummary::default();
        for mut item in self.store.list_work_items()? {
            if !predicate(&item) {
                continue;
            }
            let forecast = self.apply_forecast(&mut item)?;
            self.store.upsert_work_item(item)?;
            summary.record(forecast);
        }
        Ok(summary)
    }

    fn apply_forecast(&self, item: &mut WorkItem) -> PlannerResult<Forecast> {
        let resource = self.resource(&item.resource_id)?;
        let forecast = self.forecast_with(&resource, &WorkItemDraft::from(&*item))?;
        item.expected_end = Some(forecast.expected_end);
        item.status = Some(forecast.status);
        Ok(forecast)
    }

    fn next_work_item_id(&self) -> PlannerResult<i32> {
        let max = self
            .store
            .list_work_items()?
            .iter()
            .map(|item| item.id)
            .max()
            .unwrap_or(0);
        max.checked_add(1).ok_or_else(|| {
            PlannerError::Constraint(format!("work item id {max} leaves no room for a new id"))
        })
    }
}
