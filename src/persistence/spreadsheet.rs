use super::{PersistenceError, PersistenceResult, Workbook, WorkloadStore};
use crate::{CapacityTier, Resource, Status, WorkItem};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const RESOURCE_SHEET: &str = "resources.csv";
const PTO_SHEET: &str = "pto.csv";
const HOLIDAY_SHEET: &str = "holidays.csv";
const WORK_ITEM_SHEET: &str = "work_items.csv";

const RESOURCE_HEADERS: [&str; 3] = ["resource_id", "resource_name", "tier"];
const PTO_HEADERS: [&str; 2] = ["resource_id", "pto_date"];
const HOLIDAY_HEADERS: [&str; 1] = ["holiday_date"];
const WORK_ITEM_HEADERS: [&str; 9] = [
    "work_id",
    "name",
    "estimated_hours",
    "resource_id",
    "start_date",
    "due_date",
    "expected_end",
    "status",
    "assigned_at",
];

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Spreadsheet persistence: one CSV sheet per record kind inside a data directory.
///
/// Every write rewrites all sheets from the in-memory [`Workbook`].
pub struct SpreadsheetStore {
    dir: PathBuf,
    workbook: Workbook,
}

impl SpreadsheetStore {
    /// Opens the sheets in `dir`, creating the directory and empty sheets if missing.
    pub fn open<P: AsRef<Path>>(dir: P) -> PersistenceResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let mut store = Self {
            dir,
            workbook: Workbook::new(),
        };
        store.ensure_sheets()?;
        store.workbook = store.read_workbook()?;
        tracing::debug!(
            dir = %store.dir.display(),
            resources = store.workbook.resources().len(),
            work_items = store.workbook.work_items().len(),
            "opened spreadsheet store"
        );
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    fn sheet(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn ensure_sheets(&self) -> PersistenceResult<()> {
        let sheets: [(&str, &[&str]); 4] = [
            (RESOURCE_SHEET, &RESOURCE_HEADERS),
            (PTO_SHEET, &PTO_HEADERS),
            (HOLIDAY_SHEET, &HOLIDAY_HEADERS),
            (WORK_ITEM_SHEET, &WORK_ITEM_HEADERS),
        ];
        for (name, headers) in sheets {
            let path = self.sheet(name);
            if !path.exists() {
                write_sheet::<ResourceRow>(&path, headers, &[])?;
            }
        }
        Ok(())
    }

    fn read_workbook(&self) -> PersistenceResult<Workbook> {
        let mut pto: BTreeMap<String, Vec<NaiveDate>> = BTreeMap::new();
        for row in read_sheet::<PtoRow>(&self.sheet(PTO_SHEET))? {
            let date = parse_required_date(&row.pto_date)?;
            pto.entry(row.resource_id.trim().to_string())
                .or_default()
                .push(date);
        }

        let mut resources = Vec::new();
        for row in read_sheet::<ResourceRow>(&self.sheet(RESOURCE_SHEET))? {
            let mut resource = row.into_resource()?;
            if let Some(dates) = pto.remove(&resource.id) {
                resource.pto.extend(dates);
            }
            resources.push(resource);
        }
        if let Some(orphan) = pto.keys().next() {
            return Err(PersistenceError::InvalidData(format!(
                "PTO sheet references unknown resource '{orphan}'"
            )));
        }

        let mut holidays = Vec::new();
        for row in read_sheet::<HolidayRow>(&self.sheet(HOLIDAY_SHEET))? {
            holidays.push(parse_required_date(&row.holiday_date)?);
        }

        let mut work_items = Vec::new();
        for row in read_sheet::<WorkItemRow>(&self.sheet(WORK_ITEM_SHEET))? {
            work_items.push(row.into_work_item()?);
        }

        Workbook::from_parts(resources, work_items, holidays)
    }

    fn write_workbook(&self) -> PersistenceResult<()> {
        let resources: Vec<ResourceRow> = self
            .workbook
            .resources()
            .iter()
            .map(ResourceRow::from)
            .collect();
        let pto: Vec<PtoRow> = self
            .workbook
            .resources()
            .iter()
            .flat_map(|resource| {
                resource.pto.iter().map(move |date| PtoRow {
                    resource_id: resource.id.clone(),
                    pto_date: format_date(Some(*date)),
                })
            })
            .collect();
        let holidays: Vec<HolidayRow> = self
            .workbook
            .holidays()
            .iter()
            .map(|date| HolidayRow {
                holiday_date: format_date(Some(*date)),
            })
            .collect();
        let work_items: Vec<WorkItemRow> = self
            .workbook
            .work_items()
            .iter()
            .map(WorkItemRow::from)
            .collect();

        write_sheet(&self.sheet(RESOURCE_SHEET), &RESOURCE_HEADERS, &resources)?;
        write_sheet(&self.sheet(PTO_SHEET), &PTO_HEADERS, &pto)?;
        write_sheet(&self.sheet(HOLIDAY_SHEET), &HOLIDAY_HEADERS, &holidays)?;
        write_sheet(&self.sheet(WORK_ITEM_SHEET), &WORK_ITEM_HEADERS, &work_items)?;
        tracing::debug!(dir = %self.dir.display(), "saved spreadsheet store");
        Ok(())
    }

    /// Applies a change to the workbook and persists it; the workbook is left
    /// untouched when the change itself fails.
    fn commit<T, F>(&mut self, change: F) -> PersistenceResult<T>
    where
        F: FnOnce(&mut Workbook) -> PersistenceResult<T>,
    {
        let mut next = self.workbook.clone();
        let outcome = change(&mut next)?;
        let previous = std::mem::replace(&mut self.workbook, next);
        if let Err(err) = self.write_workbook() {
            self.workbook = previous;
            return Err(err);
        }
        Ok(outcome)
    }
}

impl WorkloadStore for SpreadsheetStore {
    fn list_resources(&self) -> PersistenceResult<Vec<Resource>> {
        self.workbook.list_resources()
    }

    fn find_resource(&self, id: &str) -> PersistenceResult<Option<Resource>> {
        self.workbook.find_resource(id)
    }

    fn upsert_resource(&mut self, resource: Resource) -> PersistenceResult<()> {
        self.commit(|wb| wb.upsert_resource(resource))
    }

    fn delete_resource(&mut self, id: &str) -> PersistenceResult<bool> {
        self.commit(|wb| wb.delete_resource(id))
    }

    fn list_work_items(&self) -> PersistenceResult<Vec<WorkItem>> {
        self.workbook.list_work_items()
    }

    fn find_work_item(&self, id: i32) -> PersistenceResult<Option<WorkItem>> {
        self.workbook.find_work_item(id)
    }

    fn upsert_work_item(&mut self, item: WorkItem) -> PersistenceResult<()> {
        self.commit(|wb| wb.upsert_work_item(item))
    }

    fn delete_work_item(&mut self, id: i32) -> PersistenceResult<bool> {
        self.commit(|wb| wb.delete_work_item(id))
    }

    fn list_holidays(&self) -> PersistenceResult<Vec<NaiveDate>> {
        self.workbook.list_holidays()
    }

    fn add_holiday(&mut self, date: NaiveDate) -> PersistenceResult<bool> {
        self.commit(|wb| wb.add_holiday(date))
    }

    fn remove_holiday(&mut self, date: NaiveDate) -> PersistenceResult<bool> {
        self.commit(|wb| wb.remove_holiday(date))
    }
}

#[derive(Default, Serialize, Deserialize)]
struct ResourceRow {
    resource_id: String,
    resource_name: String,
    tier: String,
}

impl From<&Resource> for ResourceRow {
    fn from(resource: &Resource) -> Self {
        Self {
            resource_id: resource.id.clone(),
            resource_name: resource.name.clone(),
            tier: resource.tier.as_str().to_string(),
        }
    }
}

impl ResourceRow {
    fn into_resource(self) -> PersistenceResult<Resource> {
        let tier = CapacityTier::from_str(&self.tier).map_err(|_| {
            PersistenceError::InvalidData(format!(
                "resource '{}' has invalid tier '{}'",
                self.resource_id, self.tier
            ))
        })?;
        Ok(Resource::new(
            self.resource_id.trim(),
            self.resource_name,
            tier,
        ))
    }
}

#[derive(Serialize, Deserialize)]
struct PtoRow {
    resource_id: String,
    pto_date: String,
}

#[derive(Serialize, Deserialize)]
struct HolidayRow {
    holiday_date: String,
}

#[derive(Default, Serialize, Deserialize)]
struct WorkItemRow {
    work_id: i32,
    name: String,
    estimated_hours: f64,
    resource_id: String,
    start_date: String,
    due_date: String,
    expected_end: String,
    status: String,
    assigned_at: String,
}

impl From<&WorkItem> for WorkItemRow {
    fn from(item: &WorkItem) -> Self {
        Self {
            work_id: item.id,
            name: item.name.clone(),
            estimated_hours: item.estimated_hours,
            resource_id: item.resource_id.clone(),
            start_date: format_date(Some(item.start_date)),
            due_date: format_date(item.due_date),
            expected_end: format_date(item.expected_end),
            status: item
                .status
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            assigned_at: item
                .assigned_at
                .map(|dt| dt.format(DATETIME_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }
}

impl WorkItemRow {
    fn into_work_item(self) -> PersistenceResult<WorkItem> {
        let mut item = WorkItem::new(
            self.work_id,
            self.name,
            self.estimated_hours,
            self.resource_id.trim(),
            parse_required_date(&self.start_date)?,
        );
        item.due_date = parse_date(&self.due_date)?;
        item.expected_end = parse_date(&self.expected_end)?;
        item.status = if self.status.trim().is_empty() {
            None
        } else {
            Some(Status::from_str(&self.status).map_err(|_| {
                PersistenceError::InvalidData(format!(
                    "work item {} has invalid status '{}'",
                    self.work_id, self.status
                ))
            })?)
        };
        item.assigned_at = parse_datetime(&self.assigned_at)?;
        Ok(item)
    }
}

fn read_sheet<T>(path: &Path) -> PersistenceResult<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for row in reader.deserialize::<T>() {
        rows.push(row?);
    }
    Ok(rows)
}

fn write_sheet<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_required_date(input: &str) -> PersistenceResult<NaiveDate> {
    parse_date(input)?
        .ok_or_else(|| PersistenceError::InvalidData("missing required date".into()))
}

fn parse_datetime(input: &str) -> PersistenceResult<Option<NaiveDateTime>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(input.trim(), DATETIME_FORMAT)
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid timestamp '{input}': {e}")))
}
