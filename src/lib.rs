pub mod calculations;
pub mod calendar;
pub mod capacity;
pub mod config;
pub mod error;
pub mod form;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod planner;
pub mod resource;
pub mod work_item;

pub use calculations::{
    AvailabilityPolicy, AvailabilityStatus, Status, StatusPolicy, classify, compute_end_date,
};
pub use calendar::{WorkCalendar, WorkCalendarConfig, WorkingDays};
pub use capacity::{CapacityPolicy, CapacityTier};
pub use config::{AppConfig, ConfigError, StorageBackend};
pub use error::{PlannerError, PlannerResult};
pub use form::{ResourceForm, WorkItemForm};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    BoxedStore, PersistenceError, SpreadsheetStore, Workbook, WorkloadStore,
    load_workbook_from_json, save_workbook_to_json,
};
pub use planner::{Forecast, Planner, PlannerSettings, RefreshSummary, ResourceAvailability};
pub use resource::Resource;
pub use work_item::{WorkItem, WorkItemDraft};
