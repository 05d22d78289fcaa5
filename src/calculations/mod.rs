pub mod availability;
pub mod end_date;
pub mod status;

pub use availability::{AvailabilityPolicy, AvailabilityStatus, assess, available_hours};
pub use end_date::{EndDatePass, compute_end_date};
pub use status::{Status, StatusPolicy, classify};
