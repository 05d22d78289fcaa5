use crate::capacity::CapacityTier;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A person or team that work items can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique identifier, e.g. a login or team slug.
    pub id: String,
    pub name: String,
    /// Capacity tier; hours per day are looked up in the capacity policy.
    pub tier: CapacityTier,
    /// Days this resource is out of office.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub pto: BTreeSet<NaiveDate>,
}

impl Resource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, tier: CapacityTier) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tier,
            pto: BTreeSet::new(),
        }
    }

    pub fn with_pto<I>(mut self, dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.pto.extend(dates);
        self
    }
}
