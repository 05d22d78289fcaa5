use crate::error::{PlannerError, PlannerResult};
use crate::resource::Resource;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Anything that can answer "can work happen on this date?".
pub trait WorkingDays {
    fn is_working_day(&self, date: NaiveDate) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
}

/// Serialized calendar settings. Deserialization runs the same checks as [`WorkCalendarConfig::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCalendarConfig")]
pub struct WorkCalendarConfig {
    working_days: Vec<Weekday>,
    holidays: Vec<NaiveDate>,
}

#[derive(Deserialize)]
struct RawCalendarConfig {
    working_days: Vec<Weekday>,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
}

impl TryFrom<RawCalendarConfig> for WorkCalendarConfig {
    type Error = PlannerError;

    fn try_from(raw: RawCalendarConfig) -> Result<Self, Self::Error> {
        WorkCalendarConfig::new(raw.working_days, raw.holidays)
    }
}

/// Calendar view for a single resource: company calendar plus that resource's PTO.
#[derive(Debug, Clone, Copy)]
pub struct ResourceCalendar<'a> {
    calendar: &'a WorkCalendar,
    pto: &'a BTreeSet<NaiveDate>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Mon-Fri week with the given holidays.
    pub fn with_holidays<I>(holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            holidays: holidays.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn custom<I, J>(working_days: I, holidays: J) -> PlannerResult<Self>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let config = WorkCalendarConfig::new(working_days, holidays)?;
        Ok(Self::from_config(&config))
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Self {
        let working_set: HashSet<Weekday> = config.working_days.iter().copied().collect();
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working_set.contains(day))
            .collect();

        Self {
            holidays: config.holidays.iter().copied().collect(),
            non_working_days,
        }
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    pub fn add_holiday(&mut self, date: NaiveDate) -> bool {
        self.holidays.insert(date)
    }

    pub fn remove_holiday(&mut self, date: NaiveDate) -> bool {
        self.holidays.remove(&date)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Holidays in ascending order.
    pub fn holidays(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.holidays.iter().copied().collect();
        dates.sort();
        dates
    }

    /// Set custom working days (e.g., Mon-Sat for 6-day weeks)
    pub fn set_working_days(&mut self, days: &[Weekday]) -> PlannerResult<()> {
        if days.is_empty() {
            return Err(PlannerError::invalid(
                "working_days",
                "calendar requires at least one working day",
            ));
        }
        self.non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !days.contains(day))
            .collect();
        Ok(())
    }

    /// Weekend and holiday check.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.non_working_days.contains(&date.weekday())
    }

    pub fn for_resource<'a>(&'a self, resource: &'a Resource) -> ResourceCalendar<'a> {
        ResourceCalendar {
            calendar: self,
            pto: &resource.pto,
        }
    }

    /// First working day on or after `from`.
    pub fn next_working_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        from.iter_days().find(|day| self.is_working_day(*day))
    }

    /// Working days in an inclusive range.
    pub fn working_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        working_days_in_range(self, start, end)
    }

    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        count_working_days(self, start, end) as i64
    }
}

impl WorkingDays for WorkCalendar {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        WorkCalendar::is_working_day(self, date)
    }
}

impl WorkingDays for ResourceCalendar<'_> {
    fn is_working_day(&self, date: NaiveDate) -> bool {
        self.calendar.is_working_day(date) && !self.pto.contains(&date)
    }
}

pub(crate) fn working_days_in_range<C>(calendar: &C, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate>
where
    C: WorkingDays + ?Sized,
{
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| calendar.is_working_day(*day))
        .collect()
}

pub(crate) fn count_working_days<C>(calendar: &C, start: NaiveDate, end: NaiveDate) -> usize
where
    C: WorkingDays + ?Sized,
{
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| calendar.is_working_day(*day))
        .count()
}

impl WorkCalendarConfig {
    pub fn new<I, J>(working_days: I, holidays: J) -> PlannerResult<Self>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        if working.is_empty() {
            return Err(PlannerError::invalid(
                "working_days",
                "calendar requires at least one working day",
            ));
        }
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        let mut holidays: Vec<NaiveDate> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup();

        Ok(Self {
            working_days: working,
            holidays,
        })
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        WorkCalendarConfig::from(&WorkCalendar::default())
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let working_days = WorkCalendar::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !calendar.non_working_days.contains(day))
            .collect();

        Self {
            working_days,
            holidays: calendar.holidays(),
        }
    }
}
