//! Reporting periods for filtering ledger rows and income statements

use chrono::{Datelike, NaiveDate, Utc};
use ledgerdesk_config::TimeRange;

use crate::models::{JournalEntry, LedgerRow};

/// A named range resolved against a reference day
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    /// Current time range
    pub range: TimeRange,
    /// Custom start date (when range is Custom)
    pub custom_start: Option<NaiveDate>,
    /// Custom end date (when range is Custom)
    pub custom_end: Option<NaiveDate>,
    /// Day the relative ranges are computed from
    pub today: NaiveDate,
}

impl Default for Period {
    fn default() -> Self {
        Self::new(TimeRange::All)
    }
}

impl Period {
    pub fn new(range: TimeRange) -> Self {
        Self {
            range,
            custom_start: None,
            custom_end: None,
            today: Utc::now().date_naive(),
        }
    }

    /// Open-ended bounds are allowed on either side
    pub fn custom(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            range: TimeRange::Custom,
            custom_start: start,
            custom_end: end,
            today: Utc::now().date_naive(),
        }
    }

    /// Pin the reference day
    pub fn as_of(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        let today = self.today;
        match self.range {
            TimeRange::Month => today.with_day(1),
            TimeRange::Quarter => {
                let quarter_start = (today.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(today.year(), quarter_start, 1)
            }
            TimeRange::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1),
            TimeRange::All => None,
            TimeRange::Custom => self.custom_start,
        }
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        let today = self.today;
        match self.range {
            TimeRange::Month => last_day_of_month(today.year(), today.month()),
            TimeRange::Quarter => {
                let quarter_end = (today.month0() / 3) * 3 + 3;
                last_day_of_month(today.year(), quarter_end)
            }
            TimeRange::Year => NaiveDate::from_ymd_opt(today.year(), 12, 31),
            TimeRange::All => None,
            TimeRange::Custom => self.custom_end,
        }
    }

    /// True when neither bound is set
    pub fn is_unbounded(&self) -> bool {
        self.start_date().is_none() && self.end_date().is_none()
    }

    /// Inclusive on both ends
    pub fn contains(&self, date: &NaiveDate) -> bool {
        match (self.start_date(), self.end_date()) {
            (None, None) => true,
            (Some(s), None) => *date >= s,
            (None, Some(e)) => *date <= e,
            (Some(s), Some(e)) => *date >= s && *date <= e,
        }
    }

    /// `from`/`to` query values for the income-statement endpoint
    pub fn query_bounds(&self) -> (Option<String>, Option<String>) {
        let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
        (self.start_date().map(fmt), self.end_date().map(fmt))
    }

    pub fn description(&self) -> String {
        match self.range {
            TimeRange::Month => "Current Month".to_string(),
            TimeRange::Quarter => "Current Quarter".to_string(),
            TimeRange::Year => "Current Year".to_string(),
            TimeRange::All => "All Time".to_string(),
            TimeRange::Custom => match (self.custom_start, self.custom_end) {
                (Some(start), Some(end)) => format!("{} to {}", start, end),
                (Some(start), None) => format!("From {}", start),
                (None, Some(end)) => format!("Until {}", end),
                (None, None) => "Custom Range".to_string(),
            },
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|d| d.pred_opt())
}

/// Filtering by period
pub trait PeriodFilter {
    fn in_period(&self, period: &Period) -> bool;
}

/// Rows whose date cannot be read only pass an unbounded period
fn dated_in_period(date: Option<NaiveDate>, period: &Period) -> bool {
    if period.is_unbounded() {
        return true;
    }
    date.map(|d| period.contains(&d)).unwrap_or(false)
}

impl PeriodFilter for LedgerRow {
    fn in_period(&self, period: &Period) -> bool {
        dated_in_period(self.date_naive(), period)
    }
}

impl PeriodFilter for JournalEntry {
    fn in_period(&self, period: &Period) -> bool {
        dated_in_period(self.date_naive(), period)
    }
}
