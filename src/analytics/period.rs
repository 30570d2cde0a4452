use chrono::{Days, NaiveDate};
use serde::Serialize;
use thiserror::Error;

/// Wire format for `from_date` / `to_date` query parameters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const FROM_FIELD: &str = "from_date";
pub const TO_FIELD: &str = "to_date";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("Invalid {field}: expected YYYY-MM-DD, got '{value}'")]
    Malformed { field: &'static str, value: String },

    #[error("Missing {field}: from_date and to_date must be supplied together")]
    Missing { field: &'static str },

    #[error("Invalid from_date: {from} is after to_date {to}")]
    Inverted { from: NaiveDate, to: NaiveDate },
}

impl DateRangeError {
    /// Name of the query parameter at fault.
    pub fn field(&self) -> &'static str {
        match self {
            DateRangeError::Malformed { field, .. } | DateRangeError::Missing { field } => field,
            DateRangeError::Inverted { .. } => FROM_FIELD,
        }
    }
}

/// Inclusive calendar period, `from <= to` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, DateRangeError> {
        if from > to {
            return Err(DateRangeError::Inverted { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }

    /// The dashboard default window: `today - window_days ..= today`.
    ///
    /// With the stock 30 day setting this covers 31 calendar days, which is
    /// what existing dashboards expect.
    pub fn ending_on(today: NaiveDate, window_days: u32) -> Self {
        Self {
            from: shift_back(today, i64::from(window_days)),
            to: today,
        }
    }

    /// Builds a range from raw query parameters.
    ///
    /// Both parameters absent means the default window; supplying only one is
    /// rejected so a typo never silently widens the period.
    pub fn resolve(
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
        window_days: u32,
    ) -> Result<Self, DateRangeError> {
        let from = from.map(str::trim).filter(|v| !v.is_empty());
        let to = to.map(str::trim).filter(|v| !v.is_empty());

        match (from, to) {
            (None, None) => Ok(Self::ending_on(today, window_days)),
            (Some(_), None) => Err(DateRangeError::Missing { field: TO_FIELD }),
            (None, Some(_)) => Err(DateRangeError::Missing { field: FROM_FIELD }),
            (Some(from), Some(to)) => {
                let from = parse_date(FROM_FIELD, from)?;
                let to = parse_date(TO_FIELD, to)?;
                Self::new(from, to)
            }
        }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Number of calendar days covered, both ends included.
    pub fn length_days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    /// The equal-length period ending the day before this one starts.
    pub fn previous(&self) -> Self {
        Self {
            from: shift_back(self.from, self.length_days()),
            to: shift_back(self.from, 1),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| DateRangeError::Malformed {
        field,
        value: value.to_string(),
    })
}

// Saturates at the calendar minimum instead of panicking.
fn shift_back(date: NaiveDate, days: i64) -> NaiveDate {
    u64::try_from(days)
        .ok()
        .and_then(|days| date.checked_sub_days(Days::new(days)))
        .unwrap_or(NaiveDate::MIN)
}
