//! Simulation calendar.
//!
//! Maps simulated days onto epidemiological weeks:
//! - `EpiWeek`: a validated week number in 1..=52 with wrap-around offsets
//! - `SeasonCalendar`: day index -> fractional week coordinate and date

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EpiError, EpiResult};

/// Number of epidemiological weeks in a season cycle.
pub const WEEKS_PER_YEAR: u32 = 52;

/// Epidemiological week number (1..=52).
///
/// ISO week 53 folds into week 52 so that every season cycle has 52 weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct EpiWeek(u32);

impl EpiWeek {
    /// Create a week number.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `week` is outside 1..=52.
    pub fn new(week: u32) -> EpiResult<Self> {
        if (1..=WEEKS_PER_YEAR).contains(&week) {
            Ok(Self(week))
        } else {
            Err(EpiError::validation(
                "week",
                format!("must be in 1..={WEEKS_PER_YEAR}, got {week}"),
            ))
        }
    }

    /// Week containing the given calendar date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.iso_week().week().min(WEEKS_PER_YEAR))
    }

    /// Week number as an integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Week `n` weeks after this one, wrapping 52 -> 1.
    #[must_use]
    pub const fn offset(self, n: u32) -> Self {
        Self((self.0 - 1 + n % WEEKS_PER_YEAR) % WEEKS_PER_YEAR + 1)
    }
}

impl TryFrom<u32> for EpiWeek {
    type Error = EpiError;

    fn try_from(week: u32) -> Result<Self, Self::Error> {
        Self::new(week)
    }
}

impl From<EpiWeek> for u32 {
    fn from(week: EpiWeek) -> Self {
        week.0
    }
}

impl std::fmt::Display for EpiWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "W{:02}", self.0)
    }
}

/// Calendar anchoring simulated day 0 to a week (and optionally a date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonCalendar {
    /// Week containing day 0.
    start_week: EpiWeek,
    /// Calendar date of day 0, when known.
    start_date: Option<NaiveDate>,
    /// Days between the Monday of `start_week` and day 0.
    #[serde(default)]
    weekday_offset: u32,
}

impl SeasonCalendar {
    /// Calendar starting at the first day of `start_week`.
    #[must_use]
    pub const fn from_week(start_week: EpiWeek) -> Self {
        Self {
            start_week,
            start_date: None,
            weekday_offset: 0,
        }
    }

    /// Calendar starting on a concrete date.
    ///
    /// Week boundaries fall on Mondays, so a mid-week start places day 0
    /// part way into its ISO week.
    #[must_use]
    pub fn from_date(start_date: NaiveDate) -> Self {
        Self {
            start_week: EpiWeek::from_date(start_date),
            start_date: Some(start_date),
            weekday_offset: start_date.weekday().num_days_from_monday(),
        }
    }

    /// Week containing day 0.
    #[must_use]
    pub const fn start_week(&self) -> EpiWeek {
        self.start_week
    }

    /// Date of day 0, if anchored to a date.
    #[must_use]
    pub const fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Continuous week coordinate of `day` in `[0, 52)`.
    ///
    /// Integer part is the zero-based week index, fractional part the
    /// position within that week.
    #[must_use]
    pub fn week_coordinate(&self, day: u32) -> f64 {
        let elapsed = f64::from(day) + f64::from(self.weekday_offset);
        let weeks = f64::from(self.start_week.get() - 1) + elapsed / 7.0;
        weeks.rem_euclid(f64::from(WEEKS_PER_YEAR))
    }

    /// Calendar date of `day`, if anchored to a date.
    #[must_use]
    pub fn date_of_day(&self, day: u32) -> Option<NaiveDate> {
        self.start_date
            .and_then(|d| d.checked_add_signed(Duration::days(i64::from(day))))
    }
}
