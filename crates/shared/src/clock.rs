//! Business-timezone clock.
//!
//! Document years, due dates and subscription expiry are all evaluated in the
//! tenant's business timezone, not in UTC. A clock can be pinned to a fixed
//! date for tests.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::AppError;

/// Resolves "today" and "this year" in the configured timezone.
#[derive(Debug, Clone, Copy)]
pub struct BusinessClock {
    tz: Tz,
    fixed: Option<NaiveDate>,
}

impl BusinessClock {
    /// Creates a clock for an IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the timezone name is unknown.
    pub fn new(timezone: &str) -> Result<Self, AppError> {
        let tz = timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Config(format!("unknown timezone: {timezone}")))?;
        Ok(Self { tz, fixed: None })
    }

    /// Creates a clock that always reports `date` as today.
    #[must_use]
    pub const fn fixed(tz: Tz, date: NaiveDate) -> Self {
        Self {
            tz,
            fixed: Some(date),
        }
    }

    /// The configured timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Today's date in the business timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.fixed
            .unwrap_or_else(|| self.date_of(Utc::now()))
    }

    /// Current calendar year in the business timezone.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.today().year()
    }

    /// Converts an instant to a calendar date in the business timezone.
    #[must_use]
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }
}
