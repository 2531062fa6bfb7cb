//! Calendar-day bucketing of lead creation times

use crate::analytics::error::{AnalyticsError, AnalyticsResult};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Write};
use std::str::FromStr;

/// Default label pattern for timeline buckets
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Time zone used to decide which calendar day a timestamp falls on.
///
/// The same snapshot can bucket differently under different zones; `Local`
/// follows the process's ambient zone at the moment of aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BucketZone {
    #[default]
    Local,
    Utc,
    Named(Tz),
}

impl BucketZone {
    /// Calendar day of `timestamp` in this zone
    pub fn day_of(&self, timestamp: &DateTime<Utc>) -> NaiveDate {
        match self {
            BucketZone::Local => timestamp.with_timezone(&Local).date_naive(),
            BucketZone::Utc => timestamp.date_naive(),
            BucketZone::Named(tz) => timestamp.with_timezone(tz).date_naive(),
        }
    }
}

impl FromStr for BucketZone {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(BucketZone::Local);
        }
        if trimmed.eq_ignore_ascii_case("utc") {
            return Ok(BucketZone::Utc);
        }
        Tz::from_str(trimmed)
            .map(BucketZone::Named)
            .map_err(|_| AnalyticsError::InvalidTimeZone(trimmed.to_string()))
    }
}

impl fmt::Display for BucketZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketZone::Local => f.write_str("local"),
            BucketZone::Utc => f.write_str("utc"),
            BucketZone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

/// Number of leads created on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBucket {
    pub date: NaiveDate,
    pub label: String,
    pub count: u64,
}

/// Groups timestamps into calendar-day buckets
#[derive(Debug, Clone)]
pub struct TimelineBucketer {
    zone: BucketZone,
    date_format: String,
}

impl TimelineBucketer {
    /// Build a bucketer, rejecting label patterns chrono cannot render.
    ///
    /// A pattern must render a bare date: time and offset specifiers such as
    /// `%H` or `%Z` are rejected along with malformed ones.
    pub fn new(zone: BucketZone, date_format: impl Into<String>) -> AnalyticsResult<Self> {
        let date_format = date_format.into();
        if StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error)) {
            return Err(AnalyticsError::InvalidDateFormat(date_format));
        }

        let sample = NaiveDate::from_ymd_opt(2000, 1, 1)
            .ok_or_else(|| AnalyticsError::InvalidDateFormat(date_format.clone()))?;
        if render_label(sample, &date_format).is_err() {
            return Err(AnalyticsError::InvalidDateFormat(date_format));
        }

        Ok(Self { zone, date_format })
    }

    pub fn zone(&self) -> BucketZone {
        self.zone
    }

    /// Bucket timestamps by day.
    ///
    /// Buckets come out in the order each day first appears in the input,
    /// so a newest-first snapshot yields a newest-first timeline.
    pub fn bucket<'a, I>(&self, timestamps: I) -> Vec<TimelineBucket>
    where
        I: IntoIterator<Item = &'a DateTime<Utc>>,
    {
        let mut positions: HashMap<NaiveDate, usize> = HashMap::new();
        let mut buckets: Vec<TimelineBucket> = Vec::new();

        for timestamp in timestamps {
            let day = self.zone.day_of(timestamp);
            match positions.get(&day) {
                Some(&pos) => buckets[pos].count += 1,
                None => {
                    positions.insert(day, buckets.len());
                    buckets.push(TimelineBucket {
                        date: day,
                        label: self.label(day),
                        count: 1,
                    });
                }
            }
        }

        buckets
    }

    fn label(&self, day: NaiveDate) -> String {
        // `new` rejects patterns that fail here, so the ISO fallback is never taken
        render_label(day, &self.date_format).unwrap_or_else(|_| day.to_string())
    }
}

/// Render `day` with `pattern`, surfacing chrono's formatting failure
fn render_label(day: NaiveDate, pattern: &str) -> Result<String, fmt::Error> {
    let mut label = String::new();
    write!(label, "{}", day.format(pattern))?;
    Ok(label)
}

impl Default for TimelineBucketer {
    fn default() -> Self {
        Self {
            zone: BucketZone::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}
