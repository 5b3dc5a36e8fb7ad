//! Named analytics time ranges resolved against the local calendar.
//!
//! A [`TimeRangeKey`] names a window ("last quarter", "last 30 days", ...).
//! [`compute_time_range_at`] turns it into concrete start/end instants using
//! calendar components in the time zone of `now`, so month lengths and DST
//! shifts fall out of the calendar instead of fixed millisecond deltas. Each
//! endpoint carries the UTC offset valid at that instant; a window crossing
//! a DST change has different offsets at its two ends.

use crate::config::Config;
use crate::i18n::{LocaleStore, LocaleStrings, SupportedLocale};
use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, Local, LocalResult, NaiveDate,
    NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Range used when neither the URL nor storage names a valid one.
pub const DEFAULT_TIME_RANGE: TimeRangeKey = TimeRangeKey::Last30Days;

/// Client-only storage key for the last selected range.
pub const TIME_RANGE_STORAGE_KEY: &str = "skh_analytics_range";

/// Closed set of named range selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRangeKey {
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "last_90_days")]
    Last90Days,
    #[serde(rename = "last_quarter")]
    LastQuarter,
    #[serde(rename = "this_quarter_to_date")]
    ThisQuarterToDate,
    #[serde(rename = "last_12_months")]
    Last12Months,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown time range key: '{0}'")]
pub struct ParseTimeRangeKeyError(pub String);

impl TimeRangeKey {
    pub const ALL: [TimeRangeKey; 6] = [
        TimeRangeKey::Last7Days,
        TimeRangeKey::Last30Days,
        TimeRangeKey::Last90Days,
        TimeRangeKey::LastQuarter,
        TimeRangeKey::ThisQuarterToDate,
        TimeRangeKey::Last12Months,
    ];

    /// Wire identifier (`last_7_days`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRangeKey::Last7Days => "last_7_days",
            TimeRangeKey::Last30Days => "last_30_days",
            TimeRangeKey::Last90Days => "last_90_days",
            TimeRangeKey::LastQuarter => "last_quarter",
            TimeRangeKey::ThisQuarterToDate => "this_quarter_to_date",
            TimeRangeKey::Last12Months => "last_12_months",
        }
    }

    /// Total parse: `None` for anything outside the closed set.
    pub fn parse(value: Option<&str>) -> Option<TimeRangeKey> {
        let value = value?;
        TimeRangeKey::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
    }

    /// Human label in the given locale.
    pub fn label(&self, locale: SupportedLocale) -> &'static str {
        let strings = LocaleStrings::for_locale(locale);
        match self {
            TimeRangeKey::Last7Days => strings.range_last_7_days,
            TimeRangeKey::Last30Days => strings.range_last_30_days,
            TimeRangeKey::Last90Days => strings.range_last_90_days,
            TimeRangeKey::LastQuarter => strings.range_last_quarter,
            TimeRangeKey::ThisQuarterToDate => strings.range_this_quarter_to_date,
            TimeRangeKey::Last12Months => strings.range_last_12_months,
        }
    }
}

impl fmt::Display for TimeRangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRangeKey {
    type Err = ParseTimeRangeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRangeKey::parse(Some(s)).ok_or_else(|| ParseTimeRangeKeyError(s.to_string()))
    }
}

/// Membership test against the closed set of range keys.
pub fn is_time_range_key(value: Option<&str>) -> bool {
    TimeRangeKey::parse(value).is_some()
}

/// Pick the range to show first: URL value, then stored value, then `default`.
pub fn initial_time_range_key(
    from_url: Option<&str>,
    from_storage: Option<&str>,
    default: TimeRangeKey,
) -> TimeRangeKey {
    TimeRangeKey::parse(from_url)
        .or_else(|| TimeRangeKey::parse(from_storage))
        .unwrap_or(default)
}

/// A range key resolved to concrete instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedRange {
    pub key: TimeRangeKey,
    pub label: &'static str,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// `YYYY-MM-DDTHH:mm:ss±HH:MM` with the offset valid at `start`
    pub start_iso: String,
    /// `YYYY-MM-DDTHH:mm:ss±HH:MM` with the offset valid at `end`
    pub end_iso: String,
    /// Short "start – end" rendering for the range picker
    pub display: String,
}

impl ComputedRange {
    /// Query parameters the analytics endpoints expect.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("range", self.key.as_str().to_string()),
            ("start_date", self.start_iso.clone()),
            ("end_date", self.end_iso.clone()),
        ]
    }

    /// Both endpoints converted to UTC.
    pub fn to_utc(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start.with_timezone(&Utc), self.end.with_timezone(&Utc))
    }

    /// Number of local calendar days covered, both ends inclusive.
    pub fn calendar_days(&self) -> i64 {
        (self.end.date_naive() - self.start.date_naive()).num_days() + 1
    }
}

/// Resolve `key` against the device clock and local time zone.
pub fn compute_time_range(key: TimeRangeKey) -> ComputedRange {
    compute_time_range_at(key, &Local::now())
}

/// Resolve `key` relative to `now`, in `now`'s time zone, with English labels.
pub fn compute_time_range_at<Tz: TimeZone>(key: TimeRangeKey, now: &DateTime<Tz>) -> ComputedRange {
    compute_time_range_localized(key, now, SupportedLocale::English)
}

/// Resolve `key` relative to `now`, rendering label and display in `locale`.
pub fn compute_time_range_localized<Tz: TimeZone>(
    key: TimeRangeKey,
    now: &DateTime<Tz>,
    locale: SupportedLocale,
) -> ComputedRange {
    let tz = now.timezone();
    let today = now.date_naive();

    let (start_date, end_date) = calendar_window(key, today).unwrap_or_else(|| {
        warn!("Calendar overflow resolving {} from {}, using today only", key, today);
        (today, today)
    });

    let start = local_instant(&tz, start_date.and_time(NaiveTime::MIN));
    let end = local_instant(&tz, end_of_day(end_date));

    let strings = LocaleStrings::for_locale(locale);
    let display = format!(
        "{} – {}",
        strings.short_date(start.month(), start.day()),
        strings.short_date(end.month(), end.day())
    );

    debug!("Resolved {} to {} .. {}", key, start, end);

    ComputedRange {
        key,
        label: key.label(locale),
        start_iso: iso_with_offset(&start),
        end_iso: iso_with_offset(&end),
        start,
        end,
        display,
    }
}

/// First and last local calendar day of the window.
fn calendar_window(key: TimeRangeKey, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    match key {
        TimeRangeKey::Last7Days => Some((days_back(today, 7)?, today)),
        TimeRangeKey::Last30Days => Some((days_back(today, 30)?, today)),
        TimeRangeKey::Last90Days => Some((days_back(today, 90)?, today)),
        TimeRangeKey::LastQuarter => {
            let quarter = quarter_index(today.month0());
            let (year, previous) = if quarter == 0 {
                (today.year() - 1, 3)
            } else {
                (today.year(), quarter - 1)
            };
            Some((quarter_start(year, previous)?, quarter_end(year, previous)?))
        }
        TimeRangeKey::ThisQuarterToDate => {
            let quarter = quarter_index(today.month0());
            Some((quarter_start(today.year(), quarter)?, today))
        }
        TimeRangeKey::Last12Months => {
            // Same day a year earlier; 29 Feb rolls over to 1 Mar.
            let start = NaiveDate::from_ymd_opt(today.year() - 1, today.month(), 1)?
                .checked_add_days(Days::new(u64::from(today.day0())))?;
            Some((start, today))
        }
    }
}

/// Start day of an inclusive window of `days` calendar days ending `today`.
fn days_back(today: NaiveDate, days: u64) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(days - 1))
}

fn quarter_index(month0: u32) -> u32 {
    month0 / 3
}

fn quarter_start(year: i32, quarter: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, quarter * 3 + 1, 1)
}

fn quarter_end(year: i32, quarter: u32) -> Option<NaiveDate> {
    let next_start = if quarter == 3 {
        quarter_start(year + 1, 0)?
    } else {
        quarter_start(year, quarter + 1)?
    };
    next_start.pred_opt()
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

/// Map a local wall-clock time to an instant in `tz`.
///
/// Ambiguous times (DST overlap) take the earlier instant. Non-existent
/// times (DST gap) are read with the offset in force before the gap, which
/// lands the same distance past the transition.
fn local_instant<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<FixedOffset> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => with_fixed_offset(&dt),
        LocalResult::Ambiguous(earliest, _) => with_fixed_offset(&earliest),
        LocalResult::None => {
            let before = naive
                .checked_sub_signed(Duration::days(1))
                .and_then(|day_before| tz.from_local_datetime(&day_before).earliest());
            let utc = before.and_then(|dt| {
                let offset = dt.offset().fix().local_minus_utc();
                naive.checked_sub_signed(Duration::seconds(i64::from(offset)))
            });
            with_fixed_offset(&tz.from_utc_datetime(&utc.unwrap_or(naive)))
        }
    }
}

fn with_fixed_offset<Tz: TimeZone>(dt: &DateTime<Tz>) -> DateTime<FixedOffset> {
    dt.with_timezone(&dt.offset().fix())
}

/// `YYYY-MM-DDTHH:mm:ss±HH:MM`, seconds precision.
fn iso_with_offset(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Remembers the last selected range in the client-only channel.
#[derive(Debug)]
pub struct TimeRangePreference<S> {
    store: S,
    storage_key: String,
    default: TimeRangeKey,
}

impl<S: LocaleStore> TimeRangePreference<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            storage_key: config.time_range_storage_key.clone(),
            default: config.default_time_range,
        }
    }

    /// Scope the stored key to one user (`{key}_{user}`, `anon` when signed out).
    pub fn for_user(mut self, user_id: Option<&str>) -> Self {
        self.storage_key = format!("{}_{}", self.storage_key, user_id.unwrap_or("anon"));
        self
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Stored key, if present and valid.
    pub fn read(&self) -> Option<TimeRangeKey> {
        match self.store.get_item(&self.storage_key) {
            Ok(value) => TimeRangeKey::parse(value.as_deref()),
            Err(e) => {
                warn!("Ignoring unreadable time range {}: {}", self.storage_key, e);
                None
            }
        }
    }

    /// Store the selected key; failures are logged and dropped.
    pub fn write(&self, key: TimeRangeKey) {
        if let Err(e) = self.store.set_item(&self.storage_key, key.as_str()) {
            warn!("Failed to store time range {} in {}: {}", key, self.storage_key, e);
        }
    }

    /// Initial selection: URL query value, stored value, configured default.
    pub fn initial(&self, from_url: Option<&str>) -> TimeRangeKey {
        TimeRangeKey::parse(from_url)
            .or_else(|| self.read())
            .unwrap_or(self.default)
    }
}
