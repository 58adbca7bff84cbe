use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::graph::model::TimelineStatus;

pub const SLIDER_MAX: u8 = 100;
pub const MIN_RANGE_DAYS: i64 = 7;
/// Upper bound for a configured minimum range.
pub const MAX_RANGE_DAYS: i64 = 36_500;
const MS_PER_DAY: f64 = 86_400_000.0;

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` with a `T` or a space
/// (read as UTC) and bare dates. Anything else is an unknown creation time.
pub fn parse_created_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}

/// The historical point the slider is looking at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineWindow {
    pub now: DateTime<Utc>,
    pub oldest: DateTime<Utc>,
    pub range_days: i64,
    pub days_back: f64,
    pub cutoff: DateTime<Utc>,
}

impl TimelineWindow {
    /// `slider` 100 is today, 0 is as far back as the oldest node.
    pub fn compute<'a, I>(created: I, slider: u8, now: DateTime<Utc>, min_range_days: i64) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let slider = slider.min(SLIDER_MAX);
        let oldest = created
            .into_iter()
            .flatten()
            .filter_map(parse_created_at)
            .min()
            .unwrap_or(now);

        let span_days = (now - oldest).num_milliseconds() as f64 / MS_PER_DAY;
        let min_range_days = min_range_days.clamp(1, MAX_RANGE_DAYS);
        let range_days = (span_days.ceil() as i64).max(min_range_days);
        let days_back = range_days as f64 * f64::from(SLIDER_MAX - slider) / 100.0;
        // out-of-range timestamps can push the cutoff past chrono's limits
        let cutoff = Duration::try_milliseconds((days_back * MS_PER_DAY).round() as i64)
            .and_then(|back| now.checked_sub_signed(back))
            .unwrap_or(oldest);

        Self {
            now,
            oldest,
            range_days,
            days_back,
            cutoff,
        }
    }

    /// `New` when the node did not exist yet at the cutoff.
    pub fn status(&self, created_at: Option<&str>) -> TimelineStatus {
        match created_at.and_then(parse_created_at) {
            Some(ts) if ts > self.cutoff => TimelineStatus::New,
            _ => TimelineStatus::Unchanged,
        }
    }

    pub fn label(&self) -> String {
        let days = self.days_back.round() as i64;
        match days {
            0 => "Today".to_string(),
            1 => "1 Day Ago".to_string(),
            d if d < 7 => format!("{d} Days Ago"),
            d if d < 14 => "1 Week Ago".to_string(),
            d if d < 30 => format!("{} Weeks Ago", (d as f64 / 7.0).round() as i64),
            d if d < 60 => "1 Month Ago".to_string(),
            d => format!("{} Months Ago", (d as f64 / 30.0).round() as i64),
        }
    }
}
