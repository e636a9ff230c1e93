//! Uptime normalization shared by the POSIX and Windows detail parsers.

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};

/// Format an elapsed number of seconds with its two largest units.
///
/// `93784` → `1d 2h`, `8100` → `2h 15m`, `330` → `5m 30s`, `45` → `45s`.
pub fn format_uptime(elapsed_secs: u64) -> String {
    let days = elapsed_secs / 86_400;
    let hours = elapsed_secs % 86_400 / 3_600;
    let minutes = elapsed_secs % 3_600 / 60;
    let seconds = elapsed_secs % 60;
    format_clock(days, hours, minutes, seconds)
}

pub(crate) fn format_clock(days: u64, hours: u64, minutes: u64, seconds: u64) -> String {
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Uptime of a process from its WMI `CreationDate`.
///
/// The stamp looks like `20240115103000.123456+060`: fourteen digits of
/// local date-time, a fraction, then the offset from UTC as a signed
/// three-digit minute count. Without an offset the stamp is taken as
/// host-local time; a malformed or out-of-range offset yields `None`. Stamps
/// in the future clamp to `0s`.
pub fn uptime_since(stamp: &str, now: DateTime<Utc>) -> Option<String> {
    let created = parse_creation_date(stamp)?;
    let elapsed = (now - created).num_seconds().max(0) as u64;
    Some(format_uptime(elapsed))
}

fn parse_creation_date(stamp: &str) -> Option<DateTime<Utc>> {
    let stamp = stamp.trim();
    let digits = stamp.get(..14)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S").ok()?;

    let suffix = &stamp[14..];
    match suffix.rfind(['+', '-']) {
        Some(idx) => {
            let minutes = parse_offset(&suffix[idx..])?;
            let utc = naive.checked_sub_signed(Duration::try_minutes(minutes)?)?;
            Some(Utc.from_utc_datetime(&utc))
        }
        None => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc)),
    }
}

/// `+060` → `60`, `-300` → `-300`. Anything but sign + three digits is rejected.
fn parse_offset(offset: &str) -> Option<i64> {
    let digits = offset.get(1..)?;
    if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    offset.parse().ok()
}
