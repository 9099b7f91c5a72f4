//! Preset → calendar date range resolution.
//!
//! All boundaries are civil dates in the configured timezone. "Today" is the
//! date `now` falls on in that zone, not the UTC date, so a late-evening
//! request in America/Buenos_Aires still asks for the local day.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::domain::{DateRange, Preset};
use crate::error::AppError;

/// Timezone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "America/Buenos_Aires";

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz, AppError> {
    let name = name.trim();
    name.parse::<Tz>()
        .map_err(|e| AppError::config(format!("Unknown timezone '{name}': {e}")))
}

/// The civil date `now` falls on in `tz`.
pub fn today_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Resolve a preset into an inclusive date range relative to `now` in `tz`.
pub fn resolve_range(preset: Preset, tz: Tz, now: DateTime<Utc>) -> DateRange {
    let today = today_in(tz, now);

    match preset {
        Preset::Today => DateRange::single(today),
        Preset::Yesterday => {
            // Step back a full day on the instant, then re-project.
            let yesterday = today_in(tz, now - TimeDelta::milliseconds(86_400_000));
            DateRange::single(yesterday)
        }
        Preset::Last7d => trailing_days(today, 7),
        Preset::Last14d => trailing_days(today, 14),
        Preset::Last30d => trailing_days(today, 30),
        Preset::ThisMonth => DateRange::new(first_of_month(today), today),
        Preset::LastMonth => previous_month(today),
        Preset::ThisYear => DateRange::new(first_of_year(today), today),
    }
}

/// Like [`resolve_range`], but from a raw token; unknown tokens resolve as `this_month`.
pub fn resolve_range_token(token: &str, tz: Tz, now: DateTime<Utc>) -> DateRange {
    resolve_range(Preset::from_token_or_default(token), tz, now)
}

/// `n` calendar days ending on (and including) `today`.
fn trailing_days(today: NaiveDate, n: u64) -> DateRange {
    let from = today
        .checked_sub_days(Days::new(n.saturating_sub(1)))
        .unwrap_or(NaiveDate::MIN);
    DateRange::new(from, today)
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn first_of_year(day: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(day.year(), 1, 1).unwrap_or(day)
}

fn previous_month(today: NaiveDate) -> DateRange {
    let first_this = first_of_month(today);
    let last_prev = first_this.pred_opt().unwrap_or(first_this);
    DateRange::new(first_of_month(last_prev), last_prev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ba() -> Tz {
        parse_timezone(DEFAULT_TIMEZONE).unwrap()
    }

    #[test]
    fn today_follows_the_zone_not_utc() {
        // 02:00 UTC on the 1st is still the previous evening in Buenos Aires (UTC-3).
        let now = utc(2025, 3, 1, 2, 0);
        assert_eq!(today_in(ba(), now), date(2025, 2, 28));
        assert_eq!(today_in(chrono_tz::UTC, now), date(2025, 3, 1));
        assert_eq!(resolve_range(Preset::Today, ba(), now), DateRange::single(date(2025, 2, 28)));
    }

    #[test]
    fn yesterday_crosses_month_and_year() {
        let now = utc(2025, 1, 1, 15, 0);
        assert_eq!(
            resolve_range(Preset::Yesterday, ba(), now),
            DateRange::single(date(2024, 12, 31))
        );
    }

    #[test]
    fn last_7d_is_seven_days_ending_today() {
        let tz = ba();
        let now = utc(2025, 3, 3, 12, 0);
        let r = resolve_range(Preset::Last7d, tz, now);
        assert_eq!(r.to, today_in(tz, now));
        assert_eq!(r.days(), 7);
        assert_eq!(r.from, date(2025, 2, 25));
    }

    #[test]
    fn trailing_windows_have_expected_lengths() {
        let now = utc(2025, 6, 10, 12, 0);
        assert_eq!(resolve_range(Preset::Last14d, ba(), now).days(), 14);
        assert_eq!(resolve_range(Preset::Last30d, ba(), now).days(), 30);
    }

    #[test]
    fn last_7d_is_exact_across_dst_shift() {
        // Europe/Berlin springs forward on 2025-03-30.
        let tz = parse_timezone("Europe/Berlin").unwrap();
        let now = utc(2025, 4, 2, 22, 30); // 00:30 local on 04-03
        let r = resolve_range(Preset::Last7d, tz, now);
        assert_eq!(r, DateRange::new(date(2025, 3, 28), date(2025, 4, 3)));
    }

    #[test]
    fn this_month_and_this_year() {
        let now = utc(2025, 8, 20, 12, 0);
        assert_eq!(
            resolve_range(Preset::ThisMonth, ba(), now),
            DateRange::new(date(2025, 8, 1), date(2025, 8, 20))
        );
        assert_eq!(
            resolve_range(Preset::ThisYear, ba(), now),
            DateRange::new(date(2025, 1, 1), date(2025, 8, 20))
        );
    }

    #[test]
    fn last_month_across_year_boundary() {
        let now = utc(2025, 1, 15, 12, 0);
        assert_eq!(
            resolve_range(Preset::LastMonth, ba(), now),
            DateRange::new(date(2024, 12, 1), date(2024, 12, 31))
        );
    }

    #[test]
    fn last_month_handles_every_month_length() {
        let cases = [
            (utc(2024, 3, 10, 12, 0), date(2024, 2, 1), date(2024, 2, 29)),
            (utc(2025, 3, 10, 12, 0), date(2025, 2, 1), date(2025, 2, 28)),
            (utc(2025, 5, 10, 12, 0), date(2025, 4, 1), date(2025, 4, 30)),
            (utc(2025, 8, 10, 12, 0), date(2025, 7, 1), date(2025, 7, 31)),
        ];
        for (now, from, to) in cases {
            assert_eq!(resolve_range(Preset::LastMonth, ba(), now), DateRange::new(from, to));
        }
    }

    #[test]
    fn last_month_is_inside_previous_month_for_eastern_zones() {
        let tz = parse_timezone("Asia/Tokyo").unwrap();
        let now = utc(2025, 10, 5, 3, 0);
        let r = resolve_range(Preset::LastMonth, tz, now);
        assert_eq!(r, DateRange::new(date(2025, 9, 1), date(2025, 9, 30)));
    }

    #[test]
    fn from_never_exceeds_to() {
        let zones = ["America/Buenos_Aires", "UTC", "Asia/Tokyo", "Pacific/Kiritimati", "Pacific/Pago_Pago"];
        let instants = [
            utc(2025, 1, 1, 0, 0),
            utc(2025, 1, 1, 23, 59),
            utc(2024, 2, 29, 12, 0),
            utc(2025, 12, 31, 23, 0),
            utc(2025, 3, 1, 1, 0),
        ];
        for zone in zones {
            let tz = parse_timezone(zone).unwrap();
            for now in instants {
                for p in Preset::ALL {
                    let r = resolve_range(p, tz, now);
                    assert!(r.from <= r.to, "{p} in {zone} at {now}: {r}");
                }
            }
        }
    }

    #[test]
    fn unknown_token_resolves_as_this_month() {
        let now = utc(2025, 8, 20, 12, 0);
        assert_eq!(
            resolve_range_token("last_quarter", ba(), now),
            resolve_range(Preset::ThisMonth, ba(), now)
        );
        assert_eq!(
            resolve_range_token("ayer", ba(), now),
            resolve_range(Preset::Yesterday, ba(), now)
        );
    }

    #[test]
    fn resolution_is_pure() {
        let now = utc(2025, 8, 20, 12, 0);
        for p in Preset::ALL {
            assert_eq!(resolve_range(p, ba(), now), resolve_range(p, ba(), now));
        }
    }

    #[test]
    fn unknown_timezone_is_a_config_error() {
        let err = parse_timezone("Mars/Olympus").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
