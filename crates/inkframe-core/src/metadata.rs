//! Derived photo metadata: aspect ratio, megapixels, relative age.
//!
//! All functions here are pure and cheap; they run once per resolved photo.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;

/// Common display ratios, checked in order.
const COMMON_RATIOS: &[(u32, u32)] = &[
    (1, 1),
    (4, 3),
    (3, 2),
    (16, 10),
    (5, 3),
    (16, 9),
    (2, 1),
    (21, 9),
    (3, 1),
];

/// Maximum relative error for a common-ratio match.
const RATIO_TOLERANCE: f64 = 0.05;

/// Simplified terms above this are considered unreadable.
const MAX_READABLE_TERM: u64 = 100;

/// Denominators tried when approximating an unreadable ratio.
const APPROX_DENOMINATORS: std::ops::RangeInclusive<u64> = 2..=20;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

/// Photo orientation derived from its dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

/// Classify dimensions as landscape, portrait, or square.
pub fn orientation(width: u32, height: u32) -> Orientation {
    match width.cmp(&height) {
        std::cmp::Ordering::Greater => Orientation::Landscape,
        std::cmp::Ordering::Less => Orientation::Portrait,
        std::cmp::Ordering::Equal => Orientation::Square,
    }
}

/// Describe `width:height` as a short human-readable ratio such as `"16:9"`.
///
/// Resolution order:
/// 1. The first entry of a fixed, ordered table of common ratios within 5%
///    relative error (portrait ratios are matched on their inverse and
///    swapped back).
/// 2. The ratio reduced by the greatest common divisor.
/// 3. If a reduced term is still above 100, the best fraction with a
///    denominator in `2..=20`, itself reduced.
///
/// Zero dimensions yield `"Unknown"`.
pub fn calculate_aspect_ratio(width: u32, height: u32) -> String {
    if width == 0 || height == 0 {
        return "Unknown".to_string();
    }

    let portrait = width < height;
    let ratio = if portrait {
        f64::from(height) / f64::from(width)
    } else {
        f64::from(width) / f64::from(height)
    };

    let format = |a: u64, b: u64| {
        if portrait {
            format!("{b}:{a}")
        } else {
            format!("{a}:{b}")
        }
    };

    if let Some((w, h)) = matching_common_ratio(ratio) {
        return format(u64::from(w), u64::from(h));
    }

    let (long, short) = if portrait {
        (u64::from(height), u64::from(width))
    } else {
        (u64::from(width), u64::from(height))
    };
    let divisor = gcd(long, short);
    let (long, short) = (long / divisor, short / divisor);

    if long <= MAX_READABLE_TERM && short <= MAX_READABLE_TERM {
        return format(long, short);
    }

    let (num, den) = approximate_ratio(ratio);
    format(num, den)
}

/// First common ratio, in table order, within tolerance of `ratio`.
fn matching_common_ratio(ratio: f64) -> Option<(u32, u32)> {
    COMMON_RATIOS.iter().copied().find(|&(w, h)| {
        let target = f64::from(w) / f64::from(h);
        (ratio - target).abs() / target <= RATIO_TOLERANCE
    })
}

/// Best `num/den` approximation of `ratio` over small denominators.
fn approximate_ratio(ratio: f64) -> (u64, u64) {
    let mut best = (ratio.round().max(1.0) as u64, 1);
    let mut best_error = f64::INFINITY;

    for den in APPROX_DENOMINATORS {
        let num = (ratio * den as f64).round().max(1.0) as u64;
        let error = (ratio - num as f64 / den as f64).abs();
        if error < best_error {
            best = (num, den);
            best_error = error;
        }
    }

    let divisor = gcd(best.0, best.1);
    (best.0 / divisor, best.1 / divisor)
}

/// Greatest common divisor (Euclid).
fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Megapixel count rounded to the nearest 0.5.
pub fn calculate_megapixels(width: u32, height: u32) -> f64 {
    let megapixels = f64::from(width) * f64::from(height) / 1_000_000.0;
    (megapixels * 2.0).round() / 2.0
}

/// Human-relative age of a timestamp, e.g. `"3 days ago"`.
pub fn format_relative_date(timestamp: &str) -> String {
    format_relative_date_at(timestamp, Utc::now())
}

/// [`format_relative_date`] against an explicit "now".
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates. Anything else
/// falls back to the first four-digit run in the input, then `"Unknown"`.
pub fn format_relative_date_at(timestamp: &str, now: DateTime<Utc>) -> String {
    let Some(then) = parse_timestamp(timestamp) else {
        return YEAR_RE
            .find(timestamp)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "Unknown".to_string());
    };

    let minutes = (now - then).num_minutes();
    if minutes <= 0 {
        return "Just now".to_string();
    }

    let hours = minutes / 60;
    let days = hours / 24;
    let years = days / 365;
    let months = days / 30;

    if years > 0 {
        ago(years, "year")
    } else if months > 0 {
        ago(months, "month")
    } else if days > 0 {
        ago(days, "day")
    } else if hours > 0 {
        ago(hours, "hour")
    } else {
        ago(minutes, "minute")
    }
}

fn ago(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    let timestamp = timestamp.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render epoch milliseconds as an RFC 3339 UTC timestamp.
pub fn epoch_millis_to_rfc3339(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|ts| ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-19T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn rfc3339(ts: DateTime<Utc>) -> String {
        ts.to_rfc3339()
    }

    #[test]
    fn aspect_ratio_common_landscape() {
        assert_eq!(calculate_aspect_ratio(1920, 1080), "16:9");
        assert_eq!(calculate_aspect_ratio(4032, 3024), "4:3");
        assert_eq!(calculate_aspect_ratio(6000, 4000), "3:2");
        assert_eq!(calculate_aspect_ratio(2560, 1600), "16:10");
    }

    #[test]
    fn aspect_ratio_portrait_is_swapped() {
        assert_eq!(calculate_aspect_ratio(1080, 1920), "9:16");
        assert_eq!(calculate_aspect_ratio(3024, 4032), "3:4");
    }

    #[test]
    fn aspect_ratio_square() {
        assert_eq!(calculate_aspect_ratio(1000, 1000), "1:1");
        assert_eq!(calculate_aspect_ratio(1000, 990), "1:1");
    }

    #[test]
    fn aspect_ratio_first_table_match_wins() {
        // 1.397 is 4.8% from 4:3 and 6.9% from 3:2.
        assert_eq!(calculate_aspect_ratio(5694, 4075), "4:3");
        // 1.74 is within tolerance of both 5:3 and 16:9; 5:3 comes first.
        assert_eq!(calculate_aspect_ratio(1740, 1000), "5:3");
        assert_eq!(calculate_aspect_ratio(1000, 1740), "3:5");
        assert_eq!(calculate_aspect_ratio(1780, 1000), "16:9");
    }

    #[test]
    fn aspect_ratio_falls_back_to_gcd() {
        // 1.25 is outside every table entry's tolerance.
        assert_eq!(calculate_aspect_ratio(1250, 1000), "5:4");
        assert_eq!(calculate_aspect_ratio(1000, 1250), "4:5");
        assert_eq!(calculate_aspect_ratio(4100, 1000), "41:10");
    }

    #[test]
    fn aspect_ratio_approximates_irreducible_pairs() {
        // gcd(1401, 1000) == 1; 1.401 sits just outside the 4:3 tolerance.
        assert_eq!(calculate_aspect_ratio(1401, 1000), "7:5");
        assert_eq!(calculate_aspect_ratio(1000, 1401), "5:7");
        assert_eq!(calculate_aspect_ratio(4099, 1000), "41:10");
    }

    #[test]
    fn aspect_ratio_approximation_is_reduced() {
        assert_eq!(calculate_aspect_ratio(201, 1), "201:1");
        assert_eq!(calculate_aspect_ratio(1001, 100), "10:1");
        assert_eq!(calculate_aspect_ratio(100, 1001), "1:10");
    }

    #[test]
    fn aspect_ratio_zero_dimension() {
        assert_eq!(calculate_aspect_ratio(0, 1080), "Unknown");
        assert_eq!(calculate_aspect_ratio(1920, 0), "Unknown");
    }

    #[test]
    fn gcd_basics() {
        assert_eq!(gcd(1920, 1080), 120);
        assert_eq!(gcd(17, 5), 1);
        assert_eq!(gcd(7, 0), 7);
    }

    #[test]
    fn megapixels_rounds_to_half() {
        assert_eq!(calculate_megapixels(3024, 4032), 12.0);
        assert_eq!(calculate_megapixels(1920, 1080), 2.0);
        assert_eq!(calculate_megapixels(4000, 3000), 12.0);
        assert_eq!(calculate_megapixels(2592, 1944), 5.0);
        assert_eq!(calculate_megapixels(3264, 2448), 8.0);
        assert_eq!(calculate_megapixels(1600, 1600), 2.5);
        assert_eq!(calculate_megapixels(0, 0), 0.0);
    }

    #[test]
    fn orientation_classification() {
        assert_eq!(orientation(1920, 1080), Orientation::Landscape);
        assert_eq!(orientation(1080, 1920), Orientation::Portrait);
        assert_eq!(orientation(500, 500), Orientation::Square);
    }

    #[test]
    fn relative_date_years() {
        let ts = rfc3339(now() - Duration::days(400));
        assert_eq!(format_relative_date_at(&ts, now()), "1 year ago");

        let ts = rfc3339(now() - Duration::days(365 * 3 + 10));
        assert_eq!(format_relative_date_at(&ts, now()), "3 years ago");
    }

    #[test]
    fn relative_date_months_and_days() {
        let ts = rfc3339(now() - Duration::days(45));
        assert_eq!(format_relative_date_at(&ts, now()), "1 month ago");

        let ts = rfc3339(now() - Duration::days(200));
        assert_eq!(format_relative_date_at(&ts, now()), "6 months ago");

        let ts = rfc3339(now() - Duration::days(1));
        assert_eq!(format_relative_date_at(&ts, now()), "1 day ago");

        let ts = rfc3339(now() - Duration::days(29));
        assert_eq!(format_relative_date_at(&ts, now()), "29 days ago");
    }

    #[test]
    fn relative_date_hours_and_minutes() {
        let ts = rfc3339(now() - Duration::hours(5));
        assert_eq!(format_relative_date_at(&ts, now()), "5 hours ago");

        let ts = rfc3339(now() - Duration::minutes(10));
        assert_eq!(format_relative_date_at(&ts, now()), "10 minutes ago");

        let ts = rfc3339(now() - Duration::minutes(1));
        assert_eq!(format_relative_date_at(&ts, now()), "1 minute ago");
    }

    #[test]
    fn relative_date_just_now() {
        let ts = rfc3339(now() - Duration::seconds(30));
        assert_eq!(format_relative_date_at(&ts, now()), "Just now");

        let future = rfc3339(now() + Duration::days(2));
        assert_eq!(format_relative_date_at(&future, now()), "Just now");
    }

    #[test]
    fn relative_date_accepts_bare_dates() {
        assert_eq!(format_relative_date_at("2026-10-09", now()), "10 days ago");
    }

    #[test]
    fn relative_date_unparseable_falls_back_to_year() {
        assert_eq!(format_relative_date_at("sometime in 2019", now()), "2019");
        assert_eq!(format_relative_date_at("2023-13-45T99:00:00Z", now()), "2023");
    }

    #[test]
    fn relative_date_unparseable_without_year() {
        assert_eq!(format_relative_date_at("yesterday", now()), "Unknown");
        assert_eq!(format_relative_date_at("", now()), "Unknown");
    }

    #[test]
    fn epoch_millis_rendering() {
        assert_eq!(
            epoch_millis_to_rfc3339(1_700_000_000_000).as_deref(),
            Some("2023-11-14T22:13:20Z")
        );
    }
}
