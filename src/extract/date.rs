//! Parsing of the human-readable dates shown on message pages
//!
//! Pipermail prints dates in `ctime` style with a zone abbreviation
//! (`Tue Feb  3 10:20:12 EST 2009`); older or hand-edited archives sometimes
//! carry a full RFC 2822 date instead.

use chrono::{DateTime, FixedOffset, Month, NaiveDateTime, TimeZone, Utc};

const HOUR: i32 = 3600;

/// Parse a message date in any of the formats seen in pipermail archives
///
/// Unknown zone abbreviations are treated as UTC.
pub fn parse_sent_date(date_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let mut offset = 0;
    let mut kept = Vec::new();
    for (position, token) in trimmed.split_whitespace().enumerate() {
        if position == 0 && is_day_of_week(token) {
            continue;
        }
        if let Some(zone) = zone_offset(token) {
            offset = zone;
            continue;
        }
        if is_unknown_zone(token) {
            continue;
        }
        kept.push(token);
    }
    let normalized = kept.join(" ");

    let formats = [
        "%b %d %H:%M:%S %Y",
        "%d %b %Y %H:%M:%S",
        "%b %d %Y %H:%M:%S",
        "%d %b %Y %H:%M",
    ];

    for fmt in &formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return FixedOffset::east_opt(offset)?
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }

    tracing::warn!(date = trimmed, "Could not parse message date");
    None
}

fn is_day_of_week(token: &str) -> bool {
    let day = token.trim_end_matches(',').to_ascii_lowercase();
    matches!(
        day.as_str(),
        "mon" | "tue" | "wed" | "thu" | "fri" | "sat" | "sun"
    )
}

/// Alphabetic tokens that are not month names are zone abbreviations
fn is_unknown_zone(token: &str) -> bool {
    token.len() <= 5
        && token.bytes().all(|b| b.is_ascii_alphabetic())
        && token.parse::<Month>().is_err()
}

/// Offset east of UTC in seconds for a zone token, if the token is a zone
fn zone_offset(token: &str) -> Option<i32> {
    let named = match token.to_ascii_uppercase().as_str() {
        "GMT" | "UTC" | "UT" | "Z" | "WET" => Some(0),
        "BST" | "CET" | "MET" | "WEST" => Some(HOUR),
        "CEST" | "MEST" | "EET" => Some(2 * HOUR),
        "EEST" => Some(3 * HOUR),
        "EST" | "CDT" => Some(-5 * HOUR),
        "EDT" => Some(-4 * HOUR),
        "CST" | "MDT" => Some(-6 * HOUR),
        "MST" | "PDT" => Some(-7 * HOUR),
        "PST" => Some(-8 * HOUR),
        "JST" => Some(9 * HOUR),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    // Numeric offsets: +0100, -0500
    let (sign, digits) = match token.as_bytes().first()? {
        b'+' => (1, &token[1..]),
        b'-' => (-1, &token[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    Some(sign * (hours * HOUR + minutes * 60))
}
