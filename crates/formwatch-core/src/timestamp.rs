//! Submission timestamp parsing.
//!
//! Form exports write the submission time in the spreadsheet locale. The
//! accepted shapes are
//!
//! - `2024년 3월 14일 오후 2:30:45`
//! - `2025. 6. 12 오전 2:26:19` and `2025. 6. 12 02:26:19`
//! - `2025-06-12 14:26:19`
//!
//! All of them are wall-clock times in KST.

use crate::errors::FormwatchError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};

/// KST is UTC+09:00 with no daylight saving
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Parse a form submission timestamp into a KST datetime.
///
/// `오후` adds twelve hours except at 12, `오전 12` is midnight. Seconds may
/// be omitted.
///
/// # Errors
///
/// Returns `FormwatchError::InvalidTimestamp` if the input matches none of
/// the accepted shapes or names an impossible date or time.
pub fn parse_submission_timestamp(input: &str) -> Result<DateTime<FixedOffset>, FormwatchError> {
    let invalid = |reason: &str| FormwatchError::InvalidTimestamp {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty timestamp"));
    }

    let mut meridiem = None;
    let mut time_token = None;
    let mut date_fields: Vec<u32> = Vec::with_capacity(3);

    for token in trimmed.split_whitespace() {
        match token {
            "오전" => meridiem = Some(Meridiem::Am),
            "오후" => meridiem = Some(Meridiem::Pm),
            t if t.contains(':') => {
                if time_token.replace(t).is_some() {
                    return Err(invalid("more than one time component"));
                }
            }
            t => {
                let stripped = t.trim_end_matches(['년', '월', '일', '.']);
                for piece in stripped.split(['-', '.']).filter(|p| !p.is_empty()) {
                    let value = piece
                        .parse::<u32>()
                        .map_err(|_| invalid("unrecognised date component"))?;
                    date_fields.push(value);
                }
            }
        }
    }

    let [year, month, day] = date_fields[..] else {
        return Err(invalid("expected year, month and day"));
    };
    let year = i32::try_from(year).map_err(|_| invalid("year out of range"))?;
    let date =
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| invalid("no such calendar date"))?;

    let time_token = time_token.ok_or_else(|| invalid("missing time of day"))?;
    let parts = time_token
        .split(':')
        .map(|p| p.parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid("unrecognised time component"))?;
    let (hour, minute, second) = match parts[..] {
        [h, m] => (h, m, 0),
        [h, m, s] => (h, m, s),
        _ => return Err(invalid("expected H:MM or H:MM:SS")),
    };

    let hour = match meridiem {
        Some(_) if hour == 0 || hour > 12 => {
            return Err(invalid("12-hour clock hour must be between 1 and 12"))
        }
        Some(Meridiem::Pm) if hour < 12 => hour + 12,
        Some(Meridiem::Am) if hour == 12 => 0,
        _ => hour,
    };
    let time = NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| invalid("no such time of day"))?;

    let kst = FixedOffset::east_opt(KST_OFFSET_SECS).ok_or_else(|| invalid("bad offset"))?;
    kst.from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| invalid("ambiguous local time"))
}
