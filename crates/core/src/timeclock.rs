//! Timezone-sensitive schedule validation.
//!
//! All comparisons are done on the calendar date and on integer
//! minutes-since-midnight as seen in the sender's selected IANA zone.
//! Comparing instants directly would silently shift the calendar day for
//! senders whose zone disagrees with the server clock, and goes wrong
//! around DST transitions.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::errors::{ScheduleFieldErrors, SpeakError};
use crate::models::request::{MAX_SCHEDULE_MESSAGE_LEN, ScheduleSessionRequest};

/// Resolves an IANA zone name, e.g. "America/New_York".
pub fn parse_zone(name: &str) -> Result<Tz, SpeakError> {
    name.parse()
        .map_err(|_| SpeakError::Validation(format!("Unknown timezone: {name}")))
}

/// The calendar date at `now`, as seen in `tz`.
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Wall-clock minutes since midnight at `now`, as seen in `tz`.
pub fn minutes_since_midnight(now: DateTime<Utc>, tz: Tz) -> u32 {
    let t = now.with_timezone(&tz).time();
    t.hour() * 60 + t.minute()
}

/// A submission that passed validation, with the combined zone-local
/// date+time resolved to a UTC instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidSchedule {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub scheduled_at: DateTime<Utc>,
}

/// Validates a schedule submission against `now`.
///
/// Rules, evaluated in the selected zone:
/// - date is required and must be today or later;
/// - hour and minute are both required;
/// - a same-day submission must be strictly later than the current
///   wall-clock time;
/// - the optional message is capped at [`MAX_SCHEDULE_MESSAGE_LEN`] chars.
///
/// Date and time problems are reported as separate fields via
/// [`SpeakError::Schedule`].
pub fn validate_submission(
    req: &ScheduleSessionRequest,
    now: DateTime<Utc>,
) -> Result<ValidSchedule, SpeakError> {
    let tz = parse_zone(&req.timezone)?;

    if let Some(message) = &req.message {
        if message.chars().count() > MAX_SCHEDULE_MESSAGE_LEN {
            return Err(SpeakError::Validation(format!(
                "Message must be at most {MAX_SCHEDULE_MESSAGE_LEN} characters"
            )));
        }
    }

    let mut errors = ScheduleFieldErrors::default();

    if req.date.is_none() {
        errors.date = Some("Please select a date".to_string());
    }
    match (req.hour, req.minute) {
        (Some(h), Some(m)) if h > 23 || m > 59 => {
            errors.time = Some("Invalid time of day".to_string());
        }
        (Some(_), Some(_)) => {}
        _ => errors.time = Some("Please select a time".to_string()),
    }

    if let Some(date) = req.date {
        let today = local_date(now, tz);
        if date < today {
            errors.date = Some("Scheduled date cannot be in the past".to_string());
        } else if date == today && errors.time.is_none() {
            // Compare as integer minutes in the selected zone, not as
            // instants.
            let requested = req.hour.unwrap_or(0) * 60 + req.minute.unwrap_or(0);
            if requested <= minutes_since_midnight(now, tz) {
                errors.time =
                    Some("Scheduled time must be later than the current time".to_string());
            }
        }
    }

    if !errors.is_empty() {
        return Err(SpeakError::Schedule(errors));
    }

    let (hour, minute) = (req.hour.unwrap_or(0), req.minute.unwrap_or(0));
    let date = req.date.unwrap_or_else(|| local_date(now, tz));
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| SpeakError::Validation("Invalid time of day".to_string()))?;

    let scheduled_at = match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        // A clock rolled back by DST names this local time twice; take the
        // earlier instant.
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            return Err(SpeakError::Validation(format!(
                "{date} {time} does not exist in {tz}"
            )));
        }
    };

    Ok(ValidSchedule {
        date,
        time,
        scheduled_at,
    })
}
