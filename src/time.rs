//! # Time handling for sample and data points
//!
//! Point times are carried as **fractional days** so that time separations are plain
//! differences. This module converts calendar epochs into that representation and parses
//! human-written time deltas (the `t_sep` rule of a separation constraint) into days.
//!
//! Accepted delta formats
//! -----------------
//! * A bare number of days: `"1.5"`.
//! * The compact calendar form `[Ny][Nm][Nd][T[NH][NM][NS]]`, e.g. `"1y2m"`, `"3dT12H"`,
//!   `"T30M"`. Lower-case `m` is a month, upper-case `M` a minute. A year is
//!   [`DAYS_PER_YEAR`] days and a month a twelfth of it.
//! * Any duration understood by [`hifitime::Duration`]'s parser, e.g. `"6 h"`,
//!   `"1 d 30 min"`.
use std::str::FromStr;
use std::sync::LazyLock;

use hifitime::{Duration, Epoch};
use regex::Regex;

use crate::colocation_errors::ColocationError;
use crate::constants::{Days, DAYS_PER_MONTH, DAYS_PER_YEAR, SECONDS_PER_DAY};

static CALENDAR_DELTA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<y>\d+(?:\.\d*)?)y)?(?:(?P<mo>\d+(?:\.\d*)?)m)?(?:(?P<d>\d+(?:\.\d*)?)d)?(?:T(?:(?P<h>\d+(?:\.\d*)?)H)?(?:(?P<mi>\d+(?:\.\d*)?)M)?(?:(?P<s>\d+(?:\.\d*)?)S)?)?$",
    )
    .expect("calendar delta pattern is valid")
});

/// Convert an epoch to fractional days (Modified Julian Date, UTC).
///
/// Arguments
/// -----------------
/// * `epoch`: the epoch to convert.
///
/// Return
/// ----------
/// * The MJD of `epoch` in the UTC time scale.
pub fn epoch_to_days(epoch: Epoch) -> Days {
    epoch.to_mjd_utc_days()
}

/// Parse a calendar date string (anything [`Epoch`] can parse) into fractional days.
///
/// Return
/// ----------
/// * The MJD (UTC) of the date, or [`ColocationError::InvalidTimeDelta`] when the date
///   cannot be parsed.
pub fn date_to_days(date: &str) -> Result<Days, ColocationError> {
    Epoch::from_str(date.trim())
        .map(epoch_to_days)
        .map_err(|e| ColocationError::InvalidTimeDelta(format!("'{date}' is not a valid date: {e}")))
}

fn parse_calendar_delta(delta: &str) -> Option<Days> {
    let caps = CALENDAR_DELTA.captures(delta)?;

    let factors = [
        ("y", DAYS_PER_YEAR),
        ("mo", DAYS_PER_MONTH),
        ("d", 1.0),
        ("h", 1.0 / 24.0),
        ("mi", 1.0 / 1440.0),
        ("s", 1.0 / SECONDS_PER_DAY),
    ];

    let mut matched = false;
    let mut days = 0.0;
    for (group, factor) in factors {
        if let Some(m) = caps.name(group) {
            days += m.as_str().parse::<f64>().ok()? * factor;
            matched = true;
        }
    }

    // The pattern also matches "" and a lone "T"
    matched.then_some(days)
}

/// Parse a human-written time delta into fractional days.
///
/// Arguments
/// -----------------
/// * `delta`: the delta string, see the module documentation for the accepted formats.
///
/// Return
/// ----------
/// * The delta in days.
///
/// Errors
/// ----------
/// * [`ColocationError::InvalidTimeDelta`] if no format matches, or if the result is negative
///   or not finite.
pub fn parse_time_delta_to_days(delta: &str) -> Result<Days, ColocationError> {
    let trimmed = delta.trim();

    let days = if let Ok(days) = trimmed.parse::<f64>() {
        days
    } else if let Some(days) = parse_calendar_delta(trimmed) {
        days
    } else {
        Duration::from_str(trimmed)
            .map(|d| d.to_seconds() / SECONDS_PER_DAY)
            .map_err(|e| {
                ColocationError::InvalidTimeDelta(format!("'{delta}' is not a valid time delta: {e}"))
            })?
    };

    if !days.is_finite() || days < 0.0 {
        return Err(ColocationError::InvalidTimeDelta(format!(
            "'{delta}' must be a finite, non-negative duration"
        )));
    }
    Ok(days)
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plain_number_of_days() {
        assert_eq!(parse_time_delta_to_days("1.5").unwrap(), 1.5);
        assert_eq!(parse_time_delta_to_days(" 2 ").unwrap(), 2.0);
    }

    #[test]
    fn test_calendar_delta() {
        assert_relative_eq!(parse_time_delta_to_days("1d").unwrap(), 1.0);
        assert_relative_eq!(parse_time_delta_to_days("T12H").unwrap(), 0.5);
        assert_relative_eq!(parse_time_delta_to_days("1dT6H").unwrap(), 1.25);
        assert_relative_eq!(parse_time_delta_to_days("T30M").unwrap(), 30.0 / 1440.0);
        assert_relative_eq!(parse_time_delta_to_days("1m").unwrap(), DAYS_PER_MONTH);
        assert_relative_eq!(
            parse_time_delta_to_days("1y2m").unwrap(),
            DAYS_PER_YEAR + 2.0 * DAYS_PER_MONTH
        );
    }

    #[test]
    fn test_hifitime_delta() {
        assert_relative_eq!(
            parse_time_delta_to_days("6 h").unwrap(),
            0.25,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_invalid_delta() {
        assert!(matches!(
            parse_time_delta_to_days("not a delta"),
            Err(ColocationError::InvalidTimeDelta(_))
        ));
        assert!(parse_time_delta_to_days("").is_err());
        assert!(parse_time_delta_to_days("T").is_err());
        assert!(parse_time_delta_to_days("-1").is_err());
        assert!(parse_time_delta_to_days("NaN").is_err());
    }

    #[test]
    fn test_epoch_to_days() {
        let epoch = Epoch::from_gregorian_utc_at_midnight(2000, 1, 1);
        assert_relative_eq!(epoch_to_days(epoch), 51544.0, epsilon = 1e-9);
        assert_relative_eq!(
            date_to_days("2000-01-02T12:00:00 UTC").unwrap(),
            51545.5,
            epsilon = 1e-9
        );
        assert!(date_to_days("yesterday").is_err());
    }
}
