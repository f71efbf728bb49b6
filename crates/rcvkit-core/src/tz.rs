//! Temporal normalization for the canonical business zone.
//!
//! Every business timestamp in the RCV domain must be expressed in
//! `America/Santiago`, which observes daylight-saving transitions. The
//! checks here compare zone *identity*, never the UTC offset of a
//! particular instant: a UTC-tagged timestamp is rejected even on a
//! date where offsets happen to line up.
//!
//! Attaching a zone takes a [`NaiveDateTime`], so "the input is already
//! aware" is unrepresentable; that branch of the contract is discharged
//! by the type system.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

/// The canonical business time zone for RCV data.
pub const CANONICAL_TZ: Tz = chrono_tz::America::Santiago;

/// Errors from zone attachment and zone-identity checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TzError {
    /// The wall-clock time falls in a spring-forward gap of the zone.
    #[error("local time {naive} does not exist in zone {tz}")]
    NonexistentLocalTime {
        /// The naive wall-clock time.
        naive: NaiveDateTime,
        /// The zone that has no such local time.
        tz: Tz,
    },
    /// The timestamp carries a different named zone than required.
    #[error("timestamp zone is '{actual}', required '{required}'")]
    WrongZone {
        /// The zone the timestamp must carry.
        required: Tz,
        /// The zone it actually carries.
        actual: Tz,
    },
}

/// Attach a named zone to a naive timestamp.
///
/// The wall-clock fields are preserved. An ambiguous local time (the
/// repeated hour of a fall-back transition) resolves to the earlier
/// instant; a nonexistent local time is an error.
pub fn attach_zone(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>, TzError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier),
        LocalResult::None => Err(TzError::NonexistentLocalTime { naive, tz }),
    }
}

/// Verify that a timestamp's zone identity equals `required`.
///
/// Compares the named zone itself, not the resolved offset, so
/// `Etc/UTC` never passes for `America/Santiago` even when the offsets
/// of a given instant coincide.
pub fn verify_zone(dt: &DateTime<Tz>, required: Tz) -> Result<(), TzError> {
    let actual = dt.timezone();
    if actual == required {
        Ok(())
    } else {
        Err(TzError::WrongZone { required, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Offset, Timelike};

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_attach_zone_preserves_wall_clock() {
        let n = naive(2024, 6, 15, 12, 30, 0);
        let dt = attach_zone(n, CANONICAL_TZ).unwrap();
        assert_eq!(dt.naive_local(), n);
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn test_attach_zone_ambiguous_takes_earlier() {
        // Chile fell back on 2024-04-06: 24:00 became 23:00, so 23:30
        // that evening occurred twice. The earlier pass is still on
        // summer time (UTC-3).
        let n = naive(2024, 4, 6, 23, 30, 0);
        let dt = attach_zone(n, CANONICAL_TZ).unwrap();
        assert_eq!(dt.offset().fix().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn test_attach_zone_nonexistent_fails() {
        // Chile sprang forward on 2024-09-07: 24:00 jumped to 01:00,
        // so 00:30 on the 8th never happened.
        let n = naive(2024, 9, 8, 0, 30, 0);
        let err = attach_zone(n, CANONICAL_TZ).unwrap_err();
        assert_eq!(
            err,
            TzError::NonexistentLocalTime {
                naive: n,
                tz: CANONICAL_TZ,
            }
        );
    }

    #[test]
    fn test_verify_zone_identity_not_offset() {
        let n = naive(2024, 6, 15, 12, 0, 0);
        let santiago = attach_zone(n, CANONICAL_TZ).unwrap();
        assert!(verify_zone(&santiago, CANONICAL_TZ).is_ok());

        // Same instant tagged UTC: must fail regardless of offsets.
        let utc = santiago.with_timezone(&chrono_tz::UTC);
        let err = verify_zone(&utc, CANONICAL_TZ).unwrap_err();
        assert_eq!(
            err,
            TzError::WrongZone {
                required: CANONICAL_TZ,
                actual: chrono_tz::UTC,
            }
        );
    }
}
