//! Match lifecycle status derivation.
//!
//! [`classify_at`] maps a match window and a reference instant to a
//! [`MatchStatus`]. [`sync_status`] wraps it for stored records: it recomputes
//! the status against the wall clock and hands the new value to a caller
//! supplied update action only when the stored status has drifted.

use crate::models::match_model::MatchStatus;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use std::future::Future;
use thiserror::Error;
use tracing::debug;

/// Side of the match window that failed to normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBoundary {
    Start,
    End,
}

impl fmt::Display for TimeBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBoundary::Start => write!(f, "start"),
            TimeBoundary::End => write!(f, "end"),
        }
    }
}

/// A match boundary could not be turned into a point in time.
///
/// Returned as a value by the classifier; callers pick their own fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("match {boundary} time is not a valid point in time")]
pub struct InvalidTimeInput {
    pub boundary: TimeBoundary,
}

/// Values that can be normalized into a UTC instant.
///
/// Strings are read as RFC 3339 first, then as naive ISO date-times or plain
/// dates in UTC. Integers are Unix timestamps in milliseconds.
pub trait IntoMatchTime {
    fn to_match_time(&self) -> Option<DateTime<Utc>>;
}

impl IntoMatchTime for DateTime<Utc> {
    fn to_match_time(&self) -> Option<DateTime<Utc>> {
        Some(*self)
    }
}

impl IntoMatchTime for DateTime<FixedOffset> {
    fn to_match_time(&self) -> Option<DateTime<Utc>> {
        Some(self.with_timezone(&Utc))
    }
}

impl IntoMatchTime for str {
    fn to_match_time(&self) -> Option<DateTime<Utc>> {
        parse_time_str(self)
    }
}

impl IntoMatchTime for String {
    fn to_match_time(&self) -> Option<DateTime<Utc>> {
        parse_time_str(self)
    }
}

impl IntoMatchTime for i64 {
    fn to_match_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(*self)
    }
}

impl<T: IntoMatchTime + ?Sized> IntoMatchTime for &T {
    fn to_match_time(&self) -> Option<DateTime<Utc>> {
        (**self).to_match_time()
    }
}

impl<T: IntoMatchTime> IntoMatchTime for Option<T> {
    fn to_match_time(&self) -> Option<DateTime<Utc>> {
        self.as_ref().and_then(IntoMatchTime::to_match_time)
    }
}

fn parse_time_str(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    // Offset-less date-times are taken as UTC.
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Classify a match window against `now`.
///
/// `Scheduled` before `start`, `Finished` at or after `end`, `Live` on the
/// half-open interval `[start, end)`. The window ordering is not checked: an
/// empty or inverted window never reports `Live`.
pub fn classify_at<S, E>(
    start_time: &S,
    end_time: &E,
    now: DateTime<Utc>,
) -> Result<MatchStatus, InvalidTimeInput>
where
    S: IntoMatchTime + ?Sized,
    E: IntoMatchTime + ?Sized,
{
    let start = start_time.to_match_time().ok_or(InvalidTimeInput {
        boundary: TimeBoundary::Start,
    })?;
    let end = end_time.to_match_time().ok_or(InvalidTimeInput {
        boundary: TimeBoundary::End,
    })?;

    if now < start {
        return Ok(MatchStatus::Scheduled);
    }
    if now >= end {
        return Ok(MatchStatus::Finished);
    }
    Ok(MatchStatus::Live)
}

/// [`classify_at`] against the current wall-clock time.
pub fn classify<S, E>(start_time: &S, end_time: &E) -> Result<MatchStatus, InvalidTimeInput>
where
    S: IntoMatchTime + ?Sized,
    E: IntoMatchTime + ?Sized,
{
    classify_at(start_time, end_time, Utc::now())
}

/// A stored match whose status can be reconciled.
pub trait StatusRecord {
    type Start: IntoMatchTime + ?Sized;
    type End: IntoMatchTime + ?Sized;

    fn start_time(&self) -> &Self::Start;
    fn end_time(&self) -> &Self::End;
    fn status(&self) -> MatchStatus;
    fn set_status(&mut self, status: MatchStatus);
}

/// Reconcile `record.status` with the status derived at `now`.
///
/// `apply_update` runs only when the derived status differs from the stored
/// one, and `record` is mutated only after it succeeds. An invalid window
/// leaves everything untouched and returns the stored status.
pub async fn sync_status_at<R, F, Fut, E>(
    record: &mut R,
    now: DateTime<Utc>,
    apply_update: F,
) -> Result<MatchStatus, E>
where
    R: StatusRecord + ?Sized,
    F: FnOnce(MatchStatus) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let current = record.status();

    let next = match classify_at(record.start_time(), record.end_time(), now) {
        Ok(next) => next,
        Err(err) => {
            debug!(error = %err, status = %current, "Skipping status sync");
            return Ok(current);
        }
    };

    if next == current {
        return Ok(current);
    }

    apply_update(next).await?;
    record.set_status(next);

    Ok(next)
}

/// [`sync_status_at`] against the current wall-clock time.
pub async fn sync_status<R, F, Fut, E>(record: &mut R, apply_update: F) -> Result<MatchStatus, E>
where
    R: StatusRecord + ?Sized,
    F: FnOnce(MatchStatus) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    sync_status_at(record, Utc::now(), apply_update).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::convert::Infallible;
    use tokio_test::{assert_err, assert_ok};

    const START: &str = "2025-03-01T10:00:00Z";
    const END: &str = "2025-03-01T12:00:00Z";

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&Utc)
    }

    struct TestMatch {
        start_time: String,
        end_time: String,
        status: MatchStatus,
    }

    impl TestMatch {
        fn new(start_time: &str, end_time: &str, status: MatchStatus) -> Self {
            Self {
                start_time: start_time.to_string(),
                end_time: end_time.to_string(),
                status,
            }
        }
    }

    impl StatusRecord for TestMatch {
        type Start = String;
        type End = String;

        fn start_time(&self) -> &String {
            &self.start_time
        }

        fn end_time(&self) -> &String {
            &self.end_time
        }

        fn status(&self) -> MatchStatus {
            self.status
        }

        fn set_status(&mut self, status: MatchStatus) {
            self.status = status;
        }
    }

    #[test]
    fn test_classify_concrete_scenario() {
        assert_eq!(
            classify_at(START, END, at("2025-03-01T09:59:59Z")),
            Ok(MatchStatus::Scheduled)
        );
        assert_eq!(
            classify_at(START, END, at("2025-03-01T10:00:00Z")),
            Ok(MatchStatus::Live)
        );
        assert_eq!(
            classify_at(START, END, at("2025-03-01T11:00:00Z")),
            Ok(MatchStatus::Live)
        );
        assert_eq!(
            classify_at(START, END, at("2025-03-01T12:00:00Z")),
            Ok(MatchStatus::Finished)
        );
    }

    #[test]
    fn test_boundaries_are_half_open() {
        let start = at(START);
        let end = at(END);
        let tick = Duration::milliseconds(1);

        assert_eq!(classify_at(&start, &end, start - tick), Ok(MatchStatus::Scheduled));
        assert_eq!(classify_at(&start, &end, start), Ok(MatchStatus::Live));
        assert_eq!(classify_at(&start, &end, end - tick), Ok(MatchStatus::Live));
        assert_eq!(classify_at(&start, &end, end), Ok(MatchStatus::Finished));
        assert_eq!(
            classify_at(&start, &end, end + Duration::days(365)),
            Ok(MatchStatus::Finished)
        );
    }

    #[test]
    fn test_timeline_partition_has_no_gaps() {
        let start = at(START);
        let end = at(END);
        let mut now = start - Duration::minutes(30);

        while now < end + Duration::minutes(30) {
            let expected = if now < start {
                MatchStatus::Scheduled
            } else if now < end {
                MatchStatus::Live
            } else {
                MatchStatus::Finished
            };
            assert_eq!(classify_at(&start, &end, now), Ok(expected), "at {now}");
            now += Duration::minutes(7);
        }
    }

    #[test]
    fn test_invalid_inputs_are_reported_per_boundary() {
        let now = at("2025-03-01T11:00:00Z");

        assert_eq!(
            classify_at("not-a-date", END, now),
            Err(InvalidTimeInput {
                boundary: TimeBoundary::Start
            })
        );
        assert_eq!(
            classify_at(START, "not-a-date", now),
            Err(InvalidTimeInput {
                boundary: TimeBoundary::End
            })
        );
        assert!(classify_at("", END, now).is_err());
        assert!(classify_at(START, &None::<DateTime<Utc>>, now).is_err());
    }

    #[test]
    fn test_inverted_window_is_never_live() {
        let start = at(END);
        let end = at(START);
        let mut now = end - Duration::hours(1);

        while now < start + Duration::hours(1) {
            assert_ne!(classify_at(&start, &end, now), Ok(MatchStatus::Live));
            now += Duration::minutes(10);
        }
        assert_eq!(classify_at(&start, &start, start), Ok(MatchStatus::Finished));
    }

    #[test]
    fn test_accepts_mixed_time_representations() {
        let now = at("2025-03-01T11:00:00Z");
        let offset_start = DateTime::parse_from_rfc3339("2025-03-01T17:00:00+07:00").unwrap();
        let end_millis = at(END).timestamp_millis();

        assert_eq!(classify_at(&offset_start, &end_millis, now), Ok(MatchStatus::Live));
        assert_eq!(
            classify_at("2025-03-01T10:00:00.000Z", "2025-03-01 12:00:00", now),
            Ok(MatchStatus::Live)
        );
        assert_eq!(
            classify_at("2025-03-01", "2025-03-02", now),
            Ok(MatchStatus::Live)
        );
        assert_eq!(
            classify_at(&Some(at(START)), &Some(Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap()), now),
            Ok(MatchStatus::Finished)
        );
    }

    #[tokio::test]
    async fn test_sync_writes_once_on_drift() {
        let mut record = TestMatch::new(START, END, MatchStatus::Scheduled);
        let now = at("2025-03-01T10:30:00Z");
        let mut writes = Vec::new();

        let first = sync_status_at(&mut record, now, |next| {
            writes.push(next);
            async { Ok::<(), Infallible>(()) }
        })
        .await;
        assert_eq!(assert_ok!(first), MatchStatus::Live);

        let second = sync_status_at(&mut record, now, |next| {
            writes.push(next);
            async { Ok::<(), Infallible>(()) }
        })
        .await;
        assert_eq!(assert_ok!(second), MatchStatus::Live);

        assert_eq!(writes, vec![MatchStatus::Live]);
        assert_eq!(record.status, MatchStatus::Live);
    }

    #[tokio::test]
    async fn test_sync_skips_invalid_window() {
        let mut record = TestMatch::new("garbage", END, MatchStatus::Live);
        let mut called = false;

        let status = sync_status_at(&mut record, at("2025-03-01T13:00:00Z"), |_| {
            called = true;
            async { Ok::<(), Infallible>(()) }
        })
        .await;

        assert_eq!(assert_ok!(status), MatchStatus::Live);
        assert!(!called);
        assert_eq!(record.status, MatchStatus::Live);
    }

    #[tokio::test]
    async fn test_sync_failure_leaves_status_untouched() {
        let mut record = TestMatch::new(START, END, MatchStatus::Live);

        let result = sync_status_at(&mut record, at("2025-03-01T12:00:00Z"), |_| async {
            Err::<(), &str>("database unavailable")
        })
        .await;

        assert_eq!(assert_err!(result), "database unavailable");
        assert_eq!(record.status, MatchStatus::Live);
    }

    #[tokio::test]
    async fn test_sync_awaits_update_before_mutating() {
        let mut record = TestMatch::new(START, END, MatchStatus::Scheduled);

        let status = sync_status_at(&mut record, at("2025-03-01T12:30:00Z"), |next| async move {
            tokio::task::yield_now().await;
            assert_eq!(next, MatchStatus::Finished);
            Ok::<(), Infallible>(())
        })
        .await;

        assert_eq!(assert_ok!(status), MatchStatus::Finished);
        assert_eq!(record.status, MatchStatus::Finished);
    }

    #[tokio::test]
    async fn test_sync_uses_wall_clock() {
        let start = (Utc::now() - Duration::hours(3)).to_rfc3339();
        let end = (Utc::now() - Duration::hours(1)).to_rfc3339();
        let mut record = TestMatch::new(&start, &end, MatchStatus::Live);

        let status = sync_status(&mut record, |_| async { Ok::<(), Infallible>(()) }).await;

        assert_eq!(assert_ok!(status), MatchStatus::Finished);
    }
}
