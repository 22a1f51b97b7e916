use chrono::{DateTime, SecondsFormat, Utc};

/// UTC wall-clock instant used by every ECP store.
///
/// Time is the only external input to the stores: every time-dependent
/// computation (expiry, decay, status) is evaluated relative to an explicit
/// or current `Timestamp`, never a clock running inside the store.
pub type Timestamp = DateTime<Utc>;

/// The current wall-clock time.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Milliseconds elapsed from `from` to `to`, floored at zero.
pub fn elapsed_ms(from: Timestamp, to: Timestamp) -> i64 {
    (to - from).num_milliseconds().max(0)
}

/// Fractional hours elapsed from `from` to `to`, floored at zero.
///
/// A `to` earlier than `from` (clock skew, replayed imports) yields `0.0`
/// rather than a negative span.
pub fn elapsed_hours(from: Timestamp, to: Timestamp) -> f64 {
    elapsed_ms(from, to) as f64 / 3_600_000.0
}

/// Fractional number of `interval`s elapsed from `from` to `to`.
///
/// Returns `0.0` for a zero interval or negative span.
pub fn elapsed_intervals(from: Timestamp, to: Timestamp, interval: std::time::Duration) -> f64 {
    if interval.is_zero() {
        return 0.0;
    }
    let elapsed = (to - from).to_std().map_or(0.0, |d| d.as_secs_f64());
    elapsed / interval.as_secs_f64()
}

/// RFC 3339 / ISO-8601 rendering with millisecond precision.
pub fn to_iso8601(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
