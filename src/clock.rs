//! Time source and timing helpers

use chrono::{DateTime, SecondsFormat, Utc};
use std::future::Future;
use std::time::{Duration, Instant};

/// Source of wall-clock timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// `now()` in RFC 3339 with nanosecond precision
    fn timestamp(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Nanos, true)
    }
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Await `fut` and report how long it took
pub async fn measure<F: Future>(fut: F) -> (F::Output, Duration) {
    let start = Instant::now();
    let output = fut.await;
    (output, start.elapsed())
}

/// Human-readable duration for build logs (e.g. "850 ms", "12.4 s")
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{} ms", duration.as_millis())
    } else {
        format!("{:.1} s", duration.as_secs_f64())
    }
}
