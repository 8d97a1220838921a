use std::sync::atomic::{AtomicI64, Ordering};
use time::{Duration, UtcDateTime};

/// Source of wall-clock time.
///
/// Injected so that retention decisions can be tested without waiting.
pub trait Clock: Send + Sync {
    fn now(&self) -> UtcDateTime;
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UtcDateTime {
        UtcDateTime::now()
    }
}

/// A clock that only moves when told to.
///
/// # Examples
///
/// ```
/// use time::Duration;
/// use ucss_prefetch::{Clock, ManualClock};
///
/// let clock = ManualClock::default();
/// let before = clock.now();
/// clock.advance(Duration::seconds(70));
/// assert_eq!(clock.now() - before, Duration::seconds(70));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    start: UtcDateTime,
    offset_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start: UtcDateTime) -> Self {
        Self { start, offset_ms: AtomicI64::new(0) }
    }

    pub fn advance(&self, by: Duration) {
        let by = i64::try_from(by.whole_milliseconds()).unwrap_or(i64::MAX);
        self.offset_ms.fetch_add(by, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(UtcDateTime::UNIX_EPOCH + Duration::days(20_000))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> UtcDateTime {
        self.start + Duration::milliseconds(self.offset_ms.load(Ordering::SeqCst))
    }
}

/// Milliseconds since the Unix epoch, as stored in cache entries.
pub fn unix_millis(at: UtcDateTime) -> i64 {
    i64::try_from(at.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}
