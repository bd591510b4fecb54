pub use core::time::Duration;

pub use std::time::Instant;

use core::fmt;
use core::ops::{Add, AddAssign, Sub};
use std::sync::OnceLock;

/// The instant against which all [`MonotonicTime`] offsets are measured
static CLOCK_START: OnceLock<Instant> = OnceLock::new();

#[inline]
fn clock_start() -> Instant {
    *CLOCK_START.get_or_init(Instant::now)
}

/// This type represents a timestamp derived from the system monotonic clock.
///
/// The actual value of the timestamp is relative to the first time the monotonic clock was read
/// by this process, and is always monotonically increasing.
///
/// A monotonic time is always tracked at nanosecond precision, but it is not guaranteed that
/// the monotonic clock actually is that precise.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonotonicTime(Instant);
impl MonotonicTime {
    /// Get the current monotonic time
    pub fn now() -> Self {
        // Make sure the clock origin is never later than the first timestamp we hand out
        clock_start();
        Self(Instant::now())
    }

    /// Returns the time that has elapsed between the start of the monotonic clock and this timestamp
    pub fn elapsed(&self) -> Duration {
        self.0.saturating_duration_since(clock_start())
    }

    /// Returns the time that has elapsed between this timestamp and `earlier`
    ///
    /// If `earlier` is actually later than this timestamp, the result is zero.
    pub fn duration_since(&self, earlier: Self) -> Duration {
        self.0.saturating_duration_since(earlier.0)
    }

    /// Returns a u64 representing this monotonic time as microseconds
    ///
    /// If the duration between `now` and the start of the monotonic clock is too large
    /// to fit in a u64, then the value will be truncated, but that is never expected to
    /// happen, as the amount of time that would be represented by such a value is absurd,
    /// on the order of millions of years.
    pub fn as_usecs(&self) -> u64 {
        self.elapsed().as_micros() as u64
    }
}
impl fmt::Display for MonotonicTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}us", &self.as_usecs())
    }
}
impl From<Instant> for MonotonicTime {
    fn from(instant: Instant) -> Self {
        Self(instant)
    }
}
impl Add<Duration> for MonotonicTime {
    type Output = MonotonicTime;

    fn add(self, other: Duration) -> Self::Output {
        Self(self.0 + other)
    }
}
impl AddAssign<Duration> for MonotonicTime {
    fn add_assign(&mut self, other: Duration) {
        self.0 += other
    }
}
impl Sub<MonotonicTime> for MonotonicTime {
    type Output = Duration;

    fn sub(self, other: Self) -> Self::Output {
        self.duration_since(other)
    }
}
