use cyclic_system::time::{Duration, MonotonicTime};

use crate::CollectorConfig;

/// Decides when a rendezvous should escalate into a cycle scan.
///
/// Every rendezvous advances a tick counter. A scan is requested only when more
/// than `tick_threshold` ticks *and* more than `scan_interval` of wall-clock time
/// have passed since the previous scan: a burst of safepoints on one thread can't
/// cause back-to-back scans, and the clock is only consulted once the cheap tick
/// check has passed.
#[derive(Debug)]
pub struct Scheduler {
    tick: u32,
    last_tick: u32,
    last_timestamp: MonotonicTime,
    tick_threshold: u32,
    scan_interval: Duration,
}
impl Scheduler {
    /// Creates a scheduler whose first scan is measured from `start`
    pub fn new(config: &CollectorConfig, start: MonotonicTime) -> Self {
        Self {
            tick: 0,
            last_tick: 0,
            last_timestamp: start,
            tick_threshold: config.tick_threshold,
            scan_interval: config.scan_interval,
        }
    }

    #[inline]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Advances the tick counter, returning true if a scan should be requested now.
    ///
    /// `now` is only called when the tick threshold has been exceeded.
    pub fn should_trigger_scan<F>(&mut self, now: F) -> bool
    where
        F: FnOnce() -> MonotonicTime,
    {
        self.tick = self.tick.wrapping_add(1);
        // Wrapping subtraction keeps the delta correct across counter overflow
        let delta = self.tick.wrapping_sub(self.last_tick);
        if delta <= self.tick_threshold {
            return false;
        }

        let now = now();
        if now.duration_since(self.last_timestamp) <= self.scan_interval {
            return false;
        }

        self.last_tick = self.tick;
        self.last_timestamp = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(start: MonotonicTime) -> Scheduler {
        Scheduler::new(&CollectorConfig::default(), start)
    }

    #[test]
    fn rapid_ticks_do_not_trigger_a_scan() {
        let start = MonotonicTime::now();
        let mut scheduler = scheduler(start);

        // Eleven safepoints inside a single millisecond
        for i in 0..11u64 {
            let at = start + Duration::from_micros(i * 90);
            assert!(!scheduler.should_trigger_scan(|| at));
        }
        assert_eq!(scheduler.tick(), 11);
    }

    #[test]
    fn elapsed_time_alone_does_not_trigger_a_scan() {
        let start = MonotonicTime::now();
        let mut scheduler = scheduler(start);
        let late = start + Duration::from_secs(1);

        for _ in 0..10 {
            assert!(!scheduler.should_trigger_scan(|| late));
        }
    }

    #[test]
    fn clock_is_not_read_below_tick_threshold() {
        let mut scheduler = scheduler(MonotonicTime::now());
        for _ in 0..10 {
            assert!(!scheduler.should_trigger_scan(|| unreachable!()));
        }
    }

    #[test]
    fn both_thresholds_trigger_once() {
        let start = MonotonicTime::now();
        let mut scheduler = scheduler(start);
        let late = start + Duration::from_millis(11);

        for _ in 0..10 {
            assert!(!scheduler.should_trigger_scan(|| late));
        }
        assert!(scheduler.should_trigger_scan(|| late));

        // The baseline moved to the scan, so the very next tick is gated again
        let later = late + Duration::from_secs(1);
        assert!(!scheduler.should_trigger_scan(|| later));
    }

    #[test]
    fn many_ticks_wait_for_the_interval() {
        let start = MonotonicTime::now();
        let mut scheduler = scheduler(start);

        for i in 0..100u64 {
            let at = start + Duration::from_micros(i * 10);
            assert!(!scheduler.should_trigger_scan(|| at));
        }
        let at = start + Duration::from_millis(10) + Duration::from_micros(1);
        assert!(scheduler.should_trigger_scan(|| at));
    }

    #[test]
    fn counter_overflow_is_handled() {
        let start = MonotonicTime::now();
        let mut scheduler = scheduler(start);
        scheduler.tick = u32::MAX - 3;
        scheduler.last_tick = u32::MAX - 3;

        let late = start + Duration::from_secs(1);
        for _ in 0..10 {
            assert!(!scheduler.should_trigger_scan(|| late));
        }
        assert!(scheduler.should_trigger_scan(|| late));
        assert_eq!(scheduler.tick(), 7);
    }
}
