//! Clock abstraction.
//!
//! State timeouts, publish throttling and record timestamps read time
//! through [`Clock`] so they can be driven by a [`ManualClock`] in tests.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Current wall-clock time, used for timestamps only.
    fn wall_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Wall-clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and pass
/// another to the component under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualTime>>,
}

#[derive(Debug)]
struct ManualTime {
    now: Instant,
    wall: SystemTime,
}

impl ManualClock {
    /// Create a clock frozen at the current instant.
    pub fn new() -> Self {
        Self::at(SystemTime::now())
    }

    /// Create a clock whose wall time starts at `wall`.
    pub fn at(wall: SystemTime) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualTime {
                now: Instant::now(),
                wall,
            })),
        }
    }

    /// Move both time bases forward.
    pub fn advance(&self, by: Duration) {
        let mut time = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        time.now += by;
        time.wall += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).now
    }

    fn wall_time(&self) -> SystemTime {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).wall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_on_advance() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);

        clock.advance(Duration::from_secs(10));
        assert_eq!(clock.now() - t0, Duration::from_secs(10));
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let t0 = clock.now();
        handle.advance(Duration::from_millis(1500));
        assert_eq!(clock.now() - t0, Duration::from_millis(1500));
    }

    #[test]
    fn manual_wall_time_follows_advance() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let clock = ManualClock::at(start);
        assert_eq!(clock.wall_time(), start);
        clock.advance(Duration::from_secs(3));
        assert_eq!(clock.wall_time(), start + Duration::from_secs(3));
    }
}
