use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::time::Instant;

/// A duration or reading measured in whole milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(pub i64);

impl Time {
    pub const ZERO: Time = Time(0);

    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_seconds(self) -> f32 {
        self.0 as f32 / 1000.0
    }

    pub fn as_milliseconds(self) -> f32 {
        self.0 as f32
    }
}

impl Add for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Time {
        Time(self.0 + rhs.0)
    }
}

impl Sub for Time {
    type Output = Time;

    fn sub(self, rhs: Time) -> Time {
        Time(self.0 - rhs.0)
    }
}

impl AddAssign for Time {
    fn add_assign(&mut self, rhs: Time) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Time {
    fn sub_assign(&mut self, rhs: Time) {
        self.0 -= rhs.0;
    }
}

/// Source of millisecond readings for a `Clock`.
pub trait TickSource {
    /// Milliseconds elapsed since the source was created.
    fn ticks(&mut self) -> i64;
}

/// Wall-clock tick source backed by `Instant`.
#[derive(Debug, Clone)]
pub struct MonotonicTicks {
    start: Instant,
}

impl MonotonicTicks {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MonotonicTicks {
    fn ticks(&mut self) -> i64 {
        i64::try_from(self.start.elapsed().as_millis()).unwrap_or(i64::MAX)
    }
}

/// Frame clock producing per-frame delta times.
///
/// The clock owns its previous reading, so any number of clocks can exist
/// side by side and each one is ticked exactly once per frame by its owner.
pub struct Clock {
    source: Box<dyn TickSource>,
    previous: Time,
}

impl Clock {
    /// Clock reading real time.
    pub fn new() -> Self {
        Self::with_source(MonotonicTicks::new())
    }

    /// Clock reading from a custom source, e.g. a scripted one in tests.
    pub fn with_source(source: impl TickSource + 'static) -> Self {
        let mut source: Box<dyn TickSource> = Box::new(source);
        let previous = Time(source.ticks());
        Self { source, previous }
    }

    /// Current reading, without advancing the frame baseline.
    pub fn now(&mut self) -> Time {
        Time(self.source.ticks())
    }

    /// Advances the baseline and returns the time since the previous tick.
    ///
    /// A source that steps backwards yields a zero delta rather than a
    /// negative one.
    pub fn tick(&mut self) -> Time {
        let now = self.now();
        let delta = if now < self.previous {
            tracing::warn!(
                previous = self.previous.0,
                now = now.0,
                "tick source went backwards"
            );
            Time::ZERO
        } else {
            now - self.previous
        };
        self.previous = self.previous.max(now);
        delta
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("previous", &self.previous)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Scripted(Rc<Cell<i64>>);

    impl TickSource for Scripted {
        fn ticks(&mut self) -> i64 {
            self.0.get()
        }
    }

    #[test]
    fn time_conversions() {
        let t = Time::from_millis(1500);
        assert_relative_eq!(t.as_seconds(), 1.5);
        assert_relative_eq!(t.as_milliseconds(), 1500.0);
    }

    #[test]
    fn time_arithmetic() {
        let mut t = Time(10) + Time(5);
        assert_eq!(t, Time(15));
        t -= Time(3);
        assert_eq!(t, Time(12));
        t += Time(8);
        assert_eq!(t - Time(20), Time::ZERO);
    }

    #[test]
    fn clock_reports_consecutive_differences() {
        let now = Rc::new(Cell::new(100));
        let mut clock = Clock::with_source(Scripted(now.clone()));

        now.set(116);
        assert_eq!(clock.tick(), Time(16));
        now.set(150);
        assert_eq!(clock.tick(), Time(34));
        assert_eq!(clock.tick(), Time::ZERO);
    }

    #[test]
    fn reading_now_does_not_consume_the_delta() {
        let now = Rc::new(Cell::new(0));
        let mut clock = Clock::with_source(Scripted(now.clone()));

        now.set(40);
        assert_eq!(clock.now(), Time(40));
        assert_eq!(clock.now(), Time(40));
        assert_eq!(clock.tick(), Time(40));
    }

    #[test]
    fn backwards_source_yields_zero_delta() {
        let now = Rc::new(Cell::new(50));
        let mut clock = Clock::with_source(Scripted(now.clone()));

        now.set(20);
        assert_eq!(clock.tick(), Time::ZERO);
        now.set(60);
        assert_eq!(clock.tick(), Time(10));
    }

    #[test]
    fn monotonic_source_never_decreases() {
        let mut ticks = MonotonicTicks::new();
        let a = ticks.ticks();
        let b = ticks.ticks();
        assert!(b >= a);
    }
}
