use crate::window::Window;
use note_core::round1;
use std::time::Instant;
use tracing::trace;

/// Number of instantaneous readings averaged into the sampler's output.
pub const SAMPLER_WINDOW: usize = 3;

/// Cumulative CPU time (seconds) spent in each state, as reported by the OS,
/// plus the instant it was captured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterSnapshot {
    pub user:   f64,
    pub system: f64,
    pub idle:   f64,
    pub taken:  Instant,
}

impl CounterSnapshot {
    pub fn new(user: f64, system: f64, idle: f64, taken: Instant) -> Self {
        Self { user, system, idle, taken }
    }
}

/// Turns consecutive [`CounterSnapshot`]s into a smoothed CPU percentage.
///
/// Utilisation is `(user + system) / (user + system + idle)` over the delta
/// between the previous snapshot and the current one. The last
/// [`SAMPLER_WINDOW`] results are averaged.
#[derive(Debug, Clone)]
pub struct DeltaSampler {
    previous: Option<CounterSnapshot>,
    window:   Window,
    instant:  f64,
    smoothed: f64,
    fresh:    bool,
}

impl Default for DeltaSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl DeltaSampler {
    pub fn new() -> Self {
        Self {
            previous: None,
            window:   Window::new(SAMPLER_WINDOW),
            instant:  0.0,
            smoothed: 0.0,
            fresh:    false,
        }
    }

    /// Feed the latest counters and return the smoothed percentage
    /// (0.0 – 100.0, one decimal).
    ///
    /// The first call only establishes a baseline and reports `0.0`. When the
    /// clock has not advanced, or the counters show no elapsed CPU time, the
    /// previous value is returned unchanged. The snapshot is stored in every
    /// case so the next delta is measured from it.
    pub fn sample(&mut self, now: CounterSnapshot) -> f64 {
        self.fresh = false;
        if let Some(prev) = self.previous.replace(now) {
            if now.taken.saturating_duration_since(prev.taken).is_zero() {
                trace!("clock did not advance; reusing {:.1}%", self.smoothed);
            } else if let Some(instant) = utilisation(&prev, &now) {
                self.instant = instant;
                self.fresh = true;
                self.window.push(instant);
                if let Some(avg) = self.window.average() {
                    self.smoothed = avg;
                }
            } else {
                trace!("no CPU time elapsed; reusing {:.1}%", self.smoothed);
            }
        }

        round1(self.smoothed)
    }

    /// Unsmoothed utilisation from the most recent non-degenerate delta.
    pub fn last_instant(&self) -> f64 {
        self.instant
    }

    /// Whether the latest [`sample`](Self::sample) call computed a new
    /// instantaneous reading rather than reusing the cached one.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Current smoothed value without rounding.
    pub fn smoothed(&self) -> f64 {
        self.smoothed
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

/// Busy share of the elapsed CPU time between two snapshots, clamped to
/// `[0, 100]`. `None` when no CPU time elapsed.
fn utilisation(prev: &CounterSnapshot, now: &CounterSnapshot) -> Option<f64> {
    let user   = now.user - prev.user;
    let system = now.system - prev.system;
    let idle   = now.idle - prev.idle;

    let total = user + system + idle;
    if total.is_nan() || total <= 0.0 {
        return None;
    }

    Some((100.0 * (user + system) / total).clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Synthetic cumulative counters, 150 ms apart.
    struct FakeCounters {
        start:  Instant,
        ticks:  u32,
        user:   f64,
        system: f64,
        idle:   f64,
    }

    impl FakeCounters {
        fn new() -> Self {
            Self { start: Instant::now(), ticks: 0, user: 0.0, system: 0.0, idle: 0.0 }
        }

        fn advance(&mut self, user: f64, system: f64, idle: f64) -> CounterSnapshot {
            self.ticks += 1;
            self.user += user;
            self.system += system;
            self.idle += idle;
            self.snapshot()
        }

        fn snapshot(&self) -> CounterSnapshot {
            CounterSnapshot::new(
                self.user,
                self.system,
                self.idle,
                self.start + Duration::from_millis(150 * u64::from(self.ticks)),
            )
        }
    }

    #[test]
    fn first_call_reports_zero() {
        let mut counters = FakeCounters::new();
        let mut sampler = DeltaSampler::new();
        assert_eq!(sampler.sample(counters.advance(50.0, 50.0, 0.0)), 0.0);
        assert!(sampler.window().is_empty());
        assert!(!sampler.is_fresh());
    }

    #[test]
    fn constant_load_converges() {
        let mut counters = FakeCounters::new();
        let mut sampler = DeltaSampler::new();
        sampler.sample(counters.snapshot());

        let mut out = 0.0;
        for _ in 0..SAMPLER_WINDOW {
            out = sampler.sample(counters.advance(0.3, 0.1, 0.6));
        }
        assert_eq!(out, 40.0);
        assert!((sampler.last_instant() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn output_is_mean_of_last_three() {
        let mut counters = FakeCounters::new();
        let mut sampler = DeltaSampler::new();
        sampler.sample(counters.snapshot());

        sampler.sample(counters.advance(0.1, 0.0, 0.9)); // 10
        sampler.sample(counters.advance(0.2, 0.0, 0.8)); // 20
        assert_eq!(sampler.sample(counters.advance(0.6, 0.0, 0.4)), 30.0); // 10,20,60
        assert_eq!(sampler.sample(counters.advance(0.9, 0.0, 0.1)), 56.7); // 20,60,90
        assert_eq!(sampler.window().len(), SAMPLER_WINDOW);
    }

    #[test]
    fn out_of_range_ratios_are_clamped() {
        let mut counters = FakeCounters::new();
        let mut sampler = DeltaSampler::new();
        sampler.sample(counters.snapshot());

        // idle went backwards: busy 10 over a total of 5 would be 200%.
        sampler.sample(counters.advance(10.0, 0.0, -5.0));
        assert_eq!(sampler.last_instant(), 100.0);

        let mut sampler = DeltaSampler::new();
        sampler.sample(counters.snapshot());
        // user went backwards: -10 busy over a total of 10 would be -100%.
        sampler.sample(counters.advance(-10.0, 0.0, 20.0));
        assert_eq!(sampler.last_instant(), 0.0);
        assert_eq!(sampler.smoothed(), 0.0);
    }

    #[test]
    fn stalled_clock_returns_previous_value() {
        let mut counters = FakeCounters::new();
        let mut sampler = DeltaSampler::new();
        sampler.sample(counters.snapshot());
        let before = sampler.sample(counters.advance(0.5, 0.0, 0.5));
        assert_eq!(before, 50.0);

        // Same timestamp, counters moved anyway.
        let mut stalled = counters.snapshot();
        stalled.user += 5.0;
        let after = sampler.sample(stalled);
        assert_eq!(after, before);
        assert!(!after.is_nan());
        assert!(!sampler.is_fresh());
        assert_eq!(sampler.window().len(), 1);
    }

    #[test]
    fn zero_cpu_delta_returns_previous_value() {
        let mut counters = FakeCounters::new();
        let mut sampler = DeltaSampler::new();
        sampler.sample(counters.snapshot());
        sampler.sample(counters.advance(0.25, 0.0, 0.75));

        assert_eq!(sampler.sample(counters.advance(0.0, 0.0, 0.0)), 25.0);
        assert_eq!(sampler.window().len(), 1);
    }

    #[test]
    fn baseline_moves_even_on_short_circuit() {
        let mut counters = FakeCounters::new();
        let mut sampler = DeltaSampler::new();
        sampler.sample(counters.snapshot());

        // Stalled clock: counters jump but the snapshot is still stored...
        let mut stalled = counters.advance(0.0, 0.0, 0.0);
        stalled.taken = counters.start;
        stalled.user = 100.0;
        counters.user = 100.0;
        sampler.sample(stalled);

        // ...so the next delta does not include the 100s jump.
        assert_eq!(sampler.sample(counters.advance(0.0, 0.0, 1.0)), 0.0);
    }
}
