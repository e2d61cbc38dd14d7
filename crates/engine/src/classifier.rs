//! Note classifier: maps a stream of instantaneous CPU percentages onto the
//! seven [`Band`]s.
//!
//! The classifier keeps its own window of recent samples, independent of the
//! sampler's. Two rules keep transitions crisp:
//!
//! - **rest trim**: when the newest [`REST_WINDOW`] samples average below
//!   [`REST_THRESHOLD`], older history is dropped so the next plateau is not
//!   biased by the previous one.
//! - **reset on change**: the moment the windowed average lands in a new band
//!   that band is confirmed, and the window restarts from the current sample.
//!
//! There is no dead-zone around boundaries; a signal oscillating across one
//! can reset the window on every tick.

use crate::window::Window;
use note_core::Band;

/// Samples kept for the band average.
pub const NOTE_WINDOW: usize = 20;
/// Samples inspected by the rest detector.
pub const REST_WINDOW: usize = 3;
/// Short-window average below which the signal counts as resting.
pub const REST_THRESHOLD: f64 = 8.0;

/// Outcome of one state-machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay(Band),
    Move { from: Band, to: Band },
}

impl Transition {
    /// Band the machine is in after the step.
    pub fn band(self) -> Band {
        match self {
            Transition::Stay(band) | Transition::Move { to: band, .. } => band,
        }
    }

    pub fn is_move(self) -> bool {
        matches!(self, Transition::Move { .. })
    }
}

/// Band state machine: from any state, the next state is the band whose
/// interval holds the windowed average.
pub fn transition(current: Band, windowed_avg: f64) -> Transition {
    let next = Band::from_percent(windowed_avg);
    if next == current {
        Transition::Stay(current)
    } else {
        Transition::Move { from: current, to: next }
    }
}

/// Stateful wrapper around [`transition`] that owns the sample window.
#[derive(Debug, Clone)]
pub struct NoteClassifier {
    window:       Window,
    band:         Band,
    previous:     Option<Band>,
    last_average: f64,
}

impl Default for NoteClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteClassifier {
    pub fn new() -> Self {
        Self {
            window:       Window::new(NOTE_WINDOW),
            band:         Band::C,
            previous:     None,
            last_average: 0.0,
        }
    }

    /// Feed one instantaneous percentage and return the confirmed band.
    pub fn classify(&mut self, instant: f64) -> Band {
        self.step(instant).band()
    }

    /// Like [`classify`](Self::classify) but reports whether the band moved.
    pub fn step(&mut self, instant: f64) -> Transition {
        let instant = sanitize(instant);
        self.window.push(instant);

        if self
            .window
            .recent_average(REST_WINDOW)
            .is_some_and(|recent| recent < REST_THRESHOLD)
        {
            self.window.keep_newest(REST_WINDOW);
        }

        let avg = self.window.average().unwrap_or(instant);
        self.last_average = avg;

        let step = transition(self.band, avg);
        if let Transition::Move { from, to } = step {
            self.window.reset_to(instant);
            self.previous = Some(from);
            self.band = to;
        }
        step
    }

    /// Currently confirmed band.
    pub fn band(&self) -> Band {
        self.band
    }

    /// Band held before the most recent transition, if any happened.
    pub fn previous(&self) -> Option<Band> {
        self.previous
    }

    /// Windowed average used by the latest step.
    pub fn last_average(&self) -> f64 {
        self.last_average
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

/// Clamp into `[0, 100]`; NaN reads as idle.
fn sanitize(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(classifier: &mut NoteClassifier, samples: &[f64]) -> Band {
        let mut band = classifier.band();
        for &s in samples {
            band = classifier.classify(s);
        }
        band
    }

    #[test]
    fn starts_in_c() {
        let c = NoteClassifier::new();
        assert_eq!(c.band(), Band::C);
        assert_eq!(c.previous(), None);
    }

    #[test]
    fn transition_is_pure() {
        assert_eq!(transition(Band::C, 10.0), Transition::Stay(Band::C));
        assert_eq!(
            transition(Band::C, 50.0),
            Transition::Move { from: Band::C, to: Band::F }
        );
        assert_eq!(transition(Band::B, 100.0), Transition::Stay(Band::B));
    }

    #[test]
    fn constant_feed_converges_monotonically() {
        let mut last = Band::C;
        for pct in 0..=100 {
            let value = f64::from(pct);
            let mut c = NoteClassifier::new();
            let band = feed(&mut c, &[value; 40]);
            assert_eq!(band, Band::from_percent(value), "at {pct}%");
            assert!(band >= last, "band went down at {pct}%");
            last = band;
        }
        assert_eq!(last, Band::B);
    }

    #[test]
    fn constant_fifty_is_f_and_five_is_c() {
        assert_eq!(feed(&mut NoteClassifier::new(), &[50.0; 30]), Band::F);
        assert_eq!(feed(&mut NoteClassifier::new(), &[5.0; 30]), Band::C);
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let mut c = NoteClassifier::new();
        feed(&mut c, &[10.0; 100]);
        assert_eq!(c.window().len(), NOTE_WINDOW);
    }

    #[test]
    fn rest_trims_history_to_three() {
        let mut c = NoteClassifier::new();
        feed(&mut c, &[10.0; 10]);
        assert_eq!(c.window().len(), 10);

        // last three: 10, 10, 0 -> 6.67 < 8
        assert_eq!(c.classify(0.0), Band::C);
        assert_eq!(c.window().len(), REST_WINDOW);
        assert!((c.last_average() - 20.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn rest_discards_stale_plateau() {
        let mut c = NoteClassifier::new();
        let band = feed(&mut c, &[80.0, 80.0, 80.0, 80.0, 5.0, 5.0, 5.0, 5.0, 10.0]);

        assert_eq!(band, Band::C);
        assert!(c.window().iter().all(|&s| s < 80.0));
        assert_eq!(c.window().len(), REST_WINDOW);
        assert!(c.last_average() < 8.0);
    }

    #[test]
    fn change_commits_eagerly_and_resets_window() {
        let mut c = NoteClassifier::new();
        feed(&mut c, &[10.0; 5]);
        assert_eq!(c.band(), Band::C);

        // (5 * 10 + 40) / 6 = 15 -> D
        let step = c.step(40.0);
        assert_eq!(step, Transition::Move { from: Band::C, to: Band::D });
        assert_eq!(c.window().len(), 1);
        assert_eq!(c.previous(), Some(Band::C));

        // A low sample right after does not fall back: (40 + 0) / 2 = 20.
        assert_eq!(c.classify(0.0), Band::D);
        assert_eq!(c.window().len(), 2);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        let mut c = NoteClassifier::new();
        assert_eq!(c.classify(250.0), Band::B);
        assert_eq!(c.window().iter().copied().collect::<Vec<_>>(), vec![100.0]);

        let mut c = NoteClassifier::new();
        assert_eq!(c.classify(-30.0), Band::C);
        assert_eq!(c.classify(f64::NAN), Band::C);
        assert!(c.window().iter().all(|&s| s == 0.0));
    }
}
