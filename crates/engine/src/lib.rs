//! Sampling-and-classification engine.
//!
//! Pure, synchronous state: feed it one [`CounterSnapshot`] per tick and it
//! returns the smoothed CPU percentage and the current note [`Band`]. It does
//! no I/O and holds no locks; callers that share readings between consumers
//! compute one [`Tick`] and fan it out themselves.

pub mod classifier;
pub mod sampler;
pub mod window;

pub use classifier::{transition, NoteClassifier, Transition};
pub use note_core::{Band, Tick};
pub use sampler::{CounterSnapshot, DeltaSampler};
pub use window::Window;

use tracing::info;

/// A [`DeltaSampler`] and a [`NoteClassifier`] driven in lockstep.
#[derive(Debug, Clone, Default)]
pub struct NoteEngine {
    sampler:    DeltaSampler,
    classifier: NoteClassifier,
}

impl NoteEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance both components by one tick.
    ///
    /// The classifier is fed the sampler's instantaneous reading, not its
    /// smoothed output, so the two windows stay independent. Ticks where the
    /// sampler had no new delta (baseline, stalled clock) leave the
    /// classifier untouched.
    pub fn tick(&mut self, counters: CounterSnapshot) -> Tick {
        let smoothed = self.sampler.sample(counters);
        let instant = self.sampler.last_instant();
        let step = if self.sampler.is_fresh() {
            self.classifier.step(instant)
        } else {
            Transition::Stay(self.classifier.band())
        };

        if let Transition::Move { from, to } = step {
            info!("note changed from {from} to {to} (avg {:.1}%)", self.classifier.last_average());
        }

        Tick {
            instant,
            smoothed,
            band: step.band(),
            changed: step.is_move(),
        }
    }

    pub fn sampler(&self) -> &DeltaSampler {
        &self.sampler
    }

    pub fn classifier(&self) -> &NoteClassifier {
        &self.classifier
    }
}
