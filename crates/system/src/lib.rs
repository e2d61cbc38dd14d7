pub mod counters;
pub mod memory;

pub use counters::{parse_proc_stat, CounterSource, ProcStat};

use note_config::{NoteConfig, OutputConfig, MIN_INTERVAL_MS};
use note_core::Reading;
use note_engine::NoteEngine;
use std::time::Duration;
use sysinfo::System;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Knobs the monitor task can be retuned with while running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    pub interval: Duration,
    pub output:   OutputConfig,
}

impl From<&NoteConfig> for MonitorSettings {
    fn from(cfg: &NoteConfig) -> Self {
        Self {
            interval: cfg.sampler.interval(),
            output:   cfg.output.clone(),
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from(&NoteConfig::default())
    }
}

/// Handle to a running monitor task.
///
/// Every tick produces exactly one [`Reading`], published on a watch channel
/// so any number of subscribers see the same value. The task stops once the
/// handle and every subscriber are dropped.
pub struct MonitorHandle {
    readings: watch::Receiver<Reading>,
    settings: watch::Sender<MonitorSettings>,
}

impl MonitorHandle {
    /// Most recently published reading (single-shot read).
    pub fn latest(&self) -> Reading {
        self.readings.borrow().clone()
    }

    /// A new receiver for the reading stream.
    pub fn subscribe(&self) -> watch::Receiver<Reading> {
        self.readings.clone()
    }

    /// Wait for the next reading.  `None` once the task has stopped.
    pub async fn next(&mut self) -> Option<Reading> {
        self.readings.changed().await.ok()?;
        Some(self.readings.borrow_and_update().clone())
    }

    /// Change cadence and output fields without restarting the engine.
    pub fn apply(&self, settings: MonitorSettings) {
        self.settings.send_if_modified(|current| {
            if *current == settings {
                return false;
            }
            info!("monitor retuned: every {:?}", settings.interval);
            *current = settings;
            true
        });
    }
}

/// Spawn a background Tokio task sampling `/proc/stat`.
pub fn spawn_monitor(settings: MonitorSettings) -> MonitorHandle {
    spawn_monitor_with(ProcStat::default(), settings)
}

/// Spawn a background Tokio task that drives a [`NoteEngine`] from `source`
/// at the configured interval and publishes a [`Reading`] per tick.
pub fn spawn_monitor_with<S: CounterSource>(source: S, settings: MonitorSettings) -> MonitorHandle {
    let (reading_tx, reading_rx) = watch::channel(Reading::default());
    let (settings_tx, settings_rx) = watch::channel(settings);

    tokio::spawn(monitor_loop(source, reading_tx, settings_rx));

    MonitorHandle {
        readings: reading_rx,
        settings: settings_tx,
    }
}

async fn monitor_loop<S: CounterSource>(
    mut source: S,
    tx: watch::Sender<Reading>,
    mut settings_rx: watch::Receiver<MonitorSettings>,
) {
    let mut settings = settings_rx.borrow_and_update().clone();
    let mut engine = NoteEngine::new();
    let mut sys = System::new();
    sys.refresh_cpu_usage();

    let mut ticker = new_ticker(settings.interval);
    let mut settings_closed = false;
    info!("monitor started, sampling every {:?}", settings.interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = settings_rx.changed(), if !settings_closed => {
                if changed.is_err() {
                    // handle dropped; subscribers may still be listening
                    settings_closed = true;
                    continue;
                }
                let next = settings_rx.borrow_and_update().clone();
                if next.interval != settings.interval {
                    ticker = new_ticker(next.interval);
                }
                settings = next;
                continue;
            }
        }

        let counters = match source.read() {
            Ok(c) => c,
            Err(e) => {
                warn!("skipping tick: {e}");
                continue;
            }
        };

        let tick = engine.tick(counters);
        debug!(
            "tick: instant {:.1}% smoothed {:.1}% note {}",
            tick.instant, tick.smoothed, tick.band
        );

        let reading = Reading {
            cpu: tick.smoothed,
            note: tick.band,
            per_cpu: settings.output.per_cpu.then(|| per_cpu_usage(&mut sys)),
            memory_percent: settings.output.memory.then(|| memory_usage(&mut sys)),
            timestamp: now_secs(),
        };

        if tx.send(reading).is_err() {
            break; // all receivers dropped
        }
    }

    info!("monitor stopped");
}

fn new_ticker(interval: Duration) -> time::Interval {
    let mut ticker = time::interval(interval.max(Duration::from_millis(MIN_INTERVAL_MS)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

fn per_cpu_usage(sys: &mut System) -> Vec<f64> {
    sys.refresh_cpu_usage();
    sys.cpus()
        .iter()
        .map(|c| note_core::round1(f64::from(c.cpu_usage())))
        .collect()
}

fn memory_usage(sys: &mut System) -> f64 {
    sys.refresh_memory();
    memory::memory_percent(sys.used_memory(), sys.total_memory())
}

fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
