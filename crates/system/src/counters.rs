use note_core::{NoteError, Result};
use note_engine::CounterSnapshot;
use std::path::PathBuf;
use std::time::Instant;

/// Kernel clock ticks per second for `/proc/stat` (`USER_HZ`).
const USER_HZ: f64 = 100.0;

/// Anything that can report cumulative CPU time.
///
/// The monitor reads one snapshot per tick; tests and non-Linux hosts plug in
/// their own implementation.
pub trait CounterSource: Send + 'static {
    fn read(&mut self) -> Result<CounterSnapshot>;
}

/// Reads the aggregate `cpu` line of `/proc/stat`.
#[derive(Debug, Clone)]
pub struct ProcStat {
    path: PathBuf,
}

impl Default for ProcStat {
    fn default() -> Self {
        Self::new("/proc/stat")
    }
}

impl ProcStat {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CounterSource for ProcStat {
    fn read(&mut self) -> Result<CounterSnapshot> {
        let raw = std::fs::read_to_string(&self.path)?;
        parse_proc_stat(&raw, Instant::now())
    }
}

/// Parse the aggregate line of a `/proc/stat` dump.
///
/// Format: `cpu  user nice system idle iowait irq softirq steal ...` in
/// `USER_HZ` ticks. Only `user`, `system` and `idle` are used; `nice` and the
/// rest are ignored.
pub fn parse_proc_stat(raw: &str, taken: Instant) -> Result<CounterSnapshot> {
    let line = raw
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| NoteError::System("no aggregate cpu line in /proc/stat".into()))?;

    let fields = line
        .split_whitespace()
        .skip(1)
        .take(4)
        .map(|f| {
            f.parse::<u64>()
                .map_err(|e| NoteError::System(format!("bad /proc/stat field '{f}': {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let [user, _nice, system, idle] = fields[..] else {
        return Err(NoteError::System(format!(
            "expected 4 cpu fields, found {}",
            fields.len()
        )));
    };

    Ok(CounterSnapshot::new(
        user as f64 / USER_HZ,
        system as f64 / USER_HZ,
        idle as f64 / USER_HZ,
        taken,
    ))
}
