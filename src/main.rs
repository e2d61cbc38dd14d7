//! cpunote: streams host CPU usage and its note band as JSON lines.
//!
//! Run with:  `RUST_LOG=info cpunote`

use anyhow::{Context, Result};
use clap::Parser;
use note_config::{ConfigWatcher, NoteConfig};
use note_core::Reading;
use note_system::{spawn_monitor, MonitorHandle, MonitorSettings};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ticks to wait before a one-shot read, so both smoothing windows hold data.
const WARMUP_TICKS: usize = 4;

#[derive(Debug, Parser)]
#[command(name = "cpunote", version, about = "Sample CPU usage and classify it into note bands")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/cpunote/cpunote.toml).
    #[arg(short, long, env = "CPUNOTE_CONFIG")]
    config: Option<PathBuf>,

    /// Print a single reading and exit.
    #[arg(long)]
    once: bool,

    /// Override the sampling interval from the config file.
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Pretty-print JSON.
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    /// Merge command-line overrides into a loaded config.
    fn overlay(&self, mut cfg: NoteConfig) -> NoteConfig {
        if let Some(ms) = self.interval_ms {
            cfg.sampler.interval_ms = ms;
        }
        cfg.output.pretty |= self.pretty;
        cfg
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging goes to stderr; stdout carries only readings.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("cpunote v{} starting", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let path = cli.config.clone().unwrap_or_else(note_config::default_path);
    let cfg = cli.overlay(note_config::load(&path)?);

    let handle = spawn_monitor(MonitorSettings::from(&cfg));

    if cli.once {
        once(handle, cfg.output.pretty).await
    } else {
        stream(&cli, handle, cfg, path).await
    }
}

async fn once(mut handle: MonitorHandle, pretty: bool) -> Result<()> {
    let mut reading = None;
    for _ in 0..WARMUP_TICKS {
        reading = handle.next().await;
    }
    let reading = reading.context("monitor stopped before producing a reading")?;
    emit(&reading, pretty)
}

async fn stream(cli: &Cli, mut handle: MonitorHandle, mut cfg: NoteConfig, path: PathBuf) -> Result<()> {
    let (_watcher, mut reloads) = ConfigWatcher::spawn(&path);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            reading = handle.next() => {
                let Some(reading) = reading else {
                    tracing::warn!("monitor stopped");
                    break;
                };
                emit(&reading, cfg.output.pretty)?;
            }
            Some(fresh) = reloads.recv() => {
                cfg = cli.overlay(fresh);
                tracing::info!("Config reloaded");
                handle.apply(MonitorSettings::from(&cfg));
            }
            _ = &mut shutdown => {
                tracing::info!("interrupted, shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn emit(reading: &Reading, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(reading)?
    } else {
        serde_json::to_string(reading)?
    };

    let mut out = std::io::stdout().lock();
    writeln!(out, "{json}").context("writing to stdout")?;
    out.flush()?;
    Ok(())
}
