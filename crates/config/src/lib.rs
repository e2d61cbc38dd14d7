pub mod schema;
pub mod watcher;

pub use schema::{NoteConfig, OutputConfig, SamplerConfig, MIN_INTERVAL_MS};
pub use watcher::ConfigWatcher;

use note_core::{NoteError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.
///
/// A missing file is not an error: the sampler runs on defaults and the
/// watcher picks the file up once it appears.
pub fn load(path: impl AsRef<Path>) -> Result<NoteConfig> {
    let path = path.as_ref();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("no config at '{}'; using defaults", path.display());
            return Ok(NoteConfig::default());
        }
        Err(e) => {
            return Err(NoteError::Config(format!("cannot read '{}': {e}", path.display())))
        }
    };

    let cfg: NoteConfig = toml::from_str(&raw)
        .map_err(|e| NoteError::Config(format!("'{}': {e}", path.display())))?;
    tracing::debug!("loaded config from '{}': {cfg:?}", path.display());
    Ok(cfg)
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("cpunote").join("cpunote.toml")
}
