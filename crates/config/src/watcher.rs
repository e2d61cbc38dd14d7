use crate::schema::NoteConfig;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Watches the config file and sends the freshly parsed [`NoteConfig`] every
/// time it is written.
///
/// The parent directory is watched rather than the file itself, so a file
/// that does not exist yet (or is replaced by an editor's atomic rename) is
/// still picked up. Edits that fail to parse are logged and skipped.
/// Dropping the handle stops the watch task and closes the receiver.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// let (_watcher, mut rx) = note_config::ConfigWatcher::spawn("/home/user/.config/cpunote/cpunote.toml");
/// while let Some(cfg) = rx.recv().await {
///     println!("new interval: {:?}", cfg.sampler.interval());
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    task: JoinHandle<()>,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path`.
    /// Returns the watcher handle and a receiver of reloaded configs.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<NoteConfig>) {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(watch_loop(path.as_ref().to_path_buf(), tx));

        (Self { task }, rx)
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<NoteConfig>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;

    let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        error!("Config path '{}' has no parent directory", path.display());
        return;
    };

    let (sync_tx, mut sync_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = sync_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(dir, RecursiveMode::NonRecursive) {
        error!("Failed to watch '{}': {e}", dir.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    while let Some(event) = sync_rx.recv().await {
        let event = match event {
            Ok(e) => e,
            Err(e) => {
                warn!("Watcher error: {e}");
                continue;
            }
        };

        use notify::EventKind::*;
        if !matches!(event.kind, Modify(_) | Create(_)) || !touches(&event, &path) {
            continue;
        }

        match crate::load(&path) {
            Ok(cfg) => {
                if tx.send(cfg).await.is_err() {
                    break; // receiver dropped
                }
            }
            Err(e) => warn!("Config reload failed: {e}"),
        }
    }
}

fn touches(event: &notify::Event, path: &Path) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name() == path.file_name())
}
