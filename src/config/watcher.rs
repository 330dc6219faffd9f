//! Configuration file watcher for hot reload.
//!
//! # Design Decisions
//! - Watches the parent directory: editors that save by renaming a temp
//!   file over the config replace the inode a file watch is bound to
//! - Events for other files in that directory are ignored
//! - A save usually fires several events; a reload only happens when the
//!   file content differs from the last content seen

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::DashboardConfig;

/// Watches one config file and sends every valid new version.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<DashboardConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<DashboardConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for updates to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut reload = Reload::new(self.path.clone(), self.update_tx);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => reload.handle(&event),
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Reload state owned by the notify callback.
struct Reload {
    path: PathBuf,
    file_name: Option<OsString>,
    last_content: Option<String>,
    tx: mpsc::UnboundedSender<DashboardConfig>,
}

impl Reload {
    fn new(path: PathBuf, tx: mpsc::UnboundedSender<DashboardConfig>) -> Self {
        Self {
            file_name: path.file_name().map(|name| name.to_os_string()),
            last_content: fs::read_to_string(&path).ok(),
            path,
            tx,
        }
    }

    fn concerns(&self, event: &Event) -> bool {
        let relevant_kind = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));
        relevant_kind
            && event
                .paths
                .iter()
                .any(|path| path.file_name() == self.file_name.as_deref())
    }

    fn handle(&mut self, event: &Event) {
        if !self.concerns(event) {
            return;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            // Mid-rename; the create event that follows carries the new file.
            Err(e) => {
                tracing::debug!(path = ?self.path, error = %e, "Config file not readable yet");
                return;
            }
        };
        if self.last_content.as_deref() == Some(content.as_str()) {
            return;
        }

        tracing::info!(path = ?self.path, "Config file changed, reloading");
        match parse_config(&content) {
            Ok(config) => {
                if self.tx.send(config).is_err() {
                    tracing::warn!("Config update dropped; the server is no longer listening");
                }
            }
            Err(e) => tracing::error!(
                error = %e,
                "Failed to reload config, keeping current configuration"
            ),
        }
        self.last_content = Some(content);
    }
}
