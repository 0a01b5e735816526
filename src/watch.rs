//! File watching with a single-flight rebuild policy

use crate::error::WatchError;
use crate::source::has_magic;
use glob::{MatchOptions, Pattern};
use indexmap::IndexSet;
use notify::{Event, EventKind, RecursiveMode};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error, info, warn};

/// Rebuild state of a watch session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WatchState {
    Idle,
    Running,
}

/// One watch invocation over a set of glob patterns
///
/// At most one rebuild is in flight at a time. Change events arriving while a
/// rebuild runs are dropped, not queued; the session returns to Idle when the
/// rebuild settles, whether it succeeded or failed.
pub struct WatchSession {
    patterns: Vec<Pattern>,
    options: MatchOptions,
    cwd: PathBuf,
    state: WatchState,
}

impl WatchSession {
    pub fn new(patterns: &[String]) -> Result<Self, WatchError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|source| WatchError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            options: MatchOptions::new(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            state: WatchState::Idle,
        })
    }

    /// Check whether an event concerns one of the watched patterns
    fn relevant(&self, event: &Event) -> bool {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return false;
        }

        event.paths.iter().any(|path| {
            // notify reports absolute paths while patterns are workspace-relative
            let relative = path.strip_prefix(&self.cwd).unwrap_or(path);
            self.patterns
                .iter()
                .any(|pattern| pattern.matches_path_with(relative, self.options))
        })
    }

    /// Drive the session until the event channel closes
    pub async fn run<F, Fut, E>(
        mut self,
        mut events: UnboundedReceiver<notify::Result<Event>>,
        on_change: F,
    ) where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: std::fmt::Display,
    {
        let mut closed = false;

        loop {
            match self.state {
                WatchState::Idle => match events.recv().await {
                    Some(Ok(event)) if self.relevant(&event) => {
                        debug!("Change detected: {:?}", event.paths);
                        self.state = WatchState::Running;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => warn!("Watch error: {}", e),
                    None => break,
                },
                WatchState::Running => {
                    let rebuild = on_change();
                    tokio::pin!(rebuild);

                    let outcome = loop {
                        tokio::select! {
                            outcome = &mut rebuild => break outcome,
                            event = events.recv(), if !closed => match event {
                                Some(Ok(event)) if self.relevant(&event) => {
                                    debug!("Change dropped, rebuild in flight: {:?}", event.paths);
                                }
                                Some(_) => {}
                                None => closed = true,
                            },
                        }
                    };

                    match outcome {
                        Ok(()) => debug!("Rebuild completed"),
                        Err(e) => error!("Rebuild failed: {}", e),
                    }

                    self.state = WatchState::Idle;
                    if closed {
                        break;
                    }
                }
            }
        }

        debug!("Watch session ended");
    }
}

/// Watch the given patterns and invoke the callback on each change
///
/// Runs until the process exits; the watcher has no teardown operation.
pub async fn watch<F, Fut, E>(patterns: &[String], on_change: F) -> Result<(), WatchError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    use notify::{Config, RecommendedWatcher, Watcher};

    let session = WatchSession::new(patterns)?;
    let (tx, rx) = mpsc::unbounded_channel();

    let mut watcher = RecommendedWatcher::new(
        move |res| {
            if let Err(e) = tx.send(res) {
                error!("Failed to send watch event: {}", e);
            }
        },
        Config::default(),
    )?;

    let roots: IndexSet<PathBuf> = patterns.iter().map(|pattern| watch_root(pattern)).collect();
    for root in &roots {
        watcher.watch(root, RecursiveMode::Recursive)?;
        debug!("Watching directory: {:?}", root);
    }

    for pattern in patterns {
        info!("watching {}", pattern);
    }

    session.run(rx, on_change).await;
    Ok(())
}

/// Directory to install a watcher on for a pattern: its literal prefix
fn watch_root(pattern: &str) -> PathBuf {
    let mut root = PathBuf::new();
    for component in Path::new(pattern).components() {
        if has_magic(&component.as_os_str().to_string_lossy()) {
            break;
        }
        root.push(component);
    }

    // a fully literal pattern names a file, so watch its directory
    if !has_magic(pattern) {
        root.pop();
    }
    if root.as_os_str().is_empty() {
        root.push(".");
    }
    root
}
