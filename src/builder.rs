//! Build orchestration: initial pass, live reload, watch wiring, exit governance

use crate::bundle::BundleSpec;
use crate::bundle::runner;
use crate::config::Config;
use crate::error::BuildError;
use crate::filter::AllowList;
use crate::livereload::LiveReload;
use crate::watch;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Long-lived context shared by every build in the process
pub struct BuildEnv {
    pub config: Config,
    pub cwd: PathBuf,
    pub live_reload: LiveReload,
}

impl BuildEnv {
    pub fn new(config: Config) -> Self {
        let live_reload = LiveReload::new(config.live_reload.settings());

        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            live_reload,
            config,
        }
    }
}

/// Options for one named build
pub struct BuildOptions {
    pub name: String,
    pub bundles: Vec<BundleSpec>,
    /// Patterns to watch in watch mode
    pub watch: Vec<String>,
    /// Channel to signal after each successful pass
    pub live_reload_channel: Option<String>,
    pub watch_mode: bool,
    pub auto_exit: bool,
    /// Unit names restricting the run; empty means everything
    pub units: Vec<String>,
}

/// Run one named build
///
/// Performs the initial pass, then either installs a watcher, exits the
/// process, or returns to the caller, depending on the options.
pub async fn build(env: Arc<BuildEnv>, mut options: BuildOptions) -> Result<(), BuildError> {
    info!(
        "build {} {} {} {}",
        options.name,
        if options.watch_mode { "watch" } else { "no-watch" },
        if options.auto_exit { "auto exit" } else { "no-exit" },
        if options.units.is_empty() {
            "all pages".to_string()
        } else {
            options.units.join(", ")
        },
    );

    if !options.units.is_empty() {
        let roots = env.config.roots.all();
        let filter = Arc::new(AllowList::for_units(&env.cwd, &roots, &options.units));
        for spec in &mut options.bundles {
            spec.filter = Some(filter.clone());
        }
    }

    run_pass(&env, &options).await?;

    if options.watch_mode {
        if options.watch.is_empty() {
            warn!("Watch mode requested but {} has no watch patterns", options.name);
        } else {
            let options = Arc::new(options);
            let env_cb = env.clone();
            let options_cb = options.clone();

            watch::watch(&options.watch, move || {
                let env = env_cb.clone();
                let options = options_cb.clone();
                async move { run_pass(&env, &options).await }
            })
            .await?;

            return Ok(());
        }
    }

    if options.auto_exit {
        std::process::exit(0);
    }

    Ok(())
}

/// One full pass over every bundle of the build
async fn run_pass(env: &BuildEnv, options: &BuildOptions) -> Result<(), BuildError> {
    run_bundles(&options.bundles).await?;

    if let Some(channel) = &options.live_reload_channel {
        // clients must be able to connect before the pass is reported done
        let handle = env.live_reload.start().await?;
        info!("done {}", options.name);
        handle.refresh(channel);
    } else {
        info!("done {}", options.name);
    }

    Ok(())
}

/// Run every spec concurrently, draining all tasks before surfacing an error
async fn run_bundles(specs: &[BundleSpec]) -> Result<(), BuildError> {
    let mut set = JoinSet::new();
    for spec in specs {
        let spec = spec.clone();
        set.spawn(async move { runner::run(&spec).await });
    }

    let mut first_error: Option<BuildError> = None;
    while let Some(joined) = set.join_next().await {
        let outcome = match joined {
            Ok(outcome) => outcome.map_err(BuildError::from),
            Err(join_error) => Err(BuildError::from(join_error)),
        };

        match outcome {
            Ok(summary) => debug!(
                "Bundle finished: {} processed, {} failed",
                summary.processed, summary.failed
            ),
            Err(err) => {
                if first_error.is_none() {
                    first_error = Some(err);
                } else {
                    warn!("Further bundle failure: {}", err);
                }
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
