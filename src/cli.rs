use crate::builder::{self, BuildEnv, BuildOptions};
use crate::bundle::BundleSpec;
use crate::compilers::CompilerRegistry;
use crate::config::constants::CONFIG_FILE;
use crate::config::{BuildConfig, Config, ConfigError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

#[derive(Subcommand)]
#[command(version, about, long_about = None)]
pub enum Commands {
    /// Run the configured builds
    Build {
        /// Rebuild when watched files change
        #[clap(short, long)]
        watch: bool,
        /// Keep the process alive after a one-shot build
        #[clap(long = "no-exit")]
        no_exit: bool,
        /// Configuration file path
        #[clap(short, long)]
        config: Option<PathBuf>,
        /// Restrict the build to these units
        units: Vec<String>,
    },
}

/// Kiln command
#[derive(Parser)]
#[command(about=None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

pub async fn build_command(
    config_path: Option<PathBuf>,
    watch: bool,
    no_exit: bool,
    units: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    debug!("Starting build command");
    debug!("Config: {:?}", config_path);
    debug!("Watch mode: {}", watch);
    debug!("No exit: {}", no_exit);
    debug!("Units: {:?}", units);

    let config_path = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let config = Config::load(&config_path)?;
    let registry = CompilerRegistry::new();

    if config.builds.is_empty() {
        warn!("No builds configured in {}", config_path.display());
    }

    let env = Arc::new(BuildEnv::new(config.clone()));

    let mut tasks = JoinSet::new();
    for build in &config.builds {
        let options = build_options(&config, build, &registry, watch, &units)?;
        let env = Arc::clone(&env);
        tasks.spawn(async move { builder::build(env, options).await });
    }

    while let Some(joined) = tasks.join_next().await {
        joined??;
    }

    if !watch && !no_exit {
        std::process::exit(0);
    }

    Ok(())
}

/// Turn one configured build into runnable options
fn build_options(
    config: &Config,
    build: &BuildConfig,
    registry: &CompilerRegistry,
    watch: bool,
    units: &[String],
) -> Result<BuildOptions, ConfigError> {
    let mut bundles = Vec::with_capacity(build.bundles.len());
    for bundle in &build.bundles {
        let compiler =
            registry
                .by_name(&bundle.compiler)
                .ok_or_else(|| ConfigError::UnknownCompiler {
                    name: bundle.compiler.clone(),
                })?;

        bundles.push(
            BundleSpec::new(bundle.src.clone(), compiler)
                .bundle_root(bundle.bundle_root.clone())
                .import_root(bundle.import_root.clone())
                .output_root(bundle.output_root.clone())
                .ext(bundle.ext.clone())
                .read(bundle.read)
                .write(bundle.write),
        );
    }

    Ok(BuildOptions {
        name: build.name.clone().unwrap_or_else(|| config.name.clone()),
        bundles,
        watch: build.watch.clone(),
        live_reload_channel: build.live_reload.clone(),
        watch_mode: watch,
        auto_exit: false,
        units: units.to_vec(),
    })
}
