use std::path::PathBuf;

use clap::Args;

use crate::config::configuration::Configuration;
use crate::error::Result;

/// Configuration flags shared by the `lumen` CLI and the studio server.
///
/// Precedence: flag / environment variable > `--config` file > defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON configuration file
    #[arg(long, env = "LUMEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the image store
    #[arg(long, env = "LUMEN_IMAGE_DIR")]
    pub image_dir: Option<PathBuf>,

    /// Directory holding `<model_id>.json` model files
    #[arg(long, env = "LUMEN_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Comma-separated model registry (discovered from the model dir when omitted)
    #[arg(long, env = "LUMEN_MODELS", value_delimiter = ',')]
    pub models: Vec<String>,

    /// Address the studio listens on
    #[arg(long, env = "LUMEN_BIND")]
    pub bind: Option<String>,

    /// Largest accepted upload body, in bytes
    #[arg(long, env = "LUMEN_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,
}

/// Logging flags shared by both binaries.
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl ConfigArgs {
    /// Resolves the final, validated configuration with the model registry
    /// fixed.
    pub fn into_configuration(self) -> Result<Configuration> {
        let mut cfg = match &self.config {
            Some(path) => Configuration::load_json(path)?,
            None => Configuration::default(),
        };

        if let Some(dir) = self.image_dir {
            cfg.image_dir = dir;
        }
        if let Some(dir) = self.model_dir {
            cfg.model_dir = dir;
        }
        let models: Vec<String> = self.models.into_iter()
            .map(|m| m.trim().to_owned())
            .filter(|m| !m.is_empty())
            .collect();
        if !models.is_empty() {
            cfg.models = models;
        }
        if let Some(bind) = self.bind {
            cfg.bind_addr = bind;
        }
        if let Some(max) = self.max_upload_bytes {
            cfg.max_upload_bytes = max;
        }

        cfg.validate()?;
        Ok(cfg.with_discovered_models())
    }
}

/// Installs the global `tracing` subscriber.
pub fn init_logging(args: &LogArgs) {
    use tracing::Level;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
