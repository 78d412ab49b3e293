//! `lumen` command-line tool.
//!
//! Runs the same operations as the studio without a browser:
//!   lumen info
//!   lumen histogram cat.png --out cat_hist.png
//!   lumen classify mnist digit.png
//!   lumen scaffold-model demo --labels cat,dog --width 32 --height 32

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use lumen::{histogram::chart::render_png, scaffold_model, ConfigArgs, InputType, LogArgs, Service};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    log: LogArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the model registry and the images in the store as JSON
    Info,

    /// Print the 256 intensity counts of a stored image, or write its chart
    Histogram {
        image_id: String,
        /// Write the rendered chart PNG here instead of printing counts
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Classify a stored image and print the scores as JSON
    Classify {
        model_id: String,
        image_id: String,
    },

    /// Write an untrained model file into the model directory
    ScaffoldModel {
        model_id: String,
        /// Comma-separated class labels
        #[arg(long, value_delimiter = ',', required = true)]
        labels: Vec<String>,
        #[arg(long, default_value_t = 28)]
        width: u32,
        #[arg(long, default_value_t = 28)]
        height: u32,
        /// Use RGB input instead of grayscale
        #[arg(long)]
        rgb: bool,
        /// Width of an optional ReLU hidden layer
        #[arg(long)]
        hidden: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    lumen::init_logging(&cli.log);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> lumen::Result<()> {
    let config = cli.config.into_configuration()?;

    match cli.command {
        Command::Info => {
            let service = Service::with_model_classifier(config);
            println!("{}", to_json(&service.info())?);
        }
        Command::Histogram { image_id, out } => {
            let service = Service::with_model_classifier(config);
            let path = service.store().resolve(&image_id)?;
            let histogram = lumen::Histogram::open(&path)?;
            match out {
                Some(out) => {
                    let png = render_png(&histogram)?;
                    std::fs::write(&out, png).map_err(|e| {
                        lumen::Error::storage(format!("could not write '{}': {}", out.display(), e))
                    })?;
                    println!("wrote {}", out.display());
                }
                None => {
                    for (intensity, count) in histogram.counts().iter().enumerate() {
                        println!("{}\t{}", intensity, count);
                    }
                }
            }
        }
        Command::Classify { model_id, image_id } => {
            let service = Service::with_model_classifier(config);
            let result = service.classify_existing(&model_id, &image_id)?;
            println!("{}", to_json(&result.scores)?);
        }
        Command::ScaffoldModel { model_id, labels, width, height, rgb, hidden } => {
            if !lumen::config::configuration::is_valid_model_id(&model_id) {
                return Err(lumen::Error::validation(format!("invalid model id '{}'", model_id)));
            }
            let labels: Vec<String> = labels.into_iter()
                .map(|l| l.trim().to_owned())
                .filter(|l| !l.is_empty())
                .collect();
            if labels.is_empty() || width == 0 || height == 0 {
                return Err(lumen::Error::validation("labels, width and height must be non-empty"));
            }
            let input = if rgb {
                InputType::ImageRgb { width, height }
            } else {
                InputType::ImageGrayscale { width, height }
            };

            std::fs::create_dir_all(&config.model_dir).map_err(|e| lumen::Error::storage(e.to_string()))?;
            let path = config.model_path(&model_id);
            scaffold_model(input, labels, hidden)
                .save_json(&path)
                .map_err(|e| lumen::Error::storage(format!("could not write '{}': {}", path.display(), e)))?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> lumen::Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| lumen::Error::render(e.to_string()))
}
