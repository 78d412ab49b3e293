/// lumen studio
///
/// Browser front end for the image store: classify stored or uploaded images
/// and inspect their pixel-intensity histograms. Served by a synchronous
/// tiny_http server; plain HTML forms, no JavaScript framework.
///
/// Run with:
///   cargo run --bin lumen-studio --release -- --image-dir images --model-dir models
/// Then open http://127.0.0.1:7878
///
/// Pages:
///   /                   overview
///   /classifications    classify an image already in the store
///   /upload             upload an image and classify it
///   /histogram/select   intensity histogram of a stored image
///   /info               models and images as JSON

mod state;
mod render;
mod routes;
mod handlers;
mod util;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tiny_http::Server;
use tracing::{error, info};

use lumen::{ConfigArgs, LogArgs};
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "lumen-studio", author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(flatten)]
    log: LogArgs,
}

fn main() -> ExitCode {
    let args = Args::parse();
    lumen::init_logging(&args.log);

    let config = match args.config.into_configuration() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let state = Arc::new(AppState::new(config));
    if let Err(e) = state.service.store().ensure_dir() {
        error!(error = %e, "image store unavailable");
        return ExitCode::FAILURE;
    }

    let addr = state.config().bind_addr.clone();
    let server = match Server::http(&addr) {
        Ok(s) => s,
        Err(e) => {
            error!(addr = %addr, error = %e, "failed to bind HTTP server");
            return ExitCode::FAILURE;
        }
    };

    info!("Starting lumen studio");
    info!("  Listening: http://{}", addr);
    info!("  Image store: {}", state.config().image_dir.display());
    info!("  Models: {:?}", state.config().models);

    // Each request runs on its own thread; handlers share only the
    // immutable AppState.
    for request in server.incoming_requests() {
        let state = state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state);
        });
    }

    ExitCode::SUCCESS
}
