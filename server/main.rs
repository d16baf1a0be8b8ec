/// digit-canvas server
///
/// Serves a drawing page; the browser posts the canvas raster, the server
/// preprocesses it and classifies it with a pre-trained model.
/// Served by a synchronous tiny_http server, one request at a time.
///
/// Run with:
///   cargo run --release
/// Then open http://127.0.0.1:7878
///
/// Settings are read from `digit-canvas.json` in the working directory when
/// it exists (see `AppConfig`).

mod handlers;
mod logging;
mod render;
mod routes;
mod state;

use std::process::ExitCode;

use tiny_http::Server;

use digit_canvas::{load_digit_model, AppConfig, CONFIG_FILE};

use state::App;

fn main() -> ExitCode {
    let config = match AppConfig::load(CONFIG_FILE) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::install_logger(&config.log_level);

    // The model is loaded exactly once; without it nothing can be served.
    let network = match load_digit_model(&config.model_path) {
        Ok(n) => n,
        Err(e) => {
            log::error!("cannot load model '{}': {}", config.model_path, e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("loaded model '{}' ({} layers)", config.model_path, network.layers.len());

    let server = match Server::http(&config.bind_addr) {
        Ok(s) => s,
        Err(e) => {
            log::error!("failed to bind {}: {}", config.bind_addr, e);
            return ExitCode::FAILURE;
        }
    };

    println!("╔══════════════════════════════════════════════╗");
    println!("║          digit-canvas                        ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Open in your browser:                       ║");
    println!("║  http://{:<37}║", config.bind_addr);
    println!("╚══════════════════════════════════════════════╝");

    let mut app = App::new(network, config.preprocess_options());
    log::info!(
        "listening on {} (interpolation: {:?}, channel order: {:?})",
        config.bind_addr, app.options.interpolation, app.options.channel_order
    );

    for request in server.incoming_requests() {
        routes::dispatch(request, &mut app);
    }

    ExitCode::SUCCESS
}
