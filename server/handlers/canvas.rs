use std::io::Cursor;
use tiny_http::{Request, Response};

use digit_canvas::{PredictOutcome, RawCanvasImage};

use crate::render::{error_html, prediction_html, render_page, warning_html, html_escape};
use crate::routes::{html_response, query_get, redirect};
use crate::state::App;

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

pub fn handle_index(app: &App) -> Response<Cursor<Vec<u8>>> {
    let description = app.model_description();
    let page = render_page(app.session.version(), |tmpl| {
        tmpl.replace("{{MODEL_DESCRIPTION}}", &html_escape(&description))
    });
    html_response(200, page)
}

// ---------------------------------------------------------------------------
// POST /predict?version=N
// ---------------------------------------------------------------------------

pub fn handle_predict(request: &mut Request, query: &str, app: &mut App) -> Response<Cursor<Vec<u8>>> {
    let mut body = Vec::new();
    if let Err(e) = request.as_reader().read_to_end(&mut body) {
        log::warn!("could not read predict body: {}", e);
        return html_response(400, error_html("Could not read the canvas data."));
    }
    let (status, fragment) = predict_fragment(app, query, body);
    html_response(status, fragment)
}

/// Handles one predict action given the raw query string and body.
/// Returns the HTTP status and the result fragment.
pub fn predict_fragment(app: &mut App, query: &str, body: Vec<u8>) -> (u16, String) {
    let version = match query_get(query, "version").and_then(|v| v.parse::<u64>().ok()) {
        Some(v) => v,
        None => {
            log::warn!("predict without a valid canvas version (query: {:?})", query);
            return (400, error_html("Missing or invalid canvas version."));
        }
    };

    // An empty body means the user never touched the canvas.
    let canvas = if body.is_empty() {
        None
    } else {
        match RawCanvasImage::from_bytes(body) {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("rejected canvas raster: {}", e);
                return (400, error_html(&format!("Malformed canvas: {}", e)));
            }
        }
    };
    // A tab showing a cleared canvas must not see the live canvas's result.
    if !app.session.submit(version, canvas) {
        log::info!("predict for stale canvas version {} ignored", version);
        return (200, warning_html("Please draw a digit first!"));
    }

    match app.session.predict(&app.classifier, &app.options) {
        Ok(PredictOutcome::NoDrawing) => {
            log::info!("predict requested with no drawing");
            (200, warning_html("Please draw a digit first!"))
        }
        Ok(PredictOutcome::Prediction(result)) => {
            log::info!("predicted {} ({}) with confidence {}", result.label, result.name, result.confidence_text());
            (200, prediction_html(&result))
        }
        Err(e) => {
            log::error!("classifier failed: {}", e);
            (500, error_html(&format!("Classification failed: {}", e)))
        }
    }
}

// ---------------------------------------------------------------------------
// POST /clear
// ---------------------------------------------------------------------------

pub fn handle_clear(app: &mut App) -> Response<Cursor<Vec<u8>>> {
    app.session.clear();
    redirect("/")
}
