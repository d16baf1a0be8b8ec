//! Page and fragment rendering for the digit canvas server.
//!
//! The page is a single HTML template (`server/assets/index.html`) with
//! `{{TOKEN}}` placeholders, embedded at compile time.  Result fragments are
//! small HTML snippets the page swaps into its result area.

use digit_canvas::{PredictionResult, CANVAS_SIZE, STROKE_WIDTH};

const TEMPLATE: &str = include_str!("assets/index.html");

/// Renders the drawing page for canvas `version`.
///
/// `fill` substitutes any page-specific placeholders; tokens left over
/// afterwards are blanked.
pub fn render_page<F>(version: u64, fill: F) -> String
where
    F: FnOnce(String) -> String,
{
    let mut html = TEMPLATE.to_owned();

    html = html.replace("{{CANVAS_VERSION}}", &version.to_string());
    html = html.replace("{{CANVAS_SIZE}}",    &CANVAS_SIZE.to_string());
    html = html.replace("{{STROKE_WIDTH}}",   &STROKE_WIDTH.to_string());

    html = fill(html);

    blank_remaining(html)
}

/// Replaces any `{{TOKEN}}` that wasn't substituted with an empty string.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}

pub fn prediction_html(result: &PredictionResult) -> String {
    format!(
        r#"<div class="result-card success"><div class="prediction-hero">{name}</div>
<div class="prediction-sub">Confidence: {conf}</div></div>"#,
        name = html_escape(&result.name),
        conf = result.confidence_text(),
    )
}

pub fn warning_html(msg: &str) -> String {
    format!(r#"<div class="result-card warning">{}</div>"#, html_escape(msg))
}

pub fn error_html(msg: &str) -> String {
    format!(r#"<div class="result-card error">{}</div>"#, html_escape(msg))
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
     .replace('<', "&lt;")
     .replace('>', "&gt;")
     .replace('"', "&quot;")
}
