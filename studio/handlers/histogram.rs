use lumen::{HistogramReport, Result};

use crate::handlers::classify::required;
use crate::render::{html_escape, options_html, render, Template};
use crate::routes::{html_response, HttpResponse};
use crate::state::AppState;
use crate::util::form::{parse_form, path_encode};

// ---------------------------------------------------------------------------
// GET /histogram/select
// ---------------------------------------------------------------------------

pub fn handle_get(state: &AppState) -> HttpResponse {
    let images = state.service.list_images();
    let page = render(Template::HistogramSelect, &[
        ("IMAGE_OPTIONS", options_html(&images, "", "No images in the store")),
    ]);
    html_response(200, page)
}

// ---------------------------------------------------------------------------
// POST /histogram/select
// ---------------------------------------------------------------------------

pub fn handle_post(body: &[u8], state: &AppState) -> Result<HttpResponse> {
    let pairs = parse_form(&String::from_utf8_lossy(body));
    let image_id = required(&pairs, "image_id", "Please choose an image.")?;

    let report = state.service.histogram(&image_id)?;
    Ok(html_response(200, render_histogram(&report)))
}

fn render_histogram(report: &HistogramReport) -> String {
    let counts = report.histogram.counts();
    // Most frequent intensity; lowest wins a tie.
    let peak = counts.iter()
        .enumerate()
        .fold((0usize, 0u64), |best, (i, &c)| if c > best.1 { (i, c) } else { best })
        .0;

    render(Template::HistogramOutput, &[
        ("IMAGE_ID", html_escape(&report.image_id)),
        ("IMAGE_URL_ID", path_encode(&report.image_id)),
        ("PIXEL_COUNT", report.histogram.total().to_string()),
        ("PEAK_INTENSITY", peak.to_string()),
        ("HISTOGRAM_IMG", report.chart_png_base64.clone()),
    ])
}
