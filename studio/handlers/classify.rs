use lumen::{ranked, Classification, Error, Result};

use crate::render::{html_escape, options_html, render, Template};
use crate::routes::{html_response, HttpResponse};
use crate::state::AppState;
use crate::util::form::{form_get, parse_form, path_encode};

// ---------------------------------------------------------------------------
// GET /classifications
// ---------------------------------------------------------------------------

pub fn handle_get(state: &AppState) -> HttpResponse {
    let images = state.service.list_images();
    let page = render(Template::ClassificationSelect, &[
        ("IMAGE_OPTIONS", options_html(&images, "", "No images in the store")),
        ("MODEL_OPTIONS", options_html(state.service.models(), "", "No models configured")),
    ]);
    html_response(200, page)
}

// ---------------------------------------------------------------------------
// POST /classifications
// ---------------------------------------------------------------------------

pub fn handle_post(body: &[u8], state: &AppState) -> Result<HttpResponse> {
    let pairs = parse_form(&String::from_utf8_lossy(body));
    let image_id = required(&pairs, "image_id", "Please choose an image.")?;
    let model_id = required(&pairs, "model_id", "Please choose a model.")?;

    let result = state.service.classify_existing(&model_id, &image_id)?;
    Ok(html_response(200, render_classification(&result)?))
}

/// Trimmed, non-empty form value or a validation error with `missing_msg`.
pub fn required(pairs: &[(String, String)], key: &str, missing_msg: &str) -> Result<String> {
    form_get(pairs, key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::validation(missing_msg))
}

// ---------------------------------------------------------------------------
// Output page (shared with the upload flow)
// ---------------------------------------------------------------------------

pub fn render_classification(result: &Classification) -> Result<String> {
    let ranked = ranked(&result.scores);
    let (top_label, top_conf) = ranked.first()
        .map(|(l, v)| (html_escape(l), format!("{:.1}%", v * 100.0)))
        .unwrap_or_else(|| ("—".into(), "—".into()));

    let rows: String = ranked.iter().enumerate().map(|(i, (label, score))| {
        let width = (score.clamp(0.0, 1.0) * 260.0) as u32;
        let dim = if i > 0 { " dim" } else { "" };
        format!(
            r#"<tr><td style="font-weight:600">{}</td><td><div class="bar-wrap"><div class="bar-fill{}" style="width:{}px"></div></div></td><td>{:.1}%</td></tr>"#,
            html_escape(label), dim, width, score * 100.0
        )
    }).collect::<Vec<_>>().join("\n");

    // Embedded in <script>; "</" must not close the tag early.
    let scores_json = serde_json::to_string(&result.scores)
        .map_err(|e| Error::render(e.to_string()))?
        .replace("</", "<\\/");

    Ok(render(Template::ClassificationOutput, &[
        ("IMAGE_ID", html_escape(&result.image_id)),
        ("IMAGE_URL_ID", path_encode(&result.image_id)),
        ("MODEL_ID", html_escape(&result.model_id)),
        ("TOP_LABEL", top_label),
        ("TOP_CONFIDENCE", top_conf),
        ("SCORE_ROWS", rows),
        ("SCORES_JSON", scores_json),
    ]))
}
