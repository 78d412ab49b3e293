use lumen::{Error, Result, UploadedFile};

use crate::handlers::classify::render_classification;
use crate::render::{options_html, render, Template};
use crate::routes::{html_response, human_bytes, HttpResponse};
use crate::state::AppState;
use crate::util::multipart::{extract_boundary, file_part, parse_parts, text_field};

// ---------------------------------------------------------------------------
// GET /upload
// ---------------------------------------------------------------------------

pub fn handle_get(state: &AppState) -> HttpResponse {
    let page = render(Template::ClassificationUpload, &[
        ("MODEL_OPTIONS", options_html(state.service.models(), "", "No models configured")),
        ("MAX_UPLOAD", human_bytes(state.config().max_upload_bytes)),
    ]);
    html_response(200, page)
}

// ---------------------------------------------------------------------------
// POST /upload
// ---------------------------------------------------------------------------

/// Multipart fields: `file` (the image) and `model_id`.
pub fn handle_post(content_type: &str, body: &[u8], state: &AppState) -> Result<HttpResponse> {
    if !content_type.starts_with("multipart/form-data") {
        return Err(Error::validation("Expected a multipart/form-data upload."));
    }
    let boundary = extract_boundary(content_type)
        .ok_or_else(|| Error::validation("Invalid multipart request."))?;
    let parts = parse_parts(body, &boundary);

    let model_id = text_field(&parts, "model_id")
        .map(|m| m.trim().to_owned())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| Error::validation("Please choose a model."))?;

    let file = file_part(&parts, "file")
        .map(|p| UploadedFile {
            filename: p.filename.clone().filter(|f| !f.trim().is_empty()),
            bytes: p.data.clone(),
        })
        .unwrap_or_default();

    let limit = state.config().max_upload_bytes;
    if file.bytes.len() > limit {
        return Err(Error::validation(format!(
            "The file is too large (limit {}).", human_bytes(limit)
        )));
    }

    let result = state.service.upload_and_classify(&model_id, &file)?;
    Ok(html_response(200, render_classification(&result)?))
}
