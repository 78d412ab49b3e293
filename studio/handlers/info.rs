use lumen::{Error, Result};

use crate::routes::{json_response, HttpResponse};
use crate::state::AppState;

/// `GET /info`
///
/// `{"models": [...], "images": [...]}` for scripts and the browser alike.
pub fn handle_get(state: &AppState) -> Result<HttpResponse> {
    let json = serde_json::to_string(&state.service.info())
        .map_err(|e| Error::render(e.to_string()))?;
    Ok(json_response(json))
}
