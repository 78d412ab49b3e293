use lumen::Result;

use crate::routes::{bytes_response, HttpResponse};
use crate::state::AppState;
use crate::util::form::path_decode;

/// `GET /images/{image_id}`
///
/// Serves the raw bytes of a stored image so result pages can show it.
pub fn handle_get(raw_id: &str, state: &AppState) -> Result<HttpResponse> {
    let image_id = path_decode(raw_id);
    let bytes = state.service.store().read(&image_id)?;
    Ok(bytes_response(content_type_for(&image_id), bytes))
}

fn content_type_for(image_id: &str) -> &'static str {
    match lumen::store::image_store::extension_of(image_id).as_deref() {
        Some("png")          => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif")          => "image/gif",
        Some("bmp")          => "image/bmp",
        _                    => "application/octet-stream",
    }
}
