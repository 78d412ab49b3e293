use crate::render::{render, Template};
use crate::routes::{html_response, HttpResponse};
use crate::state::AppState;

/// `GET /`
pub fn handle_get(state: &AppState) -> HttpResponse {
    let page = render(Template::Home, &[
        ("MODEL_COUNT", state.service.models().len().to_string()),
        ("IMAGE_COUNT", state.service.list_images().len().to_string()),
    ]);
    html_response(200, page)
}
