use std::io::{Cursor, Read};
use std::time::Instant;

use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::{error, info, warn};

use lumen::Error;

use crate::handlers;
use crate::render::{html_escape, render, Template};
use crate::state::{AppState, SharedState};

pub type HttpResponse = Response<Cursor<Vec<u8>>>;

/// Multipart framing on top of the configured upload limit.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(field: &str, value: &str) -> Option<Header> {
    Header::from_bytes(field.as_bytes(), value.as_bytes()).ok()
}

fn bytes_with_status(status: u16, content_type: &str, bytes: Vec<u8>) -> HttpResponse {
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        header("Content-Type", content_type).into_iter().collect(),
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn html_response(status: u16, body: String) -> HttpResponse {
    bytes_with_status(status, "text/html; charset=utf-8", body.into_bytes())
}

pub fn json_response(body: String) -> HttpResponse {
    bytes_with_status(200, "application/json", body.into_bytes())
}

pub fn bytes_response(content_type: &str, bytes: Vec<u8>) -> HttpResponse {
    bytes_with_status(200, content_type, bytes)
}

pub fn not_found() -> HttpResponse {
    error_response(&Error::not_found("Page not found."), "/")
}

/// Converts an error into an HTML error page. Server-side failures are
/// logged with their detail; the page only ever shows the public message.
pub fn error_response(err: &Error, back_href: &str) -> HttpResponse {
    if err.is_server_error() {
        error!(error = %err, status = err.status_code(), "request failed");
    } else {
        info!(error = %err, status = err.status_code(), "request rejected");
    }

    let heading = if err.is_server_error() { "Something went wrong" } else { "Request problem" };
    let page = render(Template::Error, &[
        ("HEADING", heading.to_owned()),
        ("MESSAGE", html_escape(&err.public_message())),
        ("BACK_HREF", html_escape(back_href)),
    ]);
    html_response(err.status_code(), page)
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// The parts of a request the handlers look at, read off the connection up
/// front so routing does not depend on the socket.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub method: Method,
    pub path: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Reads one request, routes it, responds and logs the outcome.
pub fn dispatch(mut request: Request, state: SharedState) {
    let started = Instant::now();
    let method = request.method().clone();
    let url = request.url().to_owned();
    let path = match url.find('?') {
        Some(pos) => url[..pos].to_owned(),
        None => url.clone(),
    };

    let content_type = request.headers().iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default();

    let limit = state.config().max_upload_bytes + BODY_OVERHEAD_BYTES;
    let response = match read_body(&mut request, limit) {
        Ok(body) => route(&Inbound { method: method.clone(), path: path.clone(), content_type, body }, &state),
        Err(e) => error_response(&e, &path),
    };

    let status = response.status_code().0;
    if let Err(e) = request.respond(response) {
        warn!(method = %method, path = %path, error = %e, "could not send response");
        return;
    }
    info!(
        method = %method,
        path = %path,
        status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "handled request"
    );
}

/// Reads at most `limit` bytes of body; anything larger is rejected.
fn read_body(request: &mut Request, limit: usize) -> lumen::Result<Vec<u8>> {
    let too_large = || Error::validation(format!(
        "The request is too large (limit {}).", human_bytes(limit - BODY_OVERHEAD_BYTES)
    ));

    if request.body_length().map(|len| len > limit).unwrap_or(false) {
        return Err(too_large());
    }

    let mut body = Vec::new();
    request.as_reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| Error::validation(format!("Could not read the request body: {}", e)))?;
    if body.len() > limit {
        return Err(too_large());
    }
    Ok(body)
}

/// Maps a request to its handler.
pub fn route(req: &Inbound, state: &AppState) -> HttpResponse {
    // Stored image bytes, dynamic path segment.
    if req.method == Method::Get {
        if let Some(id) = req.path.strip_prefix("/images/") {
            return handlers::images::handle_get(id, state)
                .unwrap_or_else(|e| error_response(&e, "/"));
        }
    }

    let result = match (req.method.clone(), req.path.as_str()) {
        // ── Home / info ──────────────────────────────────────────────────
        (Method::Get, "/")     => Ok(handlers::home::handle_get(state)),
        (Method::Get, "/info") => handlers::info::handle_get(state),

        // ── Classification of stored images ──────────────────────────────
        (Method::Get,  "/classifications") => Ok(handlers::classify::handle_get(state)),
        (Method::Post, "/classifications") => handlers::classify::handle_post(&req.body, state),

        // ── Upload + classification ──────────────────────────────────────
        (Method::Get,  "/upload") => Ok(handlers::upload::handle_get(state)),
        (Method::Post, "/upload") => handlers::upload::handle_post(&req.content_type, &req.body, state),

        // ── Histogram ────────────────────────────────────────────────────
        (Method::Get,  "/histogram/select") => Ok(handlers::histogram::handle_get(state)),
        (Method::Post, "/histogram/select") => handlers::histogram::handle_post(&req.body, state),

        // ── 404 ──────────────────────────────────────────────────────────
        _ => return not_found(),
    };

    result.unwrap_or_else(|e| error_response(&e, &req.path))
}

pub fn human_bytes(n: usize) -> String {
    const MB: usize = 1024 * 1024;
    const KB: usize = 1024;
    if n >= MB && n % MB == 0 {
        format!("{} MB", n / MB)
    } else if n >= KB {
        format!("{:.1} KB", n as f64 / KB as f64)
    } else {
        format!("{} bytes", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use image::{GrayImage, Luma};
    use lumen::{ClassificationScores, Classifier, Configuration, Service};

    /// Knows exactly one model, "stub".
    struct StubClassifier;

    impl Classifier for StubClassifier {
        fn classify(&self, model_id: &str, _image_id: &str) -> lumen::Result<ClassificationScores> {
            if model_id != "stub" {
                return Err(Error::classification(format!("unknown model '{}'", model_id)));
            }
            Ok([("cat".to_owned(), 0.75), ("dog".to_owned(), 0.25)].into_iter().collect())
        }
    }

    fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        GrayImage::from_pixel(10, 10, Luma([0])).save(dir.path().join("black.png")).unwrap();
        let config = Configuration {
            image_dir: dir.path().to_owned(),
            model_dir: dir.path().join("models"),
            models: vec!["stub".into()],
            ..Default::default()
        };
        let service = Service::new(config, Arc::new(StubClassifier));
        (dir, AppState { service })
    }

    fn get(path: &str) -> Inbound {
        Inbound { method: Method::Get, path: path.into(), content_type: String::new(), body: Vec::new() }
    }

    fn post_form(path: &str, body: &str) -> Inbound {
        Inbound {
            method: Method::Post,
            path: path.into(),
            content_type: "application/x-www-form-urlencoded".into(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn post_upload(filename: &str, bytes: &[u8], model_id: &str) -> Inbound {
        let mut body = Vec::new();
        body.extend_from_slice(b"--BOUND\r\nContent-Disposition: form-data; name=\"model_id\"\r\n\r\n");
        body.extend_from_slice(model_id.as_bytes());
        body.extend_from_slice(b"\r\n--BOUND\r\n");
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\r\n", filename).as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n--BOUND--\r\n");
        Inbound {
            method: Method::Post,
            path: "/upload".into(),
            content_type: "multipart/form-data; boundary=BOUND".into(),
            body,
        }
    }

    fn body_text(resp: HttpResponse) -> String {
        let mut text = String::new();
        resp.into_reader().read_to_string(&mut text).unwrap();
        text
    }

    fn uploads(dir: &tempfile::TempDir) -> Vec<String> {
        std::fs::read_dir(dir.path()).unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("upload_"))
            .collect()
    }

    #[test]
    fn pages_render() {
        let (_dir, st) = state();
        for path in ["/", "/info", "/classifications", "/upload", "/histogram/select", "/images/black.png"] {
            assert_eq!(route(&get(path), &st).status_code().0, 200, "{}", path);
        }
    }

    #[test]
    fn unknown_routes_are_404() {
        let (_dir, st) = state();
        assert_eq!(route(&get("/nope"), &st).status_code().0, 404);
        assert_eq!(route(&get("/images/..%2Fsecret"), &st).status_code().0, 404);
        assert_eq!(route(&get("/images/missing.png"), &st).status_code().0, 404);
    }

    #[test]
    fn classification_of_existing_image() {
        let (_dir, st) = state();
        let ok = route(&post_form("/classifications", "image_id=black.png&model_id=stub"), &st);
        assert_eq!(ok.status_code().0, 200);

        let missing = route(&post_form("/classifications", "image_id=ghost.png&model_id=stub"), &st);
        assert_eq!(missing.status_code().0, 404);

        let bad_model = route(&post_form("/classifications", "image_id=black.png&model_id=other"), &st);
        assert_eq!(bad_model.status_code().0, 500);

        let no_fields = route(&post_form("/classifications", ""), &st);
        assert_eq!(no_fields.status_code().0, 400);
    }

    #[test]
    fn histogram_of_existing_and_missing_image() {
        let (_dir, st) = state();
        assert_eq!(route(&post_form("/histogram/select", "image_id=black.png"), &st).status_code().0, 200);
        assert_eq!(route(&post_form("/histogram/select", "image_id=ghost.png"), &st).status_code().0, 404);
        assert_eq!(route(&post_form("/histogram/select", ""), &st).status_code().0, 400);
    }

    #[test]
    fn upload_stores_and_classifies() {
        let (dir, st) = state();
        let resp = route(&post_upload("photo", b"\xff\xd8\xff\xe0jpeg-ish", "stub"), &st);
        assert_eq!(resp.status_code().0, 200);

        let stored = uploads(&dir);
        assert_eq!(stored.len(), 1);
        assert!(stored[0].ends_with(".jpg"));
    }

    #[test]
    fn failed_classification_leaves_no_upload() {
        let (dir, st) = state();
        let resp = route(&post_upload("cat.png", b"\x89PNG", "unknown"), &st);
        assert_eq!(resp.status_code().0, 500);
        assert!(uploads(&dir).is_empty());

        let page = body_text(resp);
        assert!(page.contains(&html_escape(&Error::classification("").public_message())));
        assert!(!page.contains("unknown model"));
    }

    #[test]
    fn rejected_uploads_write_nothing() {
        let (dir, st) = state();
        assert_eq!(route(&post_upload("cat.gif", b"GIF89a", "stub"), &st).status_code().0, 400);
        assert_eq!(route(&post_upload("cat.png", b"", "stub"), &st).status_code().0, 400);
        assert_eq!(route(&post_upload("", b"data", "stub"), &st).status_code().0, 400);
        assert!(uploads(&dir).is_empty());

        let mut not_multipart = post_form("/upload", "model_id=stub");
        not_multipart.content_type = "application/x-www-form-urlencoded".into();
        assert_eq!(route(&not_multipart, &st).status_code().0, 400);
    }

    #[test]
    fn human_readable_sizes() {
        assert_eq!(human_bytes(10 * 1024 * 1024), "10 MB");
        assert_eq!(human_bytes(1536), "1.5 KB");
        assert_eq!(human_bytes(12), "12 bytes");
    }
}
