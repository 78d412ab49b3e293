/// Template renderer for the lumen studio.
///
/// Every page is a small HTML fragment (`studio/assets/*.html`) with
/// `{{TOKEN}}` placeholders, embedded at compile time and wrapped in the
/// shared `layout.html`. Values are inserted verbatim: callers escape
/// anything user-controlled with [`html_escape`].
///
/// Placeholders left unfilled are blanked so that a missed token never
/// shows up as raw `{{TOKEN}}` in the browser. Substitution is a single
/// pass, so braces inside inserted values are kept as written.

const LAYOUT: &str = include_str!("assets/layout.html");

/// The named templates the studio can render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Template {
    Home,
    ClassificationSelect,
    ClassificationUpload,
    ClassificationOutput,
    HistogramSelect,
    HistogramOutput,
    Error,
}

impl Template {
    pub fn name(self) -> &'static str {
        match self {
            Template::Home                 => "home.html",
            Template::ClassificationSelect => "classification_select.html",
            Template::ClassificationUpload => "classification_upload.html",
            Template::ClassificationOutput => "classification_output.html",
            Template::HistogramSelect      => "histogram_select.html",
            Template::HistogramOutput      => "histogram_output.html",
            Template::Error                => "error.html",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Template::Home                 => "Home",
            Template::ClassificationSelect => "Classify an image",
            Template::ClassificationUpload => "Upload and classify",
            Template::ClassificationOutput => "Classification result",
            Template::HistogramSelect      => "Image histogram",
            Template::HistogramOutput      => "Histogram result",
            Template::Error                => "Error",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Template::Home                 => include_str!("assets/home.html"),
            Template::ClassificationSelect => include_str!("assets/classification_select.html"),
            Template::ClassificationUpload => include_str!("assets/classification_upload.html"),
            Template::ClassificationOutput => include_str!("assets/classification_output.html"),
            Template::HistogramSelect      => include_str!("assets/histogram_select.html"),
            Template::HistogramOutput      => include_str!("assets/histogram_output.html"),
            Template::Error                => include_str!("assets/error.html"),
        }
    }
}

/// Renders `template` with `values` (`("IMAGE_ID", ...)` fills `{{IMAGE_ID}}`)
/// inside the page layout.
pub fn render(template: Template, values: &[(&str, String)]) -> String {
    tracing::debug!(template = template.name(), values = values.len(), "rendering page");
    let body = fill(template.source(), |key| {
        values.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    });
    fill(LAYOUT, |key| match key {
        "TITLE" => Some(template.title()),
        "CONTENT" => Some(body.as_str()),
        _ => None,
    })
}

/// Single pass over `source`: every `{{TOKEN}}` is replaced by `lookup`, or
/// blanked when it has no value. Inserted text is never scanned again.
fn fill<'a>(source: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) if is_token(&after[..end]) => {
                out.push_str(lookup(&after[..end]).unwrap_or(""));
                rest = &after[end + 2..];
            }
            _ => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
     .replace('<', "&lt;")
     .replace('>', "&gt;")
     .replace('"', "&quot;")
     .replace('\'', "&#39;")
}

/// `<option>` list for a `<select>`, marking `selected` if present.
pub fn options_html(values: &[String], selected: &str, empty_text: &str) -> String {
    if values.is_empty() {
        return format!("<option value=\"\" disabled selected>{}</option>", html_escape(empty_text));
    }
    values.iter().map(|v| {
        let sel = if v == selected { " selected" } else { "" };
        format!("<option value=\"{0}\"{1}>{0}</option>", html_escape(v), sel)
    }).collect::<Vec<_>>().join("\n")
}
