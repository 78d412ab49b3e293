/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    /// `Some` for file inputs; may be `Some("")` when no file was chosen.
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`, returning the pieces
/// between occurrences (excluding the needle itself).
pub fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with("boundary="))
        .map(|s| s["boundary=".len()..].trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

/// Splits a multipart body into its named parts. Parts without a
/// `Content-Disposition` name are skipped.
///
/// A delimiter is only recognised at the start of a line, so part data may
/// contain `--boundary` anywhere else.
pub fn parse_parts(body: &[u8], boundary: &str) -> Vec<Part> {
    let delimiter = format!("\r\n--{}", boundary);
    let sep = b"\r\n\r\n";
    let mut parts = Vec::new();

    // The first delimiter has no preceding line break of its own.
    let mut framed = Vec::with_capacity(body.len() + 2);
    framed.extend_from_slice(b"\r\n");
    framed.extend_from_slice(body);

    for raw in split_on(&framed, delimiter.as_bytes()) {
        let Some(sep_pos) = find_subsequence(raw, sep) else {
            continue;
        };
        let headers = String::from_utf8_lossy(&raw[..sep_pos]);
        let Some(name) = disposition_param(&headers, "name") else {
            continue;
        };
        let filename = disposition_param(&headers, "filename");

        let data = &raw[sep_pos + sep.len()..];
        parts.push(Part { name, filename, data: data.to_vec() });
    }
    parts
}

/// First part named `name` that is a file input.
pub fn file_part<'a>(parts: &'a [Part], name: &str) -> Option<&'a Part> {
    parts.iter().find(|p| p.name == name && p.filename.is_some())
}

/// Value of the first non-file part named `name`.
pub fn text_field(parts: &[Part], name: &str) -> Option<String> {
    parts.iter()
        .find(|p| p.name == name && p.filename.is_none())
        .and_then(|p| String::from_utf8(p.data.clone()).ok())
}

/// Parses `key="value"` out of a Content-Disposition header block. The key
/// must start a parameter, so `name` does not match inside `filename`.
fn disposition_param(headers: &str, key: &str) -> Option<String> {
    let line = headers
        .lines()
        .find(|l| l.to_ascii_lowercase().starts_with("content-disposition:"))?;
    line.split(';')
        .skip(1)
        .map(|p| p.trim())
        .find_map(|p| {
            let (k, v) = p.split_once('=')?;
            if k.trim().eq_ignore_ascii_case(key) {
                Some(v.trim().trim_matches('"').to_owned())
            } else {
                None
            }
        })
}
