/// Decodes a percent-encoded form value (`%XX`) and converts `+` to space.
///
/// Decoding happens on bytes, so multi-byte UTF-8 sequences survive; invalid
/// sequences are replaced with U+FFFD.
pub fn url_decode(s: &str) -> String {
    percent_decode(s, true)
}

/// Decodes a percent-encoded path segment; `+` stays literal.
pub fn path_decode(s: &str) -> String {
    percent_decode(s, false)
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
pub fn path_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

fn percent_decode(s: &str, plus_as_space: bool) -> String {
    let bytes = s.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' if plus_as_space => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        out.push(((h << 4) | l) as u8);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Parses `key=value&key2=value2` into a `Vec` of `(key, value)` pairs.
pub fn parse_form(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut it = pair.splitn(2, '=');
            let k = it.next()?.to_owned();
            let v = it.next().unwrap_or("").to_owned();
            Some((url_decode(&k), url_decode(&v)))
        })
        .collect()
}

/// Looks up a key in parsed form pairs, returning the value if found.
pub fn form_get<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plus_and_percent() {
        assert_eq!(url_decode("my+cat%2Epng"), "my cat.png");
        assert_eq!(url_decode("caf%C3%A9.jpg"), "café.jpg");
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
    }

    #[test]
    fn path_segments_keep_plus() {
        assert_eq!(path_decode("a+b%20c.png"), "a+b c.png");
        assert_eq!(path_encode("a+b c.png"), "a%2Bb%20c.png");
        assert_eq!(path_decode(&path_encode("café 1.jpg")), "café 1.jpg");
    }

    #[test]
    fn parses_pairs() {
        let pairs = parse_form("image_id=cat.png&model_id=mnist&empty=");
        assert_eq!(form_get(&pairs, "image_id"), Some("cat.png"));
        assert_eq!(form_get(&pairs, "model_id"), Some("mnist"));
        assert_eq!(form_get(&pairs, "empty"), Some(""));
        assert_eq!(form_get(&pairs, "missing"), None);
        assert!(parse_form("").is_empty());
    }
}
