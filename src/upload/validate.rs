use crate::error::{Error, Result};
use crate::store::image_store::extension_of;

/// Extensions accepted for upload, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Extension given to uploads whose original name has none.
pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Checks an inbound upload and returns the extension (with dot, lower-cased)
/// its stored copy will get.
///
/// Rejects a missing filename, empty content and any extension outside
/// [`ALLOWED_EXTENSIONS`]. A name without an extension is accepted and
/// stored as `.jpg`.
pub fn validate_upload(filename: Option<&str>, bytes: &[u8]) -> Result<String> {
    let filename = filename.map(str::trim).unwrap_or("");
    if filename.is_empty() {
        return Err(Error::validation("No file was selected."));
    }
    if bytes.is_empty() {
        return Err(Error::validation("The uploaded file is empty."));
    }

    // Browsers on Windows may send a full path.
    let base = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename);

    match extension_of(base) {
        None => Ok(DEFAULT_EXTENSION.to_owned()),
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(format!(".{}", ext)),
        Some(ext) => Err(Error::validation(format!(
            "Files of type '.{}' are not supported. Allowed: .jpg, .jpeg, .png.",
            ext
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_extensions_any_case() {
        assert_eq!(validate_upload(Some("cat.PNG"), b"x").unwrap(), ".png");
        assert_eq!(validate_upload(Some("cat.Jpeg"), b"x").unwrap(), ".jpeg");
        assert_eq!(validate_upload(Some("cat.jpg"), b"x").unwrap(), ".jpg");
    }

    #[test]
    fn no_extension_defaults_to_jpg() {
        assert_eq!(validate_upload(Some("photo"), b"x").unwrap(), ".jpg");
    }

    #[test]
    fn windows_paths_use_the_base_name() {
        assert_eq!(validate_upload(Some(r"C:\Users\me\cat.png"), b"x").unwrap(), ".png");
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(validate_upload(None, b"x"), Err(Error::Validation(_))));
        assert!(matches!(validate_upload(Some("  "), b"x"), Err(Error::Validation(_))));
        assert!(matches!(validate_upload(Some("cat.png"), b""), Err(Error::Validation(_))));
        assert!(matches!(validate_upload(Some("cat.gif"), b"x"), Err(Error::Validation(_))));
        assert!(matches!(validate_upload(Some("run.exe"), b"x"), Err(Error::Validation(_))));
    }
}
