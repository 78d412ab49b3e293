use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};

/// File extensions the store lists as images.
const LISTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

/// A directory of image files addressed by filename.
///
/// The store never mutates existing files. Uploads get a freshly generated
/// name, so concurrent writers cannot collide and no locking is needed.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> ImageStore {
        ImageStore { root: root.into() }
    }

    /// Creates the backing directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            Error::storage(format!("could not create '{}': {}", self.root.display(), e))
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Image ids currently in the store, sorted by name. Hidden files and
    /// non-image extensions are skipped; an unreadable directory lists empty.
    pub fn list_images(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.root.display(), error = %e, "could not list image store");
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries.flatten()
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().to_str().map(|s| s.to_owned()))
            .filter(|name| !name.starts_with('.'))
            .filter(|name| {
                extension_of(name)
                    .map(|ext| LISTED_EXTENSIONS.contains(&ext.as_str()))
                    .unwrap_or(false)
            })
            .collect();
        names.sort();
        names
    }

    /// Resolves an image id to the path of an existing file in the store.
    pub fn resolve(&self, image_id: &str) -> Result<PathBuf> {
        if !is_plain_file_name(image_id) {
            return Err(Error::not_found(format!("Image '{}' not found.", image_id)));
        }
        let path = self.root.join(image_id);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::not_found(format!("Image '{}' not found.", image_id)))
        }
    }

    /// Reads the raw bytes of a stored image.
    pub fn read(&self, image_id: &str) -> Result<Vec<u8>> {
        let path = self.resolve(image_id)?;
        std::fs::read(&path)
            .map_err(|e| Error::storage(format!("could not read '{}': {}", path.display(), e)))
    }

    /// Writes `bytes` under a newly generated `upload_<uuid><extension>` name
    /// and returns that name. `extension` includes the leading dot.
    pub fn store_unique(&self, bytes: &[u8], extension: &str) -> Result<String> {
        let image_id = unique_name(extension);
        let path = self.root.join(&image_id);

        // create_new: a collision is an error, never an overwrite.
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| Error::storage(format!("could not create '{}': {}", path.display(), e)))?;

        use std::io::Write;
        if let Err(e) = file.write_all(bytes).and_then(|_| file.sync_all()) {
            drop(file);
            let _ = std::fs::remove_file(&path);
            return Err(Error::storage(format!("could not write '{}': {}", path.display(), e)));
        }

        debug!(image_id = %image_id, bytes = bytes.len(), "stored upload");
        Ok(image_id)
    }

    /// Deletes a stored image.
    pub fn remove(&self, image_id: &str) -> Result<()> {
        let path = self.resolve(image_id)?;
        std::fs::remove_file(&path)
            .map_err(|e| Error::storage(format!("could not delete '{}': {}", path.display(), e)))
    }
}

/// Decodes the image at `path`, detecting the format from its content.
/// The extension is only a fallback for data no decoder recognises.
pub fn open_image(path: &Path) -> image::ImageResult<DynamicImage> {
    image::io::Reader::open(path)?.with_guessed_format()?.decode()
}

/// `upload_<32 hex chars><extension>`
pub fn unique_name(extension: &str) -> String {
    format!("upload_{}{}", Uuid::new_v4().simple(), extension)
}

/// Lower-cased extension without the dot, if the name has one.
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_ascii_lowercase())
}

/// Rejects ids that would escape the store directory.
fn is_plain_file_name(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains('/')
        && !id.contains('\\')
        && !id.contains('\0')
}
