use tracing::info;

use crate::classify::classifier::Classifier;
use crate::classify::request::{classify_image, Classification, ImageSource};
use crate::error::Result;
use crate::store::image_store::ImageStore;
use crate::upload::validate::validate_upload;

/// A file received from the client.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    /// Original filename as sent by the client, if any.
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// Validates, stores and classifies one upload.
///
/// Validation failures write nothing. A classification failure removes the
/// stored file before the error is returned.
pub fn upload_and_classify(
    store: &ImageStore,
    classifier: &dyn Classifier,
    model_id: &str,
    file: &UploadedFile,
) -> Result<Classification> {
    let extension = validate_upload(file.filename.as_deref(), &file.bytes)?;
    let image_id = store.store_unique(&file.bytes, &extension)?;
    info!(
        image_id = %image_id,
        original = file.filename.as_deref().unwrap_or(""),
        bytes = file.bytes.len(),
        "upload stored"
    );
    classify_image(store, classifier, model_id, ImageSource::Uploaded(image_id))
}
