use tracing::{info, warn};

use crate::classify::classifier::{ClassificationScores, Classifier};
use crate::error::{Error, Result};
use crate::store::image_store::ImageStore;

/// Where the image being classified came from.
///
/// Both the selection flow and the upload flow classify through
/// [`classify_image`]; only a freshly uploaded image is removed again when
/// classification fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// An image that was already in the store.
    Existing(String),
    /// An image the current request just wrote to the store.
    Uploaded(String),
}

impl ImageSource {
    pub fn image_id(&self) -> &str {
        match self {
            ImageSource::Existing(id) | ImageSource::Uploaded(id) => id,
        }
    }
}

/// Outcome of a successful classification.
#[derive(Debug, Clone)]
pub struct Classification {
    pub image_id: String,
    pub model_id: String,
    pub scores: ClassificationScores,
}

/// Classifies one image with one model.
///
/// An `Existing` image must resolve in the store (`NotFound` otherwise). Any
/// classifier failure becomes `Error::Classification`; for an `Uploaded`
/// image the file is deleted first (best effort).
pub fn classify_image(
    store: &ImageStore,
    classifier: &dyn Classifier,
    model_id: &str,
    source: ImageSource,
) -> Result<Classification> {
    let image_id = source.image_id().to_owned();
    if let ImageSource::Existing(id) = &source {
        store.resolve(id)?;
    }

    match classifier.classify(model_id, &image_id) {
        Ok(scores) => {
            info!(image_id = %image_id, model_id, labels = scores.len(), "classified image");
            Ok(Classification { image_id, model_id: model_id.to_owned(), scores })
        }
        Err(err) => {
            if let ImageSource::Uploaded(id) = &source {
                cleanup_upload(store, id);
            }
            Err(match err {
                Error::Classification(msg) => Error::Classification(msg),
                other => Error::classification(other.to_string()),
            })
        }
    }
}

fn cleanup_upload(store: &ImageStore, image_id: &str) {
    match store.remove(image_id) {
        Ok(()) => info!(image_id, "removed upload after failed classification"),
        Err(e) => warn!(image_id, error = %e, "could not remove orphaned upload"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<f64>);

    impl Classifier for Fixed {
        fn classify(&self, _model_id: &str, _image_id: &str) -> Result<ClassificationScores> {
            match &self.0 {
                Ok(v) => Ok([("label".to_owned(), *v)].into_iter().collect()),
                Err(e) => Err(Error::classification(e.to_string())),
            }
        }
    }

    #[test]
    fn existing_image_is_kept_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cat.png"), b"x").unwrap();
        let store = ImageStore::new(dir.path());

        let failing = Fixed(Err(Error::classification("boom")));
        let err = classify_image(&store, &failing, "m", ImageSource::Existing("cat.png".into()))
            .unwrap_err();
        assert!(matches!(err, Error::Classification(_)));
        assert!(dir.path().join("cat.png").exists());
    }

    #[test]
    fn uploaded_image_is_removed_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let id = store.store_unique(b"x", ".png").unwrap();

        let failing = Fixed(Err(Error::classification("boom")));
        let err = classify_image(&store, &failing, "m", ImageSource::Uploaded(id.clone()))
            .unwrap_err();
        assert!(matches!(err, Error::Classification(_)));
        assert!(!dir.path().join(&id).exists());
    }

    #[test]
    fn missing_existing_image_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let ok = Fixed(Ok(1.0));
        let err = classify_image(&store, &ok, "m", ImageSource::Existing("ghost.png".into()))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn success_carries_scores() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cat.png"), b"x").unwrap();
        let store = ImageStore::new(dir.path());
        let ok = Fixed(Ok(0.9));
        let result = classify_image(&store, &ok, "m", ImageSource::Existing("cat.png".into()))
            .unwrap();
        assert_eq!(result.image_id, "cat.png");
        assert_eq!(result.scores["label"], 0.9);
    }
}
