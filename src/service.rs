use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::classify::classifier::Classifier;
use crate::classify::model_classifier::ModelClassifier;
use crate::classify::request::{classify_image, Classification, ImageSource};
use crate::config::configuration::Configuration;
use crate::error::Result;
use crate::histogram::chart::render_base64;
use crate::histogram::histogram::Histogram;
use crate::store::image_store::ImageStore;
use crate::upload::upload::{upload_and_classify, UploadedFile};

/// Available models and images, as served by `/info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    pub models: Vec<String>,
    pub images: Vec<String>,
}

/// A computed histogram plus its rendered chart.
#[derive(Debug, Clone)]
pub struct HistogramReport {
    pub image_id: String,
    pub histogram: Histogram,
    /// Base64-encoded PNG chart.
    pub chart_png_base64: String,
}

/// The operations behind every route, wired to one configuration.
///
/// Holds no mutable state, so a single instance is shared by all request
/// threads.
pub struct Service {
    config: Configuration,
    store: ImageStore,
    classifier: Arc<dyn Classifier>,
}

impl Service {
    pub fn new(config: Configuration, classifier: Arc<dyn Classifier>) -> Service {
        let store = ImageStore::new(&config.image_dir);
        Service { config, store, classifier }
    }

    /// Service using the bundled JSON model classifier.
    pub fn with_model_classifier(config: Configuration) -> Service {
        let classifier = Arc::new(ModelClassifier::new(&config));
        Service::new(config, classifier)
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub fn models(&self) -> &[String] {
        &self.config.models
    }

    pub fn list_images(&self) -> Vec<String> {
        self.store.list_images()
    }

    pub fn info(&self) -> Info {
        Info { models: self.config.models.clone(), images: self.list_images() }
    }

    /// Classifies an image that is already in the store.
    pub fn classify_existing(&self, model_id: &str, image_id: &str) -> Result<Classification> {
        classify_image(
            &self.store,
            self.classifier.as_ref(),
            model_id,
            ImageSource::Existing(image_id.to_owned()),
        )
    }

    /// Stores a new upload and classifies it.
    pub fn upload_and_classify(&self, model_id: &str, file: &UploadedFile) -> Result<Classification> {
        upload_and_classify(&self.store, self.classifier.as_ref(), model_id, file)
    }

    /// Computes and renders the histogram of a stored image.
    pub fn histogram(&self, image_id: &str) -> Result<HistogramReport> {
        let path = self.store.resolve(image_id)?;
        let histogram = Histogram::open(&path)?;
        let chart_png_base64 = render_base64(&histogram)?;
        info!(image_id, pixels = histogram.total(), "histogram rendered");
        Ok(HistogramReport { image_id: image_id.to_owned(), histogram, chart_png_base64 })
    }
}
