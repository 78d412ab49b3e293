use tracing::debug;

use crate::classify::classifier::{ClassificationScores, Classifier};
use crate::classify::model::Model;
use crate::classify::preprocess::image_to_input;
use crate::config::configuration::Configuration;
use crate::error::{Error, Result};
use crate::store::image_store::{open_image, ImageStore};

/// Classifier backed by JSON model files in the configured model directory.
///
/// Only ids in the configured registry are accepted. Models are loaded per
/// call so that replacing a file on disk takes effect without a restart.
pub struct ModelClassifier {
    config: Configuration,
    store: ImageStore,
}

impl ModelClassifier {
    pub fn new(config: &Configuration) -> ModelClassifier {
        ModelClassifier {
            config: config.clone(),
            store: ImageStore::new(&config.image_dir),
        }
    }

    fn load_model(&self, model_id: &str) -> Result<Model> {
        if !self.config.has_model(model_id) {
            return Err(Error::classification(format!("unknown model '{}'", model_id)));
        }
        Model::load_json(&self.config.model_path(model_id)).map_err(Error::classification)
    }
}

impl Classifier for ModelClassifier {
    fn classify(&self, model_id: &str, image_id: &str) -> Result<ClassificationScores> {
        let model = self.load_model(model_id)?;

        let path = self.store.resolve(image_id)
            .map_err(|e| Error::classification(e.to_string()))?;
        let img = open_image(&path)
            .map_err(|e| Error::classification(format!("could not decode '{}': {}", image_id, e)))?;

        let output = model.forward(image_to_input(&img, &model.input));
        debug!(model_id, image_id, outputs = output.len(), "forward pass done");

        Ok(output.into_iter()
            .enumerate()
            .map(|(i, v)| (model.label_for(i), v))
            .collect())
    }
}
