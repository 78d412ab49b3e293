pub mod error;
pub mod config;
pub mod store;
pub mod classify;
pub mod histogram;
pub mod upload;
pub mod service;

// Convenience re-exports
pub use error::{Error, Result};
pub use config::configuration::Configuration;
pub use config::args::{ConfigArgs, LogArgs, init_logging};
pub use store::image_store::ImageStore;
pub use classify::classifier::{Classifier, ClassificationScores, ranked};
pub use classify::model::{Model, InputType, DenseLayer};
pub use classify::activation::Activation;
pub use classify::model_classifier::ModelClassifier;
pub use classify::request::{classify_image, Classification, ImageSource};
pub use classify::init::scaffold_model;
pub use histogram::histogram::Histogram;
pub use upload::upload::{upload_and_classify, UploadedFile};
pub use upload::validate::validate_upload;
pub use service::{Service, Info, HistogramReport};
