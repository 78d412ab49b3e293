pub mod classifier;
pub mod activation;
pub mod model;
pub mod preprocess;
pub mod model_classifier;
pub mod init;
pub mod request;
