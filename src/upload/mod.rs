pub mod validate;
pub mod upload;
