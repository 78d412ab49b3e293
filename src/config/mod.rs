pub mod configuration;
pub mod args;
