pub mod home;
pub mod info;
pub mod classify;
pub mod upload;
pub mod histogram;
pub mod images;
