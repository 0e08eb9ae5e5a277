pub mod callback;
pub mod download;
pub mod status;
pub mod upload;
