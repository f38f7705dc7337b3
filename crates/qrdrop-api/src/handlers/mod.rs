pub mod download;
pub mod files;
pub mod health;
pub mod media_get;
pub mod pages;
pub mod upload;
