pub mod config;
pub mod error;
pub mod iiif;
pub mod manifest;
pub mod utils;
