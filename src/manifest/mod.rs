//! Manifest synthesis: article/file resolution, image fetching and IIIF assembly

pub mod assembler;
pub mod metadata;
mod service;

pub use assembler::{assemble, order_by_titles};
pub use service::ManifestService;
