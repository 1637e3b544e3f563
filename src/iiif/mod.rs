pub mod model;

use crate::error::{AppError, AppResult};
use url::Url;

pub use model::{Annotation, Canvas, ImageResource, Manifest, MetadataEntry, Sequence};

/// Resolves IIIF resource names against the configured base URI
///
/// Sequence, canvas and annotation ids live under `{base}sequence/`, `{base}canvas/`
/// and `{base}annotation/`; manifest ids are `{base}{name}` with the name
/// percent-encoded as a single path segment.
#[derive(Debug, Clone)]
pub struct Identifiers {
    base: Url,
}

impl Identifiers {
    pub fn new(base_url: &str) -> AppResult<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(AppError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self { base })
    }

    pub fn manifest(&self, name: &str) -> String {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in new(), so segments are always available
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url.to_string()
    }

    pub fn sequence(&self, name: &str) -> String {
        self.resource("sequence", name)
    }

    pub fn canvas(&self, name: &str) -> String {
        self.resource("canvas", name)
    }

    pub fn annotation(&self, name: &str) -> String {
        self.resource("annotation", name)
    }

    fn resource(&self, kind: &str, name: &str) -> String {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(kind)
                .push(&format!("{}.json", name));
        }
        url.to_string()
    }
}
