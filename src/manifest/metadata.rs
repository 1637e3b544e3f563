use crate::iiif::MetadataEntry;
use crate::utils::html::sanitize;
use wikimedia_client::ImageInfo;

/// Synthesized entry for the uploader
pub const WIKIPEDIA_USER: &str = "Wikipedia user";

const LICENSE_URL: &str = "LicenseUrl";
const IMAGE_DESCRIPTION: &str = "ImageDescription";

/// What one image's extmetadata contributes to its canvas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanvasMetadata {
    /// Sanitized ImageDescription, replaces the title label
    pub label: Option<String>,
    /// Raw LicenseUrl
    pub license: Option<String>,
    pub entries: Vec<MetadataEntry>,
}

/// Split extmetadata into license, label override and sanitized metadata entries
///
/// The uploader comes first as-is. LicenseUrl and ImageDescription are never
/// emitted as generic entries; other keys are kept when their value is non-empty.
pub fn extract(info: &ImageInfo) -> CanvasMetadata {
    let mut metadata = CanvasMetadata::default();

    if let Some(user) = &info.user {
        metadata.entries.push(MetadataEntry::new(WIKIPEDIA_USER, user.as_str()));
    }

    let Some(extmetadata) = &info.extmetadata else {
        return metadata;
    };

    for (key, field) in extmetadata.iter() {
        let value = field.text();
        match key {
            LICENSE_URL => {
                if !value.is_empty() {
                    metadata.license = Some(value);
                }
            }
            IMAGE_DESCRIPTION => {
                let label = sanitize(&value);
                if !label.is_empty() {
                    metadata.label = Some(label);
                }
            }
            _ if !value.is_empty() => {
                metadata.entries.push(MetadataEntry::new(key, sanitize(&value)));
            }
            _ => {}
        }
    }

    metadata
}
