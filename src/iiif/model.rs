//! IIIF Presentation API 2.x document types
//!
//! Plain value structs, built once per request and serialized once.

use serde::Serialize;

pub const PRESENTATION_CONTEXT: &str = "http://iiif.io/api/presentation/2/context.json";

const MANIFEST_TYPE: &str = "sc:Manifest";
const SEQUENCE_TYPE: &str = "sc:Sequence";
const CANVAS_TYPE: &str = "sc:Canvas";
const ANNOTATION_TYPE: &str = "oa:Annotation";
const IMAGE_TYPE: &str = "dctypes:Image";
const PAINTING_MOTIVATION: &str = "sc:painting";

pub const JPEG_FORMAT: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub label: String,
    pub description: String,
    pub sequences: Vec<Sequence>,
}

impl Manifest {
    pub fn new(id: String, label: String, description: String, sequence: Sequence) -> Self {
        Self {
            context: PRESENTATION_CONTEXT,
            id,
            kind: MANIFEST_TYPE,
            label,
            description,
            sequences: vec![sequence],
        }
    }

    /// Canvases of the (single) sequence, in viewing order
    pub fn canvases(&self) -> impl Iterator<Item = &Canvas> {
        self.sequences.iter().flat_map(|sequence| sequence.canvases.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sequence {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub label: String,
    pub canvases: Vec<Canvas>,
}

impl Sequence {
    pub fn new(id: String, label: String, canvases: Vec<Canvas>) -> Self {
        Self {
            id,
            kind: SEQUENCE_TYPE,
            label,
            canvases,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Canvas {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub label: String,
    pub height: u32,
    pub width: u32,
    pub metadata: Vec<MetadataEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageResource>,
    pub images: Vec<Annotation>,
}

impl Canvas {
    /// Canvas holding exactly one painting annotation
    pub fn new(id: String, label: String, height: u32, width: u32, annotation: Annotation) -> Self {
        Self {
            id,
            kind: CANVAS_TYPE,
            label,
            height,
            width,
            metadata: Vec::new(),
            license: None,
            thumbnail: None,
            images: vec![annotation],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataEntry {
    pub label: String,
    pub value: String,
}

impl MetadataEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub motivation: &'static str,
    pub resource: ImageResource,
    /// Canvas this annotation paints
    pub on: String,
}

impl Annotation {
    pub fn painting(id: String, canvas_id: String, resource: ImageResource) -> Self {
        Self {
            id,
            kind: ANNOTATION_TYPE,
            motivation: PAINTING_MOTIVATION,
            resource,
            on: canvas_id,
        }
    }
}

/// A plain image (no IIIF Image API service); also used for thumbnails
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageResource {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    pub height: u32,
    pub width: u32,
}

impl ImageResource {
    pub fn jpeg(url: impl Into<String>, height: u32, width: u32) -> Self {
        Self {
            id: url.into(),
            kind: IMAGE_TYPE,
            format: Some(JPEG_FORMAT),
            height,
            width,
        }
    }
}
