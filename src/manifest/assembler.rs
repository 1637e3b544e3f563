use crate::iiif::{Annotation, Canvas, Identifiers, ImageResource, Manifest, Sequence};
use crate::manifest::metadata;
use crate::utils::html::sanitize;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use wikimedia_client::title::normalize_title;
use wikimedia_client::{ArticleSummary, ImageInfoRecord};

const SEQUENCE_NAME: &str = "normal";
const SEQUENCE_LABEL: &str = "default order";

/// Order large-resolution records by the article's image titles
///
/// Titles are matched exactly first, then with `_` and space treated alike.
/// Records no title accounts for are appended by page id.
pub fn order_by_titles<'a>(
    titles: &[String],
    records: &'a HashMap<u64, ImageInfoRecord>,
) -> Vec<&'a ImageInfoRecord> {
    let by_title: HashMap<String, &ImageInfoRecord> = records
        .values()
        .map(|record| (normalize_title(&record.title), record))
        .collect();

    let mut placed = HashSet::new();
    let mut ordered = Vec::with_capacity(records.len());

    for title in titles {
        if let Some(record) = by_title.get(&normalize_title(title)) {
            if placed.insert(record.page_id) {
                ordered.push(*record);
            }
        }
    }

    let mut rest: Vec<&ImageInfoRecord> = records
        .values()
        .filter(|record| !placed.contains(&record.page_id))
        .collect();
    rest.sort_by_key(|record| record.page_id);
    ordered.extend(rest);

    ordered
}

/// Build the manifest tree from ordered large-resolution records
///
/// Only `image/jpeg` records become canvases. Canvas geometry is the delivered
/// image size. A thumbnail is attached when `thumbnails` has a usable record
/// for the same page id.
pub fn assemble<'a, I>(
    image_pages: I,
    thumbnails: &HashMap<u64, ImageInfoRecord>,
    identifier: &str,
    summary: &ArticleSummary,
    ids: &Identifiers,
) -> Manifest
where
    I: IntoIterator<Item = &'a ImageInfoRecord>,
{
    let mut seen = HashSet::new();
    let mut canvases = Vec::new();

    for record in image_pages {
        let Some(info) = record.info.as_ref() else {
            debug!("Skipping {}: no imageinfo", record.title);
            continue;
        };
        if !info.is_jpeg() {
            debug!("Skipping {}: mime {}", record.title, info.mime);
            continue;
        }
        if !seen.insert(record.page_id) {
            continue;
        }

        let canvas_id = ids.canvas(&format!("c{}", record.page_id));
        let image = ImageResource::jpeg(info.url.as_str(), info.height, info.width);
        let annotation = Annotation::painting(
            ids.annotation(&format!("a{}", record.page_id)),
            canvas_id.clone(),
            image,
        );

        let extracted = metadata::extract(info);
        let label = extracted.label.unwrap_or_else(|| record.title.clone());

        let mut canvas = Canvas::new(canvas_id, label, info.height, info.width, annotation);
        canvas.metadata = extracted.entries;
        canvas.license = extracted.license;
        canvas.thumbnail = thumbnails
            .get(&record.page_id)
            .and_then(|thumb| thumb.info.as_ref())
            .map(|thumb| ImageResource::jpeg(thumb.url.as_str(), thumb.height, thumb.width));

        canvases.push(canvas);
    }

    let sequence = Sequence::new(
        ids.sequence(SEQUENCE_NAME),
        SEQUENCE_LABEL.to_string(),
        canvases,
    );

    Manifest::new(
        identifier.to_string(),
        summary.title.clone(),
        sanitize(&summary.extract),
        sequence,
    )
}
