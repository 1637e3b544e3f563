use crate::config::ManifestConfig;
use crate::error::AppResult;
use crate::iiif::{Identifiers, Manifest};
use crate::manifest::assembler::{assemble, order_by_titles};
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;
use wikimedia_client::title::FILE_NAMESPACE;
use wikimedia_client::{ArticleSummary, ImageInfoRecord, WikimediaClient};

/// Large and thumbnail records for one image set, keyed by page id
type ImageSets = (
    HashMap<u64, ImageInfoRecord>,
    HashMap<u64, ImageInfoRecord>,
);

/// Entry point for callers (route layer, CLI): slug or file name in, IIIF JSON out
#[derive(Debug, Clone)]
pub struct ManifestService {
    client: WikimediaClient,
    config: ManifestConfig,
    ids: Identifiers,
}

impl ManifestService {
    pub fn new(client: WikimediaClient, config: ManifestConfig) -> AppResult<Self> {
        let ids = Identifiers::new(&config.base_url)?;
        Ok(Self {
            client,
            config,
            ids,
        })
    }

    /// Manifest for every jpeg embedded in a Wikipedia article
    ///
    /// Returns `{}` when the slug matches no article.
    pub async fn build_article_manifest(&self, slug: &str) -> AppResult<Value> {
        info!("Building manifest for article {}", slug);

        let Some(summary) = self.client.article_summary(slug).await? else {
            return Ok(empty_manifest());
        };

        let (large, thumbnails) = self
            .fetch_images(&summary.images, self.config.display_width)
            .await?;

        let identifier = self.ids.manifest(slug);
        let ordered = order_by_titles(&summary.images, &large);
        let manifest = assemble(ordered, &thumbnails, &identifier, &summary, &self.ids);

        self.finish(slug, manifest)
    }

    /// Manifest for a single Commons file, rendered at full size
    ///
    /// Returns `{}` when Commons knows no such file.
    pub async fn build_file_manifest(&self, file_name: &str) -> AppResult<Value> {
        info!("Building manifest for file {}", file_name);

        let mut summary = ArticleSummary::for_file(file_name);
        let (large, thumbnails) = self
            .fetch_images(&summary.images, self.config.file_width)
            .await?;

        let ordered = order_by_titles(&summary.images, &large);
        let Some(first) = ordered.first() else {
            info!("No Commons file found for {}", file_name);
            return Ok(empty_manifest());
        };
        summary.title = first.title.clone();

        let requested = file_name.strip_prefix(FILE_NAMESPACE).unwrap_or(file_name);
        let identifier = self
            .ids
            .manifest(&format!("{}{}", FILE_NAMESPACE, requested));
        let manifest = assemble(ordered, &thumbnails, &identifier, &summary, &self.ids);

        self.finish(file_name, manifest)
    }

    /// Large and thumbnail fetches run concurrently; either failing fails the build
    async fn fetch_images(&self, titles: &[String], width: u32) -> AppResult<ImageSets> {
        let (large, thumbnails) = tokio::try_join!(
            self.client.image_info(titles, width),
            self.client.image_info(titles, self.config.thumbnail_width),
        )?;
        Ok((large, thumbnails))
    }

    fn finish(&self, name: &str, manifest: Manifest) -> AppResult<Value> {
        info!(
            "✅ Manifest for {} built with {} canvases",
            name,
            manifest.canvases().count()
        );
        Ok(serde_json::to_value(manifest)?)
    }
}

/// What a resolution miss turns into
fn empty_manifest() -> Value {
    Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use wikimedia_client::WikimediaClientConfig;

    type Params = Query<HashMap<String, String>>;

    async fn spawn_api(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/w/api.php", addr)
    }

    async fn service_for(router: Router) -> ManifestService {
        let api = spawn_api(router).await;
        let client = WikimediaClient::new(WikimediaClientConfig {
            wiki_api_url: api.clone(),
            commons_api_url: api,
            timeout_secs: 5,
            ..Default::default()
        })
        .unwrap();
        ManifestService::new(client, ManifestConfig::default()).unwrap()
    }

    /// pageid and mime of the fake Commons files
    fn commons_file(title: &str) -> Option<(u64, &'static str)> {
        match title {
            "File:Mona Lisa.jpg" => Some((24, "image/jpeg")),
            "File:Commons-logo.svg" => Some((2, "image/svg+xml")),
            "File:Louvre Museum.jpg" => Some((7, "image/jpeg")),
            "File:What? (painting).jpg" => Some((31, "image/jpeg")),
            _ => None,
        }
    }

    fn commons_response(q: &HashMap<String, String>) -> serde_json::Value {
        let width: u32 = q.get("iiurlwidth").and_then(|w| w.parse().ok()).unwrap_or(0);
        let titles = q.get("titles").cloned().unwrap_or_default();

        let mut pages = serde_json::Map::new();
        for (index, title) in titles.split('|').enumerate() {
            let Some((page_id, mime)) = commons_file(title) else {
                pages.insert(
                    format!("-{}", index + 1),
                    json!({"ns": 6, "title": title, "missing": ""}),
                );
                continue;
            };
            // The Louvre photo has no thumbnail rendition
            if width == 100 && page_id == 7 {
                continue;
            }
            pages.insert(
                page_id.to_string(),
                json!({
                    "pageid": page_id,
                    "ns": 6,
                    "title": title,
                    "imageinfo": [{
                        "timestamp": "2020-01-01T00:00:00Z",
                        "user": "Uploader",
                        "thumburl": format!("https://upload.example/{}px-{}", width, page_id),
                        "thumbwidth": width,
                        "thumbheight": width * 3 / 2,
                        "mime": mime,
                        "extmetadata": {
                            "ObjectName": {"value": title, "source": "commons-desc-page"},
                            "LicenseUrl": {"value": "https://creativecommons.org/publicdomain/mark/1.0/", "source": "commons-desc-page"},
                            "Artist": {"value": "<a href=\"/wiki/Leonardo\" onclick=\"x()\">Leonardo</a>", "source": "commons-desc-page"}
                        }
                    }]
                }),
            );
        }
        json!({"batchcomplete": "", "query": {"pages": pages}})
    }

    fn wiki_response(q: &HashMap<String, String>) -> serde_json::Value {
        match q.get("titles").map(String::as_str) {
            Some("Mona_Lisa") => json!({
                "query": {"pages": {"70889": {
                    "pageid": 70889,
                    "ns": 0,
                    "title": "Mona Lisa",
                    "extract": "<p>The <b>Mona Lisa</b> is a half-length portrait.<script>x()</script></p>",
                    "images": [
                        {"ns": 6, "title": "File:Mona Lisa.jpg"},
                        {"ns": 6, "title": "File:Commons-logo.svg"},
                        {"ns": 6, "title": "File:Louvre Museum.jpg"}
                    ]
                }}}
            }),
            Some(other) => json!({
                "query": {"pages": {"-1": {"ns": 0, "title": other, "missing": ""}}}
            }),
            None => json!({"batchcomplete": ""}),
        }
    }

    fn fake_wikimedia() -> Router {
        Router::new().route(
            "/w/api.php",
            get(|Query(q): Params| async move {
                if q.get("prop").map(String::as_str) == Some("imageinfo") {
                    Json(commons_response(&q))
                } else {
                    Json(wiki_response(&q))
                }
            }),
        )
    }

    #[tokio::test]
    async fn test_article_manifest_mona_lisa() {
        let service = service_for(fake_wikimedia()).await;
        let manifest = service.build_article_manifest("Mona_Lisa").await.unwrap();

        assert_eq!(manifest["@type"], "sc:Manifest");
        assert_eq!(manifest["@id"], "http://localhost:5000/iiif/Mona_Lisa");
        assert_eq!(manifest["label"], "Mona Lisa");
        assert_eq!(
            manifest["description"],
            "<p>The <b>Mona Lisa</b> is a half-length portrait.</p>"
        );

        let canvases = manifest["sequences"][0]["canvases"].as_array().unwrap();
        assert_eq!(canvases.len(), 2);
        assert_eq!(canvases[0]["@id"], "http://localhost:5000/iiif/canvas/c24.json");
        assert_eq!(canvases[1]["@id"], "http://localhost:5000/iiif/canvas/c7.json");

        let mona = &canvases[0];
        assert_eq!(mona["width"], 1600);
        assert_eq!(mona["height"], 2400);
        assert_eq!(mona["license"], "https://creativecommons.org/publicdomain/mark/1.0/");
        assert_eq!(mona["thumbnail"]["@id"], "https://upload.example/100px-24");
        assert_eq!(mona["thumbnail"]["format"], "image/jpeg");
        assert_eq!(mona["images"][0]["resource"]["@id"], "https://upload.example/1600px-24");
        assert_eq!(
            mona["metadata"],
            json!([
                {"label": "Wikipedia user", "value": "Uploader"},
                {"label": "ObjectName", "value": "File:Mona Lisa.jpg"},
                {"label": "Artist", "value": "<a href=\"/wiki/Leonardo\">Leonardo</a>"}
            ])
        );

        // Louvre has no thumbnail rendition
        assert!(canvases[1].get("thumbnail").is_none());
    }

    #[tokio::test]
    async fn test_article_manifest_unknown_slug_is_empty() {
        let service = service_for(fake_wikimedia()).await;
        let manifest = service.build_article_manifest("No_such_article").await.unwrap();
        assert_eq!(manifest, json!({}));
    }

    #[tokio::test]
    async fn test_file_manifest() {
        let service = service_for(fake_wikimedia()).await;
        let manifest = service.build_file_manifest("Mona_Lisa.jpg").await.unwrap();

        assert_eq!(manifest["@id"], "http://localhost:5000/iiif/File:Mona_Lisa.jpg");
        assert_eq!(manifest["label"], "File:Mona Lisa.jpg");
        assert_eq!(manifest["description"], "(single wikimedia image)");

        let canvases = manifest["sequences"][0]["canvases"].as_array().unwrap();
        assert_eq!(canvases.len(), 1);
        assert_eq!(canvases[0]["width"], 8000);
        assert_eq!(canvases[0]["thumbnail"]["width"], 100);
    }

    #[tokio::test]
    async fn test_file_manifest_with_question_mark() {
        let service = service_for(fake_wikimedia()).await;
        let manifest = service
            .build_file_manifest("File:What?_(painting).jpg")
            .await
            .unwrap();

        assert_eq!(
            manifest["@id"],
            "http://localhost:5000/iiif/File:What%3F_(painting).jpg"
        );
        let canvases = manifest["sequences"][0]["canvases"].as_array().unwrap();
        assert_eq!(canvases.len(), 1);
        assert_eq!(canvases[0]["@id"], "http://localhost:5000/iiif/canvas/c31.json");
    }

    #[tokio::test]
    async fn test_file_manifest_unknown_file_is_empty() {
        let service = service_for(fake_wikimedia()).await;
        let manifest = service.build_file_manifest("Nothing.jpg").await.unwrap();
        assert_eq!(manifest, json!({}));
    }

    #[tokio::test]
    async fn test_upstream_failure_fails_build() {
        let router = Router::new().route(
            "/w/api.php",
            get(|Query(q): Params| async move {
                if q.get("prop").map(String::as_str) == Some("imageinfo") {
                    Err(axum::http::StatusCode::BAD_GATEWAY)
                } else {
                    Ok(Json(wiki_response(&q)))
                }
            }),
        );
        let service = service_for(router).await;

        let err = service.build_article_manifest("Mona_Lisa").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Upstream(wikimedia_client::Error::Api { status: 502, .. })
        ));
    }
}
