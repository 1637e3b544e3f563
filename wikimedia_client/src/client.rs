//! Wikipedia / Commons API 客户端

use crate::error::{Error, Result};
use crate::models::*;
use crate::title::{batches, join_titles};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

const WIKI_API_URL: &str = "https://en.wikipedia.org/w/api.php";
const COMMONS_API_URL: &str = "https://commons.wikimedia.org/w/api.php";

const USER_AGENT_VALUE: &str = "wiki_iiif/0.2 (IIIF manifest generator)";

/// imageinfo 需要的属性
const IMAGE_INFO_PROPS: &str = "url|timestamp|user|mime|extmetadata|size";

/// 条目图片列表最多跟随的 continue 次数
const MAX_CONTINUATIONS: usize = 20;

/// Wikimedia 客户端配置
#[derive(Debug, Clone)]
pub struct WikimediaClientConfig {
    /// Wikipedia API 入口
    pub wiki_api_url: String,
    /// Commons API 入口
    pub commons_api_url: String,
    /// 所有请求携带的 User-Agent
    pub user_agent: String,
    /// 请求超时时间 (秒)
    pub timeout_secs: u64,
    /// 同时进行的 imageinfo 批次数
    pub max_concurrent_batches: usize,
}

impl Default for WikimediaClientConfig {
    fn default() -> Self {
        Self {
            wiki_api_url: WIKI_API_URL.to_string(),
            commons_api_url: COMMONS_API_URL.to_string(),
            user_agent: USER_AGENT_VALUE.to_string(),
            timeout_secs: 30,
            max_concurrent_batches: 4,
        }
    }
}

/// Wikimedia API 客户端
///
/// 只持有 `reqwest::Client` 和只读配置，clone 开销很小，可以直接移入批量任务。
#[derive(Debug, Clone)]
pub struct WikimediaClient {
    client: reqwest::Client,
    config: Arc<WikimediaClientConfig>,
}

impl WikimediaClient {
    /// 创建新的客户端
    pub fn new(config: WikimediaClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// GET 请求，检查 HTTP 状态和 MediaWiki `error` 对象
    async fn get<Q: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<ApiResponse<Q>> {
        let url = Url::parse_with_params(endpoint, params)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::Api {
                message: text,
                status: status.as_u16(),
            });
        }

        let parsed: ApiResponse<Q> = serde_json::from_str(&text)?;
        if let Some(error) = parsed.error {
            return Err(Error::MediaWiki {
                code: error.code,
                info: error.info,
            });
        }

        Ok(parsed)
    }

    /// 获取条目导言和图片列表
    ///
    /// 条目不存在时返回 `Ok(None)`。图片标题保持上游顺序，
    /// 图片过多时会跟随 `continue` 继续请求。
    pub async fn article_summary(&self, slug: &str) -> Result<Option<ArticleSummary>> {
        let base_params = params(&[
            ("action", "query"),
            ("format", "json"),
            ("prop", "extracts|images"),
            ("exintro", ""),
            ("imlimit", "max"),
            ("redirects", "1"),
            ("titles", slug),
        ]);

        let mut summary: Option<ArticleSummary> = None;
        let mut continuation: Vec<(String, String)> = Vec::new();
        let mut rounds = 0;

        loop {
            let mut query = base_params.clone();
            query.extend(continuation.iter().cloned());

            let response: ApiResponse<ArticleQuery> =
                self.get(&self.config.wiki_api_url, &query).await?;

            let Some(page) = response.query.and_then(ArticleQuery::into_page) else {
                break;
            };

            match summary.as_mut() {
                None => summary = Some(page.into_summary()),
                Some(existing) => {
                    let next = page.into_summary();
                    if existing.extract.is_empty() {
                        existing.extract = next.extract;
                    }
                    existing.images.extend(next.images);
                }
            }

            continuation = match response.continuation {
                Some(cont) if !cont.is_empty() => continuation_params(cont),
                _ => break,
            };

            rounds += 1;
            if rounds >= MAX_CONTINUATIONS {
                tracing::warn!(
                    "Image list of {} truncated after {} continuations",
                    slug,
                    MAX_CONTINUATIONS
                );
                break;
            }
        }

        if summary.is_none() {
            tracing::info!("No article found for {}", slug);
        }

        Ok(summary)
    }

    /// 批量获取图片信息
    ///
    /// 标题按 30 个一批并发请求，结果按 pageid 合并。任意一批失败则整体失败。
    ///
    /// # 参数
    /// - `titles`: 图片标题 (含 `File:` 前缀)
    /// - `width`: 请求的渲染宽度 (`iiurlwidth`)
    pub async fn image_info(
        &self,
        titles: &[String],
        width: u32,
    ) -> Result<HashMap<u64, ImageInfoRecord>> {
        let mut records = HashMap::new();
        if titles.is_empty() {
            return Ok(records);
        }

        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_batches.max(1)));
        let mut set = JoinSet::new();

        for batch in batches(titles) {
            let client = self.clone();
            let permits = Arc::clone(&permits);
            let batch = batch.to_vec();
            set.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::Task(e.to_string()))?;
                client.image_info_batch(&batch, width).await
            });
        }

        while let Some(joined) = set.join_next().await {
            let batch = joined.map_err(Error::from).and_then(|result| result);
            match batch {
                Ok(pages) => {
                    records.extend(pages.into_iter().map(|record| (record.page_id, record)));
                }
                Err(e) => {
                    set.abort_all();
                    return Err(e);
                }
            }
        }

        tracing::debug!(
            "Fetched {} image records for {} titles at width {}",
            records.len(),
            titles.len(),
            width
        );

        Ok(records)
    }

    /// 单批 imageinfo 查询
    async fn image_info_batch(&self, titles: &[String], width: u32) -> Result<Vec<ImageInfoRecord>> {
        let width = width.to_string();
        let titles = join_titles(titles);
        let query = params(&[
            ("action", "query"),
            ("format", "json"),
            ("prop", "imageinfo"),
            ("iiprop", IMAGE_INFO_PROPS),
            ("iiurlwidth", width.as_str()),
            ("titles", titles.as_str()),
        ]);

        let response: ApiResponse<ImageQuery> =
            self.get(&self.config.commons_api_url, &query).await?;

        if response.continuation.is_some() {
            tracing::warn!("Commons imageinfo response was continued, some records may be incomplete");
        }

        Ok(response
            .query
            .map(ImageQuery::into_records)
            .unwrap_or_default())
    }
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// `continue` 对象原样作为下一次请求的参数
fn continuation_params(cont: serde_json::Map<String, Value>) -> Vec<(String, String)> {
    cont.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect()
}
