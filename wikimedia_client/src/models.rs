//! Wikipedia / Commons API 模型定义
//!
//! 原始响应结构只在 crate 内部使用，对外暴露的是经过校验的记录类型
//! ([`ArticleSummary`], [`ImageInfoRecord`])。

use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// 单文件清单使用的占位摘要
pub const SINGLE_IMAGE_EXTRACT: &str = "(single wikimedia image)";

const JPEG_MIME: &str = "image/jpeg";

/// MediaWiki `action=query` 的通用响应外壳
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<Q> {
    pub query: Option<Q>,
    pub error: Option<ApiErrorBody>,
    #[serde(rename = "continue")]
    pub continuation: Option<serde_json::Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

// ---- Wikipedia article query ----

#[derive(Debug, Deserialize)]
pub(crate) struct ArticleQuery {
    #[serde(default)]
    pub pages: Option<HashMap<String, ArticlePage>>,
}

impl ArticleQuery {
    /// 取第一个真实存在的页面，缺失/非法标题返回 None
    pub fn into_page(self) -> Option<ArticlePage> {
        self.pages?.into_values().find(ArticlePage::exists)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArticlePage {
    #[serde(default)]
    pub pageid: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub missing: Option<Value>,
    #[serde(default)]
    pub invalid: Option<Value>,
    #[serde(default)]
    pub extract: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

impl ArticlePage {
    fn exists(&self) -> bool {
        self.pageid.is_some() && self.missing.is_none() && self.invalid.is_none()
    }

    pub fn into_summary(self) -> ArticleSummary {
        ArticleSummary {
            title: self.title,
            extract: self.extract.unwrap_or_default(),
            images: self.images.into_iter().map(|image| image.title).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageRef {
    pub title: String,
}

/// 条目摘要：标题、导言 (未经清洗的 HTML) 以及按条目顺序排列的图片标题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
    pub title: String,
    pub extract: String,
    pub images: Vec<String>,
}

impl ArticleSummary {
    /// 为单个 Commons 文件合成摘要，不请求 Wikipedia
    pub fn for_file(file_name: &str) -> Self {
        let title = crate::title::file_title(file_name);
        Self {
            images: vec![title.clone()],
            title,
            extract: SINGLE_IMAGE_EXTRACT.to_string(),
        }
    }
}

// ---- Commons imageinfo query ----

/// 页面先保留为原始 JSON，单条记录字段类型错误时不影响同批其它记录
#[derive(Debug, Deserialize)]
pub(crate) struct ImageQuery {
    #[serde(default)]
    pub pages: HashMap<String, Value>,
}

impl ImageQuery {
    pub fn into_records(self) -> Vec<ImageInfoRecord> {
        self.pages
            .into_values()
            .filter_map(RawImagePage::from_value)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawImagePage {
    #[serde(default)]
    pub pageid: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub imageinfo: Vec<RawImageInfo>,
}

impl RawImagePage {
    /// 解析失败的页面保留 pageid 和标题，但没有 imageinfo
    pub fn from_value(value: Value) -> Option<ImageInfoRecord> {
        match serde_json::from_value::<RawImagePage>(value.clone()) {
            Ok(page) => page.into_record(),
            Err(e) => {
                let page_id = value.get("pageid").and_then(Value::as_u64)?;
                let title = value
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                tracing::warn!("Malformed image page {} ({}): {}", page_id, title, e);
                Some(ImageInfoRecord {
                    page_id,
                    title,
                    info: None,
                })
            }
        }
    }

    /// 没有 pageid 的页面 (文件不存在) 直接丢弃
    pub fn into_record(self) -> Option<ImageInfoRecord> {
        let Some(page_id) = self.pageid else {
            tracing::debug!("Dropping image page without pageid: {}", self.title);
            return None;
        };

        let info = self.imageinfo.into_iter().next().and_then(RawImageInfo::validate);
        if info.is_none() {
            tracing::debug!("Image page {} ({}) has no usable imageinfo", page_id, self.title);
        }

        Some(ImageInfoRecord {
            page_id,
            title: self.title,
            info,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawImageInfo {
    #[serde(default)]
    pub thumburl: Option<String>,
    #[serde(default)]
    pub thumbwidth: Option<u32>,
    #[serde(default)]
    pub thumbheight: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub extmetadata: Option<ExtMetadata>,
}

impl RawImageInfo {
    /// mime、投递 URL 和尺寸缺一不可
    fn validate(self) -> Option<ImageInfo> {
        Some(ImageInfo {
            mime: self.mime?,
            url: self.thumburl?,
            width: self.thumbwidth?,
            height: self.thumbheight?,
            original_width: self.width,
            original_height: self.height,
            user: self.user,
            extmetadata: self.extmetadata,
        })
    }
}

/// 某个请求宽度下的一张 Commons 图片
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfoRecord {
    /// Commons 页面 ID，大图与缩略图通过它关联
    pub page_id: u64,
    pub title: String,
    /// 缺少必要字段时为 None
    pub info: Option<ImageInfo>,
}

/// 图片信息 (已校验)
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub mime: String,
    /// 按请求宽度渲染后的图片 URL
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// 原始文件尺寸，画布目前使用投递尺寸
    pub original_width: Option<u32>,
    pub original_height: Option<u32>,
    /// 上传者
    pub user: Option<String>,
    pub extmetadata: Option<ExtMetadata>,
}

impl ImageInfo {
    pub fn is_jpeg(&self) -> bool {
        self.mime == JPEG_MIME
    }
}

/// extmetadata 中的单个字段
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtMetadataField {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub source: Option<String>,
}

impl ExtMetadataField {
    /// 字段值的文本形式，null/缺失为空串
    pub fn text(&self) -> String {
        match &self.value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// 保留上游顺序的 extmetadata
///
/// MediaWiki 在字段为空时会输出 `[]` 而不是 `{}`，两种形式都接受。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtMetadata(Vec<(String, ExtMetadataField)>);

impl ExtMetadata {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtMetadataField)> {
        self.0.iter().map(|(key, field)| (key.as_str(), field))
    }

    pub fn get(&self, key: &str) -> Option<&ExtMetadataField> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, field)| field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ExtMetadataField)> for ExtMetadata {
    fn from_iter<I: IntoIterator<Item = (String, ExtMetadataField)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for ExtMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExtMetadataVisitor;

        impl<'de> Visitor<'de> for ExtMetadataVisitor {
            type Value = ExtMetadata;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an extmetadata object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ExtMetadata, A::Error> {
                let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, field)) = map.next_entry::<String, ExtMetadataField>()? {
                    fields.push((key, field));
                }
                Ok(ExtMetadata(fields))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ExtMetadata, A::Error> {
                // Only the empty PHP array shape is meaningful here
                while seq.next_element::<serde::de::IgnoredAny>()?.is_some() {}
                Ok(ExtMetadata::default())
            }
        }

        deserializer.deserialize_any(ExtMetadataVisitor)
    }
}
