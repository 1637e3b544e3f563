//! Wikipedia / Wikimedia Commons API 客户端框架层
//!
//! 这是一个干净的 MediaWiki API 封装，不依赖项目其他代码。
//! 只包含生成 IIIF 清单需要的两个查询：条目摘要 (导言 + 图片列表) 和批量 imageinfo。

mod client;
mod error;
mod models;
pub mod title;

pub use client::{WikimediaClient, WikimediaClientConfig};
pub use error::{Error, Result};
pub use models::{
    ArticleSummary, ExtMetadata, ExtMetadataField, ImageInfo, ImageInfoRecord,
    SINGLE_IMAGE_EXTRACT,
};
pub use title::MAX_TITLES_PER_QUERY;
