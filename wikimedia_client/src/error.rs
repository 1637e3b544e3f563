//! Wikimedia 客户端错误类型

use std::fmt;

/// Wikimedia 客户端错误类型
#[derive(Debug)]
pub enum Error {
    /// HTTP 请求错误 (包括超时)
    Http(reqwest::Error),
    /// JSON 解析错误
    Json(serde_json::Error),
    /// 非 2xx 响应
    Api { message: String, status: u16 },
    /// MediaWiki 返回的 `error` 对象
    MediaWiki { code: String, info: String },
    /// URL 构建错误
    Url(url::ParseError),
    /// 批量请求任务异常退出
    Task(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::Json(e) => write!(f, "JSON parse error: {}", e),
            Error::Api { message, status } => {
                write!(f, "API error ({}): {}", status, message)
            }
            Error::MediaWiki { code, info } => write!(f, "MediaWiki error ({}): {}", code, info),
            Error::Url(e) => write!(f, "Invalid API URL: {}", e),
            Error::Task(msg) => write!(f, "Batch task failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Url(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::Url(e)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Task(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
