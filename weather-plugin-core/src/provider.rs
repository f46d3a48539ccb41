use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::RawWeather;

pub mod suyan;

pub use suyan::{FetcherConfig, SuyanClient};

/// Why a fetch did not produce a body.
///
/// The `Display` text is the reason shown to the chat user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{reason}")]
    Http { status: u16, reason: String },

    #[error("请求超时，请稍后重试")]
    Timeout,

    #[error("网络请求异常: {0}")]
    Transport(String),

    #[error("未知错误: {0}")]
    Unknown(String),
}

impl FetchError {
    /// Builds the error for a non-200 response, using the known-status table.
    pub fn from_status(status: u16) -> Self {
        let reason = status_reason(status)
            .map(str::to_string)
            .unwrap_or_else(|| format!("未知错误: {status}"));

        FetchError::Http { status, reason }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_builder() {
            FetchError::Unknown(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Reason text for the status codes the upstream is known to return.
pub fn status_reason(status: u16) -> Option<&'static str> {
    let reason = match status {
        400 => "请求错误！",
        403 => "请求被服务器拒绝！",
        405 => "客户端请求的方法被禁止！",
        408 => "请求时间过长！",
        500 => "服务器内部出现错误！",
        501 => "服务器不支持请求的功能，无法完成请求！",
        503 => "系统维护中！",
        _ => return None,
    };
    Some(reason)
}

/// One attempt, no retries.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch(&self, city: &str) -> Result<RawWeather, FetchError>;
}
