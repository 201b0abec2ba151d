//! Deep Link 处理错误模型
//!
//! 处理流水线中每个阶段只会产生一种错误，按检查顺序先命中者生效。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 传输层错误码：请求超时
pub const TRANSPORT_CODE_TIMEOUT: i32 = -1001;
/// 传输层错误码：无法建立连接
pub const TRANSPORT_CODE_CONNECT: i32 = -1004;
/// 传输层错误码：其他错误
pub const TRANSPORT_CODE_OTHER: i32 = -1;

/// 运行时错误域（没有运行时，或发送任务 panic）
pub const RUNTIME_DOMAIN: &str = "tokio";

/// 传输层错误
///
/// 由 `HttpTransport` 实现产生，处理器不做任何包装或改写，
/// 原样放入 [`DeepLinkHandlerError::Transport`] 交给调用方。
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{domain} ({code}): {message}")]
pub struct TransportError {
    /// 错误来源域（如 `reqwest`）
    pub domain: String,
    /// 域内错误码
    pub code: i32,
    /// 错误描述
    pub message: String,
}

impl TransportError {
    pub fn new(domain: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            message: message.into(),
        }
    }
}

/// 错误码（稳定的机器可读标识）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeepLinkErrorCode {
    MalformedUrl,
    WrongHost,
    MissingParameters,
    SerializationError,
    TransportError,
    UnexpectedResponse,
    HttpError,
}

/// Deep Link 处理错误
#[derive(Debug, Error)]
pub enum DeepLinkHandlerError {
    /// URL 无法分解为组件
    #[error("无效的 URL: {0}")]
    MalformedUrl(String),

    /// host 不是 `stepler`
    #[error("不是 Stepler 链接: host={0:?}")]
    WrongHost(Option<String>),

    /// 没有查询字符串，或缺少必填参数
    #[error("缺少必填参数: {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    /// 请求体无法编码为 JSON
    #[error("请求体序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 传输层报告的错误（原样透传）
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// 响应不是合法的 HTTP 响应
    #[error("响应格式异常: {0}")]
    UnexpectedResponse(String),

    /// HTTP 状态码不是 200
    #[error("HTTP 状态码: {0}")]
    Http(u16),
}

impl DeepLinkHandlerError {
    /// 获取对应的错误码
    pub fn code(&self) -> DeepLinkErrorCode {
        match self {
            Self::MalformedUrl(_) => DeepLinkErrorCode::MalformedUrl,
            Self::WrongHost(_) => DeepLinkErrorCode::WrongHost,
            Self::MissingParameters(_) => DeepLinkErrorCode::MissingParameters,
            Self::Serialization(_) => DeepLinkErrorCode::SerializationError,
            Self::Transport(_) => DeepLinkErrorCode::TransportError,
            Self::UnexpectedResponse(_) => DeepLinkErrorCode::UnexpectedResponse,
            Self::Http(_) => DeepLinkErrorCode::HttpError,
        }
    }

    /// HTTP 状态码（仅 `Http` 错误）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(status) => Some(*status),
            _ => None,
        }
    }
}

/// 处理器配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Webhook 地址无法解析
    #[error("Webhook 地址无效: {0}")]
    InvalidEndpoint(String),

    /// Webhook 地址不是 HTTPS
    #[error("Webhook 地址必须使用 HTTPS: {0}")]
    InsecureEndpoint(String),

    /// HTTP 客户端构建失败
    #[error("HTTP 客户端构建失败: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DeepLinkHandlerError::WrongHost(Some("google.com".to_string())).code(),
            DeepLinkErrorCode::WrongHost
        );
        assert_eq!(
            DeepLinkHandlerError::Http(404).code(),
            DeepLinkErrorCode::HttpError
        );
        assert_eq!(
            DeepLinkHandlerError::Transport(TransportError::new("Test", -1000, "offline")).code(),
            DeepLinkErrorCode::TransportError
        );
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&DeepLinkErrorCode::MissingParameters).unwrap();
        assert_eq!(json, r#""MISSING_PARAMETERS""#);
    }

    #[test]
    fn test_transport_error_display_is_transparent() {
        let inner = TransportError::new("Test", -1000, "offline");
        let err = DeepLinkHandlerError::from(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
    }

    #[test]
    fn test_missing_parameters_display() {
        let err = DeepLinkHandlerError::MissingParameters(vec!["userId", "language"]);
        assert_eq!(err.to_string(), "缺少必填参数: userId, language");
        assert_eq!(err.status_code(), None);
        assert_eq!(DeepLinkHandlerError::Http(400).status_code(), Some(400));
    }
}
