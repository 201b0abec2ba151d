//! Webhook 转发模块
//!
//! 把解析后的 Deep Link 参数以 JSON 形式 POST 到 Stepler 合作方 Webhook。
//!
//! ## 功能
//!
//! - 构造请求（`Content-Type` 与 `X-SERVICE-ACCOUNT-KEY` 请求头）
//! - 抽象传输层（`HttpTransport`），默认实现基于 reqwest
//! - 解释响应：传输错误 → 响应形态 → 状态码
//!
//! 只发送一次，不做重试。

use crate::config::HandlerConfig;
use crate::connect::deep_link::ParsedParameters;
use crate::errors::{
    ConfigError, DeepLinkHandlerError, TransportError, TRANSPORT_CODE_CONNECT,
    TRANSPORT_CODE_OTHER, TRANSPORT_CODE_TIMEOUT,
};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// 服务账号 Key 请求头
pub const SERVICE_ACCOUNT_KEY_HEADER: &str = "X-SERVICE-ACCOUNT-KEY";

/// JSON 请求体类型
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// reqwest 传输层错误域
pub const REQWEST_DOMAIN: &str = "reqwest";

/// Webhook 请求
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookRequest {
    /// 目标地址
    pub url: Url,
    /// 服务账号 Key（缺失时不发送请求头）
    pub service_account_key: Option<String>,
    /// JSON 请求体
    pub body: Vec<u8>,
}

impl WebhookRequest {
    /// 由完整参数表构造请求
    pub fn new(
        url: Url,
        service_account_key: Option<String>,
        params: &ParsedParameters,
    ) -> Result<Self, DeepLinkHandlerError> {
        let body = serde_json::to_vec(params)?;
        Ok(Self {
            url,
            service_account_key,
            body,
        })
    }

    /// 请求头列表
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Content-Type", CONTENT_TYPE_JSON.to_string())];
        if let Some(key) = &self.service_account_key {
            headers.push((SERVICE_ACCOUNT_KEY_HEADER, key.clone()));
        }
        headers
    }

    /// 反序列化请求体
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

/// 传输层返回的响应
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportResponse {
    /// 正常的 HTTP 响应
    Http { status: u16, body: Vec<u8> },
    /// 不是 HTTP 响应（描述实际收到的内容）
    Unrecognized(String),
}

impl TransportResponse {
    pub fn status(status: u16) -> Self {
        Self::Http {
            status,
            body: Vec::new(),
        }
    }
}

/// HTTP 传输层 trait
///
/// 单次 POST，不重试；超时由实现自行决定。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(&self, request: WebhookRequest) -> Result<TransportResponse, TransportError>;
}

/// 基于 reqwest 的默认传输层
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// 按配置创建传输层
    pub fn new(config: &HandlerConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("stepler-link/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, request: WebhookRequest) -> Result<TransportResponse, TransportError> {
        let headers = request.headers();
        let mut builder = self.client.post(request.url);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| map_reqwest_error(&e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(&e))?;

        Ok(TransportResponse::Http {
            status,
            body: body.to_vec(),
        })
    }
}

/// reqwest 错误映射为传输层错误
fn map_reqwest_error(err: &reqwest::Error) -> TransportError {
    let code = if err.is_timeout() {
        TRANSPORT_CODE_TIMEOUT
    } else if err.is_connect() {
        TRANSPORT_CODE_CONNECT
    } else {
        TRANSPORT_CODE_OTHER
    };
    TransportError::new(REQWEST_DOMAIN, code, err.to_string())
}

/// 解释传输层结果
///
/// 顺序：传输错误 → 响应形态 → 状态码（必须恰好为 200）。
pub fn interpret_response(
    result: Result<TransportResponse, TransportError>,
) -> Result<(), DeepLinkHandlerError> {
    match result? {
        TransportResponse::Unrecognized(description) => {
            Err(DeepLinkHandlerError::UnexpectedResponse(description))
        }
        TransportResponse::Http { status: 200, .. } => Ok(()),
        TransportResponse::Http { status, body } => {
            tracing::warn!(
                "[Webhook] HTTP 状态码不是 200: status={}, body={}",
                status,
                String::from_utf8_lossy(&body)
            );
            Err(DeepLinkHandlerError::Http(status))
        }
    }
}

/// 脱敏 Key（仅保留前 7 个字符）
pub fn mask_key(key: &str) -> String {
    key.chars().take(7).collect()
}
