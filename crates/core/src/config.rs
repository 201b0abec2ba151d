//! 处理器配置
//!
//! Webhook 地址在创建处理器时校验一次，之后只读。

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use url::Url;

/// 默认的 Stepler Webhook 地址
pub const DEFAULT_WEBHOOK_ENDPOINT: &str =
    "https://api.staging-stepler.io/v3/webhook/partners/app-install";

/// 默认请求超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Webhook 地址
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// 允许非 HTTPS 地址（仅用于本地测试）
    #[serde(default)]
    pub allow_insecure_http: bool,
    /// 传输层请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_WEBHOOK_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            allow_insecure_http: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HandlerConfig {
    /// 解析并校验 Webhook 地址
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| ConfigError::InvalidEndpoint(format!("{}: {e}", self.endpoint)))?;

        match url.scheme() {
            "https" => Ok(url),
            "http" if self.allow_insecure_http => Ok(url),
            "http" => Err(ConfigError::InsecureEndpoint(self.endpoint.clone())),
            other => Err(ConfigError::InvalidEndpoint(format!(
                "不支持的协议: {other}"
            ))),
        }
    }
}
