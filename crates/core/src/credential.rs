//! 服务账号凭证模块
//!
//! 每次发送 Webhook 前查询一次 `X-SERVICE-ACCOUNT-KEY`，缺失时照常发送。
//!
//! ## 实现
//!
//! - `StaticCredentialProvider` - 固定值
//! - `EnvCredentialProvider` - 环境变量
//! - `MetadataFileCredentialProvider` - JSON 元数据文件
//! - `ChainedCredentialProvider` - 依次查询，第一个命中者生效

use crate::connect::webhook::SERVICE_ACCOUNT_KEY_HEADER;
use std::path::PathBuf;
use std::sync::Arc;

/// 默认环境变量名
pub const DEFAULT_KEY_ENV_VAR: &str = "STEPLER_SERVICE_ACCOUNT_KEY";

/// 凭证提供者 trait
pub trait CredentialProvider: Send + Sync {
    /// 当前的服务账号 Key
    fn service_account_key(&self) -> Option<String>;
}

/// 固定凭证
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider(Option<String>);

impl StaticCredentialProvider {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    pub fn empty() -> Self {
        Self(None)
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn service_account_key(&self) -> Option<String> {
        self.0.clone()
    }
}

/// 环境变量凭证
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    var: String,
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_ENV_VAR)
    }
}

impl EnvCredentialProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn service_account_key(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|v| !v.is_empty())
    }
}

/// JSON 元数据文件凭证
///
/// 文件内容为扁平 JSON 对象，Key 存放在 `X-SERVICE-ACCOUNT-KEY` 字段。
/// 每次查询都重新读取文件。
#[derive(Debug, Clone)]
pub struct MetadataFileCredentialProvider {
    path: PathBuf,
}

impl MetadataFileCredentialProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for MetadataFileCredentialProvider {
    fn service_account_key(&self) -> Option<String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("[Credential] 无法读取元数据文件 {:?}: {}", self.path, e);
                return None;
            }
        };

        let metadata: serde_json::Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("[Credential] 元数据文件格式无效 {:?}: {}", self.path, e);
                return None;
            }
        };

        metadata
            .get(SERVICE_ACCOUNT_KEY_HEADER)
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
    }
}

/// 依次查询多个提供者
#[derive(Clone, Default)]
pub struct ChainedCredentialProvider {
    providers: Vec<Arc<dyn CredentialProvider>>,
}

impl ChainedCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }
}

impl CredentialProvider for ChainedCredentialProvider {
    fn service_account_key(&self) -> Option<String> {
        self.providers
            .iter()
            .find_map(|provider| provider.service_account_key())
    }
}
