//! 应用配置
//!
//! 配置文件为 JSON，默认位于 `<config_dir>/stepler-link/config.json`，不存在时使用默认值。

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stepler_core::credential::DEFAULT_KEY_ENV_VAR;
use stepler_core::{
    ChainedCredentialProvider, CredentialProvider, EnvCredentialProvider, HandlerConfig,
    MetadataFileCredentialProvider, StaticCredentialProvider,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub handler: HandlerConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// 读取服务账号 Key 的环境变量
    #[serde(default = "default_env_var")]
    pub env_var: String,
    /// JSON 元数据文件路径
    #[serde(default)]
    pub metadata_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_env_var() -> String {
    DEFAULT_KEY_ENV_VAR.to_string()
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            env_var: default_env_var(),
            metadata_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl CredentialsConfig {
    /// 构造凭证提供者
    ///
    /// 查询顺序：命令行指定的 Key → 环境变量 → 元数据文件。
    pub fn provider(&self, override_key: Option<String>) -> Arc<dyn CredentialProvider> {
        let mut chain = ChainedCredentialProvider::new();
        if let Some(key) = override_key {
            chain = chain.with(StaticCredentialProvider::new(key));
        }
        chain = chain.with(EnvCredentialProvider::new(self.env_var.clone()));
        if let Some(path) = &self.metadata_path {
            chain = chain.with(MetadataFileCredentialProvider::new(expand_home(path)));
        }
        Arc::new(chain)
    }
}

/// 展开 `~/` 前缀
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None => PathBuf::from(path),
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stepler-link")
        .join("config.json")
}

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(Config::default())
    }
}

pub fn save_config(path: &Path, config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.credentials.env_var, DEFAULT_KEY_ENV_VAR);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.handler.timeout_secs = 10;
        config.credentials.metadata_path = Some("/etc/stepler/metadata.json".to_string());
        save_config(&path, &config).unwrap();

        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"logging": {"level": "debug"}}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.handler, HandlerConfig::default());
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_override_key_wins() {
        let credentials = CredentialsConfig {
            env_var: "STEPLER_TEST_UNSET_KEY_VAR".to_string(),
            metadata_path: None,
        };
        let provider = credentials.provider(Some("cli-key".to_string()));
        assert_eq!(provider.service_account_key(), Some("cli-key".to_string()));

        assert_eq!(credentials.provider(None).service_account_key(), None);
    }

    #[test]
    fn test_metadata_file_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, r#"{"X-SERVICE-ACCOUNT-KEY": "from-file"}"#).unwrap();

        let credentials = CredentialsConfig {
            env_var: "STEPLER_TEST_UNSET_KEY_VAR".to_string(),
            metadata_path: Some(path.to_string_lossy().to_string()),
        };
        assert_eq!(
            credentials.provider(None).service_account_key(),
            Some("from-file".to_string())
        );
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert!(expand_home("~/x.json").ends_with("x.json"));
    }
}
