//! 命令行入口
//!
//! 处理一个 Deep Link，把结果以 JSON 打印到标准输出。

use crate::config::{config_path, load_config, Config};
use crate::logger::init_logging;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stepler_core::events::FnObserver;
use stepler_core::{DeepLinkErrorCode, DeepLinkHandler, DeepLinkHandlerError};
use tokio::sync::oneshot;

/// Stepler Link - 把合作方 Deep Link 参数转发到 Stepler Webhook
#[derive(Debug, Parser)]
#[command(name = "stepler-link")]
#[command(about = "Forward Stepler deep-link parameters to the partner webhook")]
#[command(version)]
pub struct Cli {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 服务账号 Key（优先于环境变量和元数据文件）
    #[arg(short, long)]
    pub key: Option<String>,

    /// 覆盖 Webhook 地址
    #[arg(long)]
    pub endpoint: Option<String>,

    /// 打印生效的配置并退出
    #[arg(long)]
    pub print_config: bool,

    /// 日志级别（-v info, -vv debug, -vvv trace）
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// 要处理的 Deep Link
    #[arg(required_unless_present = "print_config")]
    pub url: Option<String>,
}

/// 处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    pub code: DeepLinkErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl Outcome {
    pub fn new(success: bool, error: Option<&DeepLinkHandlerError>) -> Self {
        Self {
            success,
            error: error.map(|e| OutcomeError {
                code: e.code(),
                message: e.to_string(),
                status: e.status_code(),
            }),
        }
    }
}

/// 加载配置并应用命令行覆盖
pub fn effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let path = cli.config.clone().unwrap_or_else(config_path);
    let mut config = load_config(&path)?;
    if let Some(endpoint) = &cli.endpoint {
        config.handler.endpoint = endpoint.clone();
    }
    Ok(config)
}

/// 用给定处理器处理一个 Deep Link
pub async fn process(handler: &DeepLinkHandler, url: &str) -> Outcome {
    let (tx, rx) = oneshot::channel();
    handler.handle_deep_link(url, move |success, error| {
        let _ = tx.send(Outcome::new(success, error.as_ref()));
    });

    match rx.await {
        Ok(outcome) => outcome,
        // 发送任务异常退出
        Err(_) => Outcome {
            success: false,
            error: None,
        },
    }
}

/// 运行命令行，返回是否成功
pub async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = effective_config(&cli)?;
    init_logging(&config.logging.level, cli.verbose);

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(true);
    }

    let url = cli
        .url
        .ok_or_else(|| anyhow::anyhow!("缺少 Deep Link URL"))?;

    let credentials = config.credentials.provider(cli.key);
    let handler = DeepLinkHandler::with_defaults(&config.handler, credentials)?.with_observer(
        FnObserver::new(|event: &str| tracing::info!("[DeepLink] 事件: {}", event)),
    );

    let outcome = process(&handler, &url).await;
    println!("{}", serde_json::to_string(&outcome)?);
    Ok(outcome.success)
}
