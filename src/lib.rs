//! Stepler Link - Deep Link 参数转发
//!
//! ## Workspace 结构
//!
//! - stepler-core crate（connect, credential, events, errors, config）
//! - 主 crate 保留配置文件、日志初始化和命令行入口

// 从 core crate 重新导出（保持 crate::xxx 路径兼容）
pub use stepler_core::connect;
pub use stepler_core::credential;
pub use stepler_core::errors;
pub use stepler_core::events;

pub use stepler_core::{
    DeepLinkErrorCode, DeepLinkHandler, DeepLinkHandlerError, HandlerConfig, HttpTransport,
    TransportError, TransportResponse, WebhookRequest,
};

pub mod app;
pub mod config;
pub mod logger;

// 重新导出 run 函数
pub use app::run;
