//! 错误类型模块
//!
//! 定义 Stepler Deep Link 处理中的各种错误类型。
//!
//! ## 模块结构
//! - `handler_error`: 处理流水线错误（DeepLinkHandlerError, TransportError, ConfigError）

pub mod handler_error;

// 重新导出常用错误类型
pub use handler_error::{
    ConfigError, DeepLinkErrorCode, DeepLinkHandlerError, TransportError, RUNTIME_DOMAIN,
    TRANSPORT_CODE_CONNECT, TRANSPORT_CODE_OTHER, TRANSPORT_CODE_TIMEOUT,
};
