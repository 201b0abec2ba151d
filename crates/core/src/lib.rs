//! Stepler Deep Link 核心库
//!
//! 包含 connect（解析、转发、处理器）、credential、events、errors、config 等基础功能

pub mod config;
pub mod connect;
pub mod credential;
pub mod errors;
pub mod events;

pub use config::HandlerConfig;
pub use connect::{DeepLinkHandler, HttpTransport, ParsedParameters, TransportResponse, WebhookRequest};
pub use credential::{
    ChainedCredentialProvider, CredentialProvider, EnvCredentialProvider,
    MetadataFileCredentialProvider, StaticCredentialProvider,
};
pub use errors::{ConfigError, DeepLinkErrorCode, DeepLinkHandlerError, TransportError};
pub use events::{BroadcastObserver, DeepLinkObserver, FnObserver, NoOpObserver};
