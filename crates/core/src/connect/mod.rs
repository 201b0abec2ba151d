//! Stepler Connect 模块
//!
//! 接收合作方 App 的 Deep Link，校验归因参数后转发到 Stepler Webhook。
//!
//! ## 子模块
//!
//! - `deep_link` - Deep Link URL 解析与校验
//! - `webhook` - 请求构造、传输层与响应解释
//! - `handler` - 串联完整流程的处理器
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use stepler_core::connect::{parse_deep_link, DeepLinkHandler};
//!
//! // 仅解析
//! let params = parse_deep_link("https://stepler?userId=2&partnerAppCampaignId=12&language=en")?;
//!
//! // 解析并转发
//! handler.handle(url).await?;
//! ```

// 子模块声明
pub mod deep_link;
pub mod handler;
pub mod webhook;

// 重新导出核心类型
pub use deep_link::{
    parse_deep_link, parse_url, query_items, ParsedParameters, QueryItem, CAMPAIGN_KEY,
    LANGUAGE_KEY, REQUIRED_FIELDS, STEPLER_HOST, USER_ID_KEY,
};
pub use handler::DeepLinkHandler;
pub use webhook::{
    interpret_response, mask_key, HttpTransport, ReqwestTransport, TransportResponse,
    WebhookRequest, SERVICE_ACCOUNT_KEY_HEADER,
};
