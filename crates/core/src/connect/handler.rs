//! Deep Link 处理器
//!
//! 串联 解析 → 校验 → 发送 → 解释响应 的完整流程。
//!
//! 校验失败在任何网络请求之前返回；发送只进行一次。处理器本身不持有可变状态，
//! 克隆后可在多个任务中并发使用。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use stepler_core::connect::DeepLinkHandler;
//!
//! let handler = DeepLinkHandler::with_defaults(&HandlerConfig::default(), credentials)?;
//! handler.handle_deep_link(url, |success, error| {
//!     tracing::info!("success={success}, error={error:?}");
//! });
//! ```

use crate::config::HandlerConfig;
use crate::connect::deep_link::{parse_deep_link, ParsedParameters};
use crate::connect::webhook::{
    interpret_response, mask_key, HttpTransport, ReqwestTransport, WebhookRequest,
};
use crate::credential::CredentialProvider;
use crate::errors::{
    ConfigError, DeepLinkHandlerError, TransportError, RUNTIME_DOMAIN, TRANSPORT_CODE_OTHER,
};
use crate::events::{DeepLinkObserver, DEEP_LINK_SUCCESS_EVENT};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use url::Url;

/// Deep Link 处理器
#[derive(Clone)]
pub struct DeepLinkHandler {
    endpoint: Url,
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialProvider>,
    observers: Vec<Arc<dyn DeepLinkObserver>>,
}

impl std::fmt::Debug for DeepLinkHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLinkHandler")
            .field("endpoint", &self.endpoint.as_str())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl DeepLinkHandler {
    /// 创建处理器
    ///
    /// Webhook 地址在这里校验一次。
    pub fn new(
        config: &HandlerConfig,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: config.endpoint_url()?,
            transport,
            credentials,
            observers: Vec::new(),
        })
    }

    /// 使用 reqwest 传输层创建处理器
    pub fn with_defaults(
        config: &HandlerConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ConfigError> {
        let transport = Arc::new(ReqwestTransport::new(config)?);
        Self::new(config, transport, credentials)
    }

    /// 注册成功事件观察者
    pub fn with_observer(mut self, observer: impl DeepLinkObserver) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// 处理 Deep Link（异步）
    ///
    /// 成功时在返回前通知观察者。
    pub async fn handle(&self, url: &str) -> Result<(), DeepLinkHandlerError> {
        let params = self.prepare(url)?;
        let outcome = self.forward(params).await;
        if outcome.is_ok() {
            self.notify_success();
        }
        outcome
    }

    /// 处理 Deep Link（回调）
    ///
    /// 校验失败时在返回前同步调用 `completion`；否则把发送任务提交到当前
    /// Tokio 运行时，`completion` 在该任务中调用，成功后再通知观察者。
    ///
    /// 没有运行中的运行时、或发送任务 panic 时，以 `tokio` 域的传输层错误完成。
    pub fn handle_deep_link<F>(&self, url: &str, completion: F)
    where
        F: FnOnce(bool, Option<DeepLinkHandlerError>) + Send + 'static,
    {
        let params = match self.prepare(url) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!("[DeepLink] 校验失败: {}", e);
                completion(false, Some(e));
                return;
            }
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!("[DeepLink] 没有运行中的 Tokio 运行时: {}", e);
                let error = TransportError::new(
                    RUNTIME_DOMAIN,
                    TRANSPORT_CODE_OTHER,
                    format!("没有运行中的 Tokio 运行时: {e}"),
                );
                completion(false, Some(error.into()));
                return;
            }
        };

        let handler = self.clone();
        runtime.spawn(async move {
            let outcome = AssertUnwindSafe(handler.forward(params))
                .catch_unwind()
                .await;
            match outcome {
                Ok(Ok(())) => {
                    completion(true, None);
                    handler.notify_success();
                }
                Ok(Err(e)) => completion(false, Some(e)),
                Err(payload) => {
                    let message = panic_message(&*payload);
                    tracing::error!("[DeepLink] 发送任务 panic: {}", message);
                    let error = TransportError::new(
                        RUNTIME_DOMAIN,
                        TRANSPORT_CODE_OTHER,
                        format!("发送任务 panic: {message}"),
                    );
                    completion(false, Some(error.into()));
                }
            }
        });
    }

    /// 解析并校验 URL
    fn prepare(&self, url: &str) -> Result<ParsedParameters, DeepLinkHandlerError> {
        tracing::info!("[DeepLink] 处理 Deep Link: {}", url);
        let params = parse_deep_link(url)?;
        tracing::debug!("[DeepLink] 解析得到 {} 个参数", params.len());
        Ok(params)
    }

    /// 构造请求、发送并解释响应
    async fn forward(&self, params: ParsedParameters) -> Result<(), DeepLinkHandlerError> {
        let key = self.credentials.service_account_key();
        match &key {
            Some(key) => tracing::debug!("[DeepLink] 服务账号 Key: {}***", mask_key(key)),
            None => tracing::warn!("[DeepLink] 未配置服务账号 Key，不发送该请求头"),
        }

        let request = WebhookRequest::new(self.endpoint.clone(), key, &params).map_err(|e| {
            tracing::error!("[DeepLink] JSON 序列化失败: {}", e);
            e
        })?;

        let result = self.transport.post(request).await;
        match &result {
            Ok(response) => tracing::debug!("[Webhook] 响应: {:?}", response),
            Err(e) => tracing::warn!("[Webhook] 传输层错误: {}", e),
        }

        let outcome = interpret_response(result);
        if outcome.is_ok() {
            tracing::info!("[Webhook] 转发成功: endpoint={}", self.endpoint);
        }
        outcome
    }

    fn notify_success(&self) {
        for observer in &self.observers {
            if let Err(e) = observer.emit_event(DEEP_LINK_SUCCESS_EVENT) {
                tracing::warn!("[DeepLink] 观察者处理事件失败: {}", e);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "未知 panic".to_string()
    }
}
