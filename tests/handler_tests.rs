//! DeepLinkHandler 集成测试
//!
//! 通过公开 API 驱动完整流程，传输层用内存实现替代。

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use stepler_link_lib::app::process;
use stepler_link_lib::credential::StaticCredentialProvider;
use stepler_link_lib::events::BroadcastObserver;
use stepler_link_lib::{
    DeepLinkErrorCode, DeepLinkHandler, DeepLinkHandlerError, HandlerConfig, HttpTransport,
    TransportError, TransportResponse, WebhookRequest,
};

const VALID: &str = "https://stepler?userId=2&partnerAppCampaignId=12&language=en";

struct ScriptedTransport {
    result: Result<TransportResponse, TransportError>,
    sent: Mutex<Vec<WebhookRequest>>,
}

impl ScriptedTransport {
    fn new(result: Result<TransportResponse, TransportError>) -> Arc<Self> {
        Arc::new(Self {
            result,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn post(&self, request: WebhookRequest) -> Result<TransportResponse, TransportError> {
        self.sent.lock().push(request);
        self.result.clone()
    }
}

fn build(transport: Arc<ScriptedTransport>) -> DeepLinkHandler {
    DeepLinkHandler::new(
        &HandlerConfig::default(),
        transport,
        Arc::new(StaticCredentialProvider::new("sk-integration")),
    )
    .unwrap()
}

#[tokio::test]
async fn test_success_outcome() {
    let transport = ScriptedTransport::new(Ok(TransportResponse::status(200)));
    let outcome = process(&build(transport.clone()), VALID).await;

    assert!(outcome.success);
    assert!(outcome.error.is_none());
    assert_eq!(transport.sent(), 1);
}

#[tokio::test]
async fn test_http_error_outcome() {
    let transport = ScriptedTransport::new(Ok(TransportResponse::status(400)));
    let outcome = process(&build(transport), VALID).await;

    assert!(!outcome.success);
    let error = outcome.error.unwrap();
    assert_eq!(error.code, DeepLinkErrorCode::HttpError);
    assert_eq!(error.status, Some(400));
}

#[tokio::test]
async fn test_validation_errors_never_send() {
    let transport = ScriptedTransport::new(Ok(TransportResponse::status(200)));
    let handler = build(transport.clone());

    let cases = [
        ("not a url", DeepLinkErrorCode::MalformedUrl),
        ("http://google.com", DeepLinkErrorCode::WrongHost),
        (
            "http://google.com?userId=2&partnerAppCampaignId=12&language=en",
            DeepLinkErrorCode::WrongHost,
        ),
        ("http://stepler", DeepLinkErrorCode::MissingParameters),
        (
            "http://stepler?partnerAppCampaignId=12&language=en",
            DeepLinkErrorCode::MissingParameters,
        ),
    ];

    for (url, expected) in cases {
        let outcome = process(&handler, url).await;
        assert!(!outcome.success, "{url}");
        assert_eq!(outcome.error.unwrap().code, expected, "{url}");
    }
    assert_eq!(transport.sent(), 0);
}

#[tokio::test]
async fn test_transport_error_is_not_wrapped() {
    let transport = ScriptedTransport::new(Err(TransportError::new("Test", -1000, "offline")));
    let result = build(transport).handle(VALID).await;

    match result {
        Err(DeepLinkHandlerError::Transport(e)) => {
            assert_eq!(e, TransportError::new("Test", -1000, "offline"));
        }
        other => panic!("期望 Transport 错误，实际: {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let transport = ScriptedTransport::new(Ok(TransportResponse::status(200)));
    let handler = build(transport.clone());

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let handler = handler.clone();
            tokio::spawn(async move {
                let url = format!(
                    "https://stepler?userId={i}&partnerAppCampaignId=12&language=en"
                );
                handler.handle(&url).await
            })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
    assert_eq!(transport.sent(), 8);
}

#[tokio::test]
async fn test_broadcast_subscribers_see_success() {
    let observer = BroadcastObserver::new(8);
    let mut events = observer.subscribe();

    let ok = build(ScriptedTransport::new(Ok(TransportResponse::status(200))))
        .with_observer(observer.clone());
    ok.handle(VALID).await.unwrap();
    assert_eq!(events.recv().await.unwrap(), "DeepLinkSuccess");

    let failing = build(ScriptedTransport::new(Ok(TransportResponse::status(503))))
        .with_observer(observer);
    assert!(failing.handle(VALID).await.is_err());
    assert!(events.try_recv().is_err());
}
