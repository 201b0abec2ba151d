//! Deep Link 事件观察者
//!
//! 成功转发后通知已注册的观察者。观察者由调用方显式注册到处理器上，
//! 不经过任何全局事件总线。
//!
//! ## 设计
//! - `DeepLinkObserver`：基础 trait（dyn 兼容）
//! - `NoOpObserver`：空实现（用于测试）
//! - `FnObserver`：闭包适配
//! - `BroadcastObserver`：转发到 `tokio::sync::broadcast`，支持任意数量订阅者

use tokio::sync::broadcast;

/// 转发成功事件名
pub const DEEP_LINK_SUCCESS_EVENT: &str = "DeepLinkSuccess";

/// 观察者 trait
///
/// 可能在传输层的任务中被调用，实现必须是 `Send + Sync`。
/// 返回的错误只记录日志，不影响处理结果。
pub trait DeepLinkObserver: Send + Sync + 'static {
    fn emit_event(&self, event: &str) -> Result<(), String>;
}

/// 空观察者
#[derive(Debug, Clone)]
pub struct NoOpObserver;

impl DeepLinkObserver for NoOpObserver {
    fn emit_event(&self, _event: &str) -> Result<(), String> {
        Ok(())
    }
}

/// 闭包观察者
pub struct FnObserver<F>(F);

impl<F> FnObserver<F>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> DeepLinkObserver for FnObserver<F>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn emit_event(&self, event: &str) -> Result<(), String> {
        (self.0)(event);
        Ok(())
    }
}

/// 广播观察者
#[derive(Debug, Clone)]
pub struct BroadcastObserver {
    sender: broadcast::Sender<String>,
}

impl BroadcastObserver {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }
}

impl DeepLinkObserver for BroadcastObserver {
    fn emit_event(&self, event: &str) -> Result<(), String> {
        // 没有订阅者不算错误
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender
            .send(event.to_string())
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_noop_observer() {
        assert!(NoOpObserver.emit_event(DEEP_LINK_SUCCESS_EVENT).is_ok());
    }

    #[test]
    fn test_fn_observer() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let observer = FnObserver::new(move |event: &str| {
            assert_eq!(event, DEEP_LINK_SUCCESS_EVENT);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        observer.emit_event(DEEP_LINK_SUCCESS_EVENT).unwrap();
        observer.emit_event(DEEP_LINK_SUCCESS_EVENT).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        let observer = BroadcastObserver::new(4);
        assert!(observer.emit_event(DEEP_LINK_SUCCESS_EVENT).is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_to_all_subscribers() {
        let observer = BroadcastObserver::new(4);
        let mut first = observer.subscribe();
        let mut second = observer.subscribe();

        observer.emit_event(DEEP_LINK_SUCCESS_EVENT).unwrap();

        assert_eq!(first.recv().await.unwrap(), DEEP_LINK_SUCCESS_EVENT);
        assert_eq!(second.recv().await.unwrap(), DEEP_LINK_SUCCESS_EVENT);
    }
}
