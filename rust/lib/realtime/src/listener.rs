use serde_json::Value;
use tokio::sync::mpsc;

/// One child delivered to a child-added listener.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildEvent {
    /// The child's key under the observed path.
    pub key: String,
    /// The child's subtree at the time it was added.
    pub value: Value,
}

/// Handle for a long-lived child-added listener.
///
/// Delivers one event per existing child, then one per child added later.
/// The stream never ends on its own while the database is alive; dropping
/// the handle unsubscribes.
pub struct ChildAdded {
    rx: mpsc::UnboundedReceiver<ChildEvent>,
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl ChildAdded {
    /// Wrap a receiver. `detach` runs once when the handle is dropped.
    pub fn new<F>(rx: mpsc::UnboundedReceiver<ChildEvent>, detach: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            rx,
            detach: Some(Box::new(detach)),
        }
    }

    /// Wait for the next child. Returns None only once the database is gone.
    pub async fn next(&mut self) -> Option<ChildEvent> {
        self.rx.recv().await
    }

    /// Take the next child if one is already queued.
    pub fn try_next(&mut self) -> Option<ChildEvent> {
        self.rx.try_recv().ok()
    }

    /// Take every child queued right now.
    pub fn drain_ready(&mut self) -> Vec<ChildEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

impl Drop for ChildAdded {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}
