use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::model::DocumentId;

/// What just happened, for the benefit of whoever gets notified.
#[derive(Debug, Clone)]
pub struct Notification {
    pub action: WriteAction,
    /// Entity family, e.g. "match result".
    pub entity: &'static str,
    pub id: DocumentId,
    /// Short human summary, e.g. "SC Blau-Weiß 3:1 FC Rot".
    pub summary: String,
    /// The member who made the change, when known.
    pub actor: Option<DocumentId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum WriteAction {
    Created,
    Updated,
}

/// Outbound notification channel (mail relay, chat hook, …).
///
/// Delivery is best effort by contract: implementations may fail, and
/// callers never wait for them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<()>;
}

/// Default notifier: writes the notification to the log and nothing else.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        info!(
            entity = notification.entity,
            action = %notification.action,
            id = %notification.id,
            summary = %notification.summary,
            "content changed"
        );
        Ok(())
    }
}

/// Fire-and-forget dispatch: spawned after the write's outcome is already
/// decided, failures logged and dropped. The caller's result is final
/// before this task runs.
pub(crate) fn dispatch(notifier: &Arc<dyn Notifier>, notification: Notification) {
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move {
        if let Err(error) = notifier.notify(notification).await {
            warn!(%error, "notification delivery failed");
        }
    });
}
