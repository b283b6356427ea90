//! 通知送信のヘルパー
//!
//! 送信はキューへの投入までで、失敗しても呼び出し元の処理は続行する。

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, Notification};

pub(crate) async fn push_or_log(
    pusher: &dyn MessagePusher,
    target: &ConnectionId,
    notification: &Notification,
) -> bool {
    match pusher.push_to(target, notification).await {
        Ok(()) => true,
        Err(MessagePushError::ClientNotFound(id)) => {
            tracing::debug!(
                "Dropped '{}' for disconnected client '{}'",
                notification.event_name(),
                id
            );
            false
        }
        Err(e) => {
            tracing::warn!(
                "Failed to push '{}' to '{}': {}",
                notification.event_name(),
                target,
                e
            );
            false
        }
    }
}

pub(crate) async fn broadcast_or_log(
    pusher: &dyn MessagePusher,
    targets: Vec<ConnectionId>,
    notification: &Notification,
) {
    if let Err(e) = pusher.broadcast(targets, notification).await {
        tracing::warn!(
            "Failed to broadcast '{}': {}",
            notification.event_name(),
            e
        );
    }
}
