//! UseCase: チャットメッセージ更新処理

use std::sync::Arc;

use crate::domain::{ChatMessage, ConnectionId, MessagePusher, Notification, SharedHub};

use super::{error::SendMessageError, notify::broadcast_or_log};

/// メッセージ更新のユースケース
pub struct UpdateMessageUseCase {
    hub: SharedHub,
    message_pusher: Arc<dyn MessagePusher>,
}

impl UpdateMessageUseCase {
    pub fn new(hub: SharedHub, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            hub,
            message_pusher,
        }
    }

    /// 同じ ID のメッセージを置き換え（なければ追加し）、送信者を含む全メンバーに通知する
    ///
    /// 通知されるのは更新後に保存されている内容。
    pub async fn execute(
        &self,
        from: &ConnectionId,
        message: ChatMessage,
    ) -> Result<Vec<ConnectionId>, SendMessageError> {
        let mut hub = self.hub.lock().await;
        let room = hub
            .joined_room_mut(from, &message.room_id)
            .ok_or_else(|| SendMessageError::NotAMember(message.room_id.to_string()))?;

        let stored = room.upsert_message(message);
        let targets = room.member_ids();
        broadcast_or_log(
            self.message_pusher.as_ref(),
            targets.clone(),
            &Notification::ChatMessageUpdate(stored),
        )
        .await;

        Ok(targets)
    }
}
