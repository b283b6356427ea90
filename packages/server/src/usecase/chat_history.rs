//! UseCase: チャット履歴の取得

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, Notification, RoomId, SharedHub};

use super::notify::push_or_log;

/// 履歴取得のユースケース
pub struct GetChatHistoryUseCase {
    hub: SharedHub,
    message_pusher: Arc<dyn MessagePusher>,
}

impl GetChatHistoryUseCase {
    pub fn new(hub: SharedHub, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            hub,
            message_pusher,
        }
    }

    /// 要求した接続に `chat-history` を送る
    ///
    /// 存在しないルームなら空の履歴を送る。
    ///
    /// # Returns
    ///
    /// 送ったメッセージの件数
    pub async fn execute(&self, connection_id: &ConnectionId, room_id: &RoomId) -> usize {
        let hub = self.hub.lock().await;
        let messages = hub
            .room(room_id)
            .map(|room| room.history_batch())
            .unwrap_or_default();
        let count = messages.len();

        push_or_log(
            self.message_pusher.as_ref(),
            connection_id,
            &Notification::ChatHistory { messages },
        )
        .await;
        count
    }
}
