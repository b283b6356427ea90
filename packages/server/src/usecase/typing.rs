//! UseCase: タイピング状態の通知
//!
//! 2 秒で消える表示の期限切れ管理はクライアント側の責務です。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, Notification, RoomId, SharedHub};

use super::notify::broadcast_or_log;

/// タイピング通知のユースケース
pub struct TypingUseCase {
    hub: SharedHub,
    message_pusher: Arc<dyn MessagePusher>,
}

impl TypingUseCase {
    pub fn new(hub: SharedHub, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            hub,
            message_pusher,
        }
    }

    /// タイピング開始を送信者以外のメンバーに通知する
    ///
    /// `user` が省略されたら参加時の表示名を使う。メンバーでなければ何もしない。
    pub async fn start(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        user: Option<String>,
    ) -> Vec<ConnectionId> {
        let mut hub = self.hub.lock().await;
        let Some(room) = hub.joined_room_mut(connection_id, room_id) else {
            return Vec::new();
        };
        let Some(name) = user.or_else(|| room.member(connection_id).map(|m| m.user.name.clone()))
        else {
            return Vec::new();
        };

        room.start_typing(connection_id, &name);
        let targets = room.member_ids_except(connection_id);
        broadcast_or_log(
            self.message_pusher.as_ref(),
            targets.clone(),
            &Notification::UserTyping { user: name },
        )
        .await;
        targets
    }

    /// タイピング終了を送信者以外のメンバーに通知する
    ///
    /// 通知する名前は直前の `start` で使った名前。開始していなければ参加時の表示名。
    pub async fn stop(&self, connection_id: &ConnectionId, room_id: &RoomId) -> Vec<ConnectionId> {
        let mut hub = self.hub.lock().await;
        let Some(room) = hub.joined_room_mut(connection_id, room_id) else {
            return Vec::new();
        };
        let Some(name) = room
            .stop_typing(connection_id)
            .or_else(|| room.member(connection_id).map(|m| m.user.name.clone()))
        else {
            return Vec::new();
        };

        let targets = room.member_ids_except(connection_id);
        broadcast_or_log(
            self.message_pusher.as_ref(),
            targets.clone(),
            &Notification::UserStopTyping { user: name },
        )
        .await;
        targets
    }
}
