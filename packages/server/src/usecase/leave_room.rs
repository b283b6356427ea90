//! UseCase: ルーム退出処理

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, Notification, RoomId, SharedHub};

use super::notify::broadcast_or_log;

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    hub: SharedHub,
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    pub fn new(hub: SharedHub, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            hub,
            message_pusher,
        }
    }

    /// ルーム退出を実行
    ///
    /// メンバーでなければ何もしない（冪等）。
    ///
    /// # Returns
    ///
    /// `user-left` を通知した残りのメンバー
    pub async fn execute(&self, connection_id: &ConnectionId, room_id: &RoomId) -> Vec<ConnectionId> {
        let mut hub = self.hub.lock().await;
        let Some(outcome) = hub.leave_room(connection_id, room_id) else {
            tracing::debug!(
                "Client '{}' is not a member of '{}', ignoring leave",
                connection_id,
                room_id
            );
            return Vec::new();
        };

        broadcast_or_log(
            self.message_pusher.as_ref(),
            outcome.remaining.clone(),
            &Notification::UserLeft {
                connection_id: connection_id.clone(),
            },
        )
        .await;
        tracing::info!("Client '{}' left room '{}'", connection_id, room_id);

        outcome.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::dto::websocket::{ServerEvent, UserLeftPayload},
        usecase::test_support::{TestHub, room_id},
    };

    #[tokio::test]
    async fn test_leave_notifies_remaining_members_once() {
        // テスト項目: 退出すると残りのメンバー全員に user-left が 1 回だけ届く
        // given (前提条件):
        let t = TestHub::new();
        let (a, mut inbox_a) = t.join("general", "alice").await;
        let (b, mut inbox_b) = t.join("general", "bob").await;
        let (c, mut inbox_c) = t.join("general", "carol").await;
        inbox_a.drain();
        inbox_b.drain();
        let usecase = LeaveRoomUseCase::new(t.hub.clone(), t.pusher.clone());

        // when (操作):
        let notified = usecase.execute(&b, &room_id("general")).await;

        // then (期待する結果):
        assert_eq!(notified, vec![a, c]);
        let left = ServerEvent::UserLeft(UserLeftPayload {
            connection_id: b.as_str().to_string(),
        });
        assert_eq!(inbox_a.drain(), vec![left.clone()]);
        assert_eq!(inbox_c.drain(), vec![left]);
        assert!(inbox_b.drain().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_leave_is_noop() {
        // テスト項目: 2 回目の退出は何も通知しない
        // given (前提条件):
        let t = TestHub::new();
        let (_a, mut inbox_a) = t.join("general", "alice").await;
        let (b, _inbox_b) = t.join("general", "bob").await;
        inbox_a.drain();
        let usecase = LeaveRoomUseCase::new(t.hub.clone(), t.pusher.clone());
        usecase.execute(&b, &room_id("general")).await;
        inbox_a.drain();

        // when (操作):
        let notified = usecase.execute(&b, &room_id("general")).await;

        // then (期待する結果):
        assert!(notified.is_empty());
        assert!(inbox_a.drain().is_empty());
    }

    #[tokio::test]
    async fn test_leave_other_room_is_noop() {
        // テスト項目: 参加していないルームからの退出は無視される
        let t = TestHub::new();
        let (a, _inbox_a) = t.join("general", "alice").await;
        let usecase = LeaveRoomUseCase::new(t.hub.clone(), t.pusher.clone());

        let notified = usecase.execute(&a, &room_id("music")).await;

        assert!(notified.is_empty());
        assert!(t.hub.lock().await.room(&room_id("general")).unwrap().is_member(&a));
    }
}
