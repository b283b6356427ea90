//! UseCase: 管理操作による強制切断（kick / ban）
//!
//! シグナリングのイベントストリームとは別に、HTTP の管理 API から呼ばれます。

use std::sync::Arc;

use crate::domain::{
    ChatArchive, ConnectionId, HubState, MessagePusher, Notification, RoomId, SharedHub, UserId,
};

use super::{disconnect_client::teardown_connection, error::KickError, notify::push_or_log};

/// 強制切断のユースケース
pub struct KickUserUseCase {
    hub: SharedHub,
    message_pusher: Arc<dyn MessagePusher>,
    archive: Arc<dyn ChatArchive>,
}

impl KickUserUseCase {
    pub fn new(
        hub: SharedHub,
        message_pusher: Arc<dyn MessagePusher>,
        archive: Arc<dyn ChatArchive>,
    ) -> Self {
        Self {
            hub,
            message_pusher,
            archive,
        }
    }

    /// ユーザー ID に紐づく全接続を切断する
    ///
    /// # Returns
    ///
    /// 切断した接続の数
    pub async fn disconnect_by_user_id(&self, user_id: &UserId, reason: &str) -> usize {
        let mut hub = self.hub.lock().await;
        let targets = hub.connections_of_user(user_id.as_str());
        self.force_disconnect(&mut hub, targets, reason).await
    }

    /// ユーザーをルームから ban し、そのルームにいる接続を切断する
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 切断した接続の数
    /// * `Err(KickError)` - ban の記録に失敗（誰も切断しない）
    pub async fn ban_from_room(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        reason: Option<String>,
    ) -> Result<usize, KickError> {
        self.archive
            .ban_user(room_id, user_id.as_str(), reason.clone())
            .await?;

        let mut hub = self.hub.lock().await;
        hub.record_ban(room_id, user_id.as_str());
        let targets: Vec<ConnectionId> = hub
            .connections_of_user(user_id.as_str())
            .into_iter()
            .filter(|id| {
                hub.connection(id)
                    .is_some_and(|c| c.room.as_ref() == Some(room_id))
            })
            .collect();
        let reason = reason.unwrap_or_else(|| "banned".to_string());
        Ok(self.force_disconnect(&mut hub, targets, &reason).await)
    }

    async fn force_disconnect(
        &self,
        hub: &mut HubState,
        targets: Vec<ConnectionId>,
        reason: &str,
    ) -> usize {
        let notification = Notification::ForceDisconnect {
            reason: reason.to_string(),
        };
        let mut count = 0;
        for id in targets {
            // 登録解除の前に積んだ通知はクライアントに届く
            push_or_log(self.message_pusher.as_ref(), &id, &notification).await;
            if teardown_connection(hub, self.message_pusher.as_ref(), &id)
                .await
                .is_some()
            {
                tracing::info!("Client '{}' force-disconnected: {}", id, reason);
                count += 1;
            }
        }
        count
    }
}
