//! UseCase: クライアント接続処理
//!
//! トランスポートの接続ごとに接続 ID を払い出し、送信キューを登録します。
//! 払い出した ID は `connected` イベントでクライアントに伝えます。

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ConnectionId, MessagePusher, Notification, PusherChannel, SharedHub, Timestamp,
};

use super::notify::push_or_log;

/// クライアント接続のユースケース
pub struct ConnectClientUseCase {
    hub: SharedHub,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectClientUseCase {
    pub fn new(
        hub: SharedHub,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            hub,
            message_pusher,
            clock,
        }
    }

    /// 接続を登録する
    ///
    /// # Arguments
    ///
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// 生存中の接続と重複しない接続 ID
    pub async fn execute(&self, sender: PusherChannel) -> ConnectionId {
        let mut hub = self.hub.lock().await;
        let id = hub.register_connection(Timestamp::new(self.clock.now_millis()));
        self.message_pusher.register_client(id.clone(), sender).await;
        push_or_log(
            self.message_pusher.as_ref(),
            &id,
            &Notification::Connected {
                connection_id: id.clone(),
            },
        )
        .await;
        tracing::info!(
            "Client '{}' connected ({} live connections)",
            id,
            hub.connection_count()
        );
        id
    }
}
