//! UseCase: クライアント切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - 切断時の退出通知、シグナリング関係の破棄、送信キューの登録解除
//!
//! ### なぜこのテストが必要か
//! - 切断後に古い参加者が残ってはならない
//! - 切断した接続への送信・切断した接続からの中継が止まる必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム参加中の切断
//! - エッジケース：ルーム未参加での切断、2 回目の切断

use std::sync::Arc;

use crate::domain::{ConnectionId, HubState, MessagePusher, Notification, SharedHub};

use super::notify::broadcast_or_log;

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    hub: SharedHub,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectClientUseCase {
    pub fn new(hub: SharedHub, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            hub,
            message_pusher,
        }
    }

    /// クライアント切断を実行
    ///
    /// # Returns
    ///
    /// `user-left` を通知したメンバー（未登録の接続なら空）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Vec<ConnectionId> {
        let mut hub = self.hub.lock().await;
        match teardown_connection(&mut hub, self.message_pusher.as_ref(), connection_id).await {
            Some(notified) => {
                tracing::info!(
                    "Client '{}' disconnected and removed from registry",
                    connection_id
                );
                notified
            }
            None => Vec::new(),
        }
    }
}

/// 接続に紐づく状態をすべて破棄する
///
/// ルームからの退出と通知、シグナリング関係の破棄、レジストリからの削除、
/// 送信キューの登録解除を同じロックの中で行う。未登録なら None。
pub(crate) async fn teardown_connection(
    hub: &mut HubState,
    pusher: &dyn MessagePusher,
    connection_id: &ConnectionId,
) -> Option<Vec<ConnectionId>> {
    if !hub.is_connected(connection_id) {
        return None;
    }

    let notified = match hub.leave_current_room(connection_id) {
        Some(outcome) => {
            broadcast_or_log(
                pusher,
                outcome.remaining.clone(),
                &Notification::UserLeft {
                    connection_id: connection_id.clone(),
                },
            )
            .await;
            outcome.remaining
        }
        None => Vec::new(),
    };

    hub.remove_connection(connection_id);
    pusher.unregister_client(connection_id).await;

    Some(notified)
}
