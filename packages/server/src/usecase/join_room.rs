//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - スナップショット（existing-users）と参加通知（user-joined）の配信
//!
//! ### なぜこのテストが必要か
//! - 参加者は自分以外の全既存メンバーを 1 回だけ受け取る必要がある
//! - 既存メンバーは新しい参加者の通知をちょうど 1 回受け取る必要がある
//! - 1 つの接続が同時に複数のルームに所属してはならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：空のルームへの参加、既存メンバーのいるルームへの参加
//! - エッジケース：同じルームへの再参加、別ルームへの移動
//! - 異常系：ban されたユーザー、未登録の接続

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ChatArchive, ConnectionId, Member, MessagePusher, Notification, RoomId, SharedHub, Timestamp,
    UserDescriptor,
};

use super::{
    error::JoinRoomError,
    notify::{broadcast_or_log, push_or_log},
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    hub: SharedHub,
    message_pusher: Arc<dyn MessagePusher>,
    archive: Arc<dyn ChatArchive>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(
        hub: SharedHub,
        message_pusher: Arc<dyn MessagePusher>,
        archive: Arc<dyn ChatArchive>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            hub,
            message_pusher,
            archive,
            clock,
        }
    }

    /// ルーム参加を実行
    ///
    /// 参加者の追加・スナップショットの送信・既存メンバーへの通知は
    /// 1 回のロックの中で行われる。
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Member>)` - 参加時点の既存メンバー（参加順、自分を含まない）
    /// * `Err(JoinRoomError)` - 参加失敗
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
        user: UserDescriptor,
    ) -> Result<Vec<Member>, JoinRoomError> {
        // 1. ban チェック（永続化サービスが落ちていても参加は止めない）
        if let Some(user_id) = user.id.as_deref() {
            match self.archive.is_banned(&room_id, user_id).await {
                Ok(true) => {
                    tracing::warn!("Banned user '{}' tried to join '{}'", user_id, room_id);
                    return Err(JoinRoomError::Banned {
                        room_id: room_id.into_string(),
                        user_id: user_id.to_string(),
                    });
                }
                Ok(false) => {}
                Err(e) => tracing::warn!("Ban lookup failed for '{}': {}", user_id, e),
            }
        }

        let now = Timestamp::new(self.clock.now_millis());
        let member = Member {
            connection_id: connection_id.clone(),
            user: user.clone(),
            joined_at: now,
        };

        let mut hub = self.hub.lock().await;

        // 2. 問い合わせ中に記録された ban はロックの中で確認する
        if let Some(user_id) = user.id.as_deref()
            && hub.is_banned(&room_id, user_id)
        {
            tracing::warn!("Banned user '{}' tried to join '{}'", user_id, room_id);
            return Err(JoinRoomError::Banned {
                room_id: room_id.into_string(),
                user_id: user_id.to_string(),
            });
        }

        // 3. メンバー集合に追加してからスナップショットを計算
        let outcome = hub
            .join_room(connection_id, &room_id, user, now)
            .map_err(|_| JoinRoomError::ConnectionNotFound(connection_id.as_str().to_string()))?;

        // 4. 以前のルームに残ったメンバーへ退出を通知
        if let Some(left) = &outcome.left {
            tracing::info!("Client '{}' left room '{}'", connection_id, left.room_id);
            broadcast_or_log(
                self.message_pusher.as_ref(),
                left.remaining.clone(),
                &Notification::UserLeft {
                    connection_id: connection_id.clone(),
                },
            )
            .await;
        }

        // 5. 参加者にスナップショットを送信
        push_or_log(
            self.message_pusher.as_ref(),
            connection_id,
            &Notification::ExistingUsers {
                users: outcome.existing.clone(),
            },
        )
        .await;

        // 6. 既存メンバーに参加を通知（再参加では通知しない）
        if !outcome.already_member {
            let targets = outcome
                .existing
                .iter()
                .map(|m| m.connection_id.clone())
                .collect();
            broadcast_or_log(
                self.message_pusher.as_ref(),
                targets,
                &Notification::UserJoined { member },
            )
            .await;
            tracing::info!(
                "Client '{}' joined room '{}' ({} existing members)",
                connection_id,
                room_id,
                outcome.existing.len()
            );
        }

        Ok(outcome.existing)
    }
}
