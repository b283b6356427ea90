//! UseCase: 共有再生状態の同期
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PlaybackUseCase::update() / sync() / request_state()
//! - 部分更新のマージ、オーナーの記録、同じ動画の連続指定の抑止
//!
//! ### なぜこのテストが必要か
//! - 複数のクライアントが同時に同じ動画を指定すると再生が巻き戻る
//! - 位置補正（sync）は送信者自身に戻してはならない
//!
//! ### どのような状況を想定しているか
//! - 正常系：更新・位置補正・状態要求
//! - 異常系：ルーム外からの操作
//! - エッジケース：抑止ウィンドウ内外の同じ動画、再生状態がないルームへの sync

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ConnectionId, MessagePusher, Notification, PlaybackPatch, PlaybackState, PlaybackSync,
    RoomId, SharedHub, Timestamp,
};

use super::{
    error::PlaybackError,
    notify::{broadcast_or_log, push_or_log},
};

/// 共有再生のユースケース
pub struct PlaybackUseCase {
    hub: SharedHub,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl PlaybackUseCase {
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

    /// 再生状態の部分更新を適用し、全メンバーに `tube-state` を送る
    ///
    /// # Returns
    ///
    /// * `Ok(PlaybackState)` - 更新後の状態
    /// * `Err(PlaybackError)` - ルーム外からの更新、または抑止ウィンドウ内の同じ動画
    pub async fn update(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        patch: PlaybackPatch,
    ) -> Result<PlaybackState, PlaybackError> {
        let now = Timestamp::new(self.clock.now_millis());
        let mut hub = self.hub.lock().await;
        let window = hub.config().playback_dedup_window_millis;
        let room = hub
            .joined_room_mut(connection_id, room_id)
            .ok_or_else(|| PlaybackError::NotAMember(room_id.to_string()))?;

        let video_id = patch.video_id.clone().unwrap_or_default();
        let Some(state) = room.apply_playback_update(connection_id, patch, now, window) else {
            tracing::debug!(
                "Ignored repeated video '{}' in room '{}' from '{}'",
                video_id,
                room_id,
                connection_id
            );
            return Err(PlaybackError::DuplicateVideo(video_id));
        };

        broadcast_or_log(
            self.message_pusher.as_ref(),
            room.member_ids(),
            &Notification::PlaybackState(state.clone()),
        )
        .await;
        Ok(state)
    }

    /// 再生位置と再生中フラグを補正し、送信者以外に `tube-sync` を送る
    pub async fn sync(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        sync: PlaybackSync,
    ) -> Result<Vec<ConnectionId>, PlaybackError> {
        let now = Timestamp::new(self.clock.now_millis());
        let mut hub = self.hub.lock().await;
        let room = hub
            .joined_room_mut(connection_id, room_id)
            .ok_or_else(|| PlaybackError::NotAMember(room_id.to_string()))?;

        room.apply_playback_sync(sync, now)
            .ok_or_else(|| PlaybackError::NoPlaybackState(room_id.to_string()))?;

        let targets = room.member_ids_except(connection_id);
        broadcast_or_log(
            self.message_pusher.as_ref(),
            targets.clone(),
            &Notification::PlaybackSync {
                sender: connection_id.clone(),
                sync,
            },
        )
        .await;
        Ok(targets)
    }

    /// 現在の再生状態を要求した接続にだけ送る。状態がなければ何も送らない
    pub async fn request_state(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Option<PlaybackState> {
        let hub = self.hub.lock().await;
        let state = hub.room(room_id)?.playback.clone()?;
        push_or_log(
            self.message_pusher.as_ref(),
            connection_id,
            &Notification::PlaybackState(state.clone()),
        )
        .await;
        Some(state)
    }
}
