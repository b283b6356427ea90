//! UseCase: チャットメッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 履歴への追加、送信者以外へのブロードキャスト、外部への保存
//!
//! ### なぜこのテストが必要か
//! - 送信者は楽観的に表示済みのため、送信者に送り返してはならない
//! - 同じ ID のメッセージが履歴に重複するとクライアントの重複排除が壊れる
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト
//! - 異常系：ルーム外からの送信、同じ ID の再送、切断後の送信
//! - エッジケース：送信者のみが参加している場合（ブロードキャスト対象なし）

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ChatArchive, ChatMessage, ConnectionId, MessagePusher, Notification, SharedHub, Timestamp,
};

use super::{error::SendMessageError, notify::broadcast_or_log};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    hub: SharedHub,
    message_pusher: Arc<dyn MessagePusher>,
    archive: Arc<dyn ChatArchive>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
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

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `from` - 送信者の接続 ID
    /// * `message` - メッセージ（タイムスタンプが 0 ならサーバー時刻を付与）
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - ブロードキャスト対象
    /// * `Err(SendMessageError)` - 送信失敗
    pub async fn execute(
        &self,
        from: &ConnectionId,
        mut message: ChatMessage,
    ) -> Result<Vec<ConnectionId>, SendMessageError> {
        if message.timestamp.value() == 0 {
            message.timestamp = Timestamp::new(self.clock.now_millis());
        }

        let targets = {
            let mut hub = self.hub.lock().await;
            let room = hub
                .joined_room_mut(from, &message.room_id)
                .ok_or_else(|| SendMessageError::NotAMember(message.room_id.to_string()))?;

            // 1. 履歴に追加（同じ ID は受け付けない）
            if !room.append_message(message.clone()) {
                tracing::debug!("Dropped duplicate message '{}'", message.id);
                return Err(SendMessageError::DuplicateMessageId(message.id.to_string()));
            }

            // 2. 送信者以外のメンバーにブロードキャスト
            let targets = room.member_ids_except(from);
            broadcast_or_log(
                self.message_pusher.as_ref(),
                targets.clone(),
                &Notification::ChatMessage(message.clone()),
            )
            .await;
            targets
        };

        // 3. 外部サービスに保存（失敗しても配信済みのメッセージは取り消さない）
        if let Err(e) = self.archive.create_message(&message).await {
            tracing::warn!("Failed to archive message '{}': {}", message.id, e);
        }

        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ArchiveError, MessageId, repository::MockChatArchive},
        infrastructure::dto::websocket::ServerEvent,
        usecase::{
            DisconnectClientUseCase,
            test_support::{START_MILLIS, TestHub, room_id},
        },
    };

    fn message(id: &str, room: &str, text: &str) -> ChatMessage {
        ChatMessage {
            id: MessageId::new(id.to_string()).unwrap(),
            room_id: room_id(room),
            text: text.to_string(),
            sender: "alice".to_string(),
            sender_color: None,
            sender_avatar: None,
            timestamp: Timestamp::new(START_MILLIS - 10),
        }
    }

    fn usecase(t: &TestHub) -> SendMessageUseCase {
        SendMessageUseCase::new(
            t.hub.clone(),
            t.pusher.clone(),
            t.archive.clone(),
            t.clock.clone(),
        )
    }

    #[tokio::test]
    async fn test_send_message_broadcasts_to_others() {
        // テスト項目: メッセージは送信者以外のメンバーに 1 回ずつ届き、履歴と外部に保存される
        // given (前提条件):
        let t = TestHub::new();
        let (a, mut inbox_a) = t.join("general", "alice").await;
        let (b, mut inbox_b) = t.join("general", "bob").await;
        let (c, mut inbox_c) = t.join("general", "carol").await;
        inbox_a.drain();
        inbox_b.drain();
        let (_d, mut inbox_d) = t.join("music", "dave").await;

        // when (操作):
        let result = usecase(&t).execute(&a, message("m1", "general", "hi")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(vec![b, c]));
        let expected = ServerEvent::ChatMessage((&message("m1", "general", "hi")).into());
        assert_eq!(inbox_b.drain(), vec![expected.clone()]);
        assert_eq!(inbox_c.drain(), vec![expected]);
        assert!(inbox_a.drain().is_empty());
        assert!(inbox_d.drain().is_empty());
        assert_eq!(t.archive.messages(&room_id("general")).await.len(), 1);
        let hub = t.hub.lock().await;
        assert_eq!(hub.room(&room_id("general")).unwrap().history.len(), 1);
    }

    #[tokio::test]
    async fn test_send_message_no_broadcast_targets() {
        // テスト項目: 送信者のみが参加している場合、ブロードキャスト対象は空だが履歴には残る
        let t = TestHub::new();
        let (a, _inbox_a) = t.join("general", "alice").await;

        let result = usecase(&t).execute(&a, message("m1", "general", "hi")).await;

        assert_eq!(result, Ok(vec![]));
        let hub = t.hub.lock().await;
        assert_eq!(hub.room(&room_id("general")).unwrap().history.len(), 1);
    }

    #[tokio::test]
    async fn test_send_duplicate_id_is_dropped() {
        // テスト項目: 同じ ID の再送は履歴にも配信にも反映されない
        // given (前提条件):
        let t = TestHub::new();
        let (a, _inbox_a) = t.join("general", "alice").await;
        let (_b, mut inbox_b) = t.join("general", "bob").await;
        let usecase = usecase(&t);
        usecase.execute(&a, message("m1", "general", "hi")).await.unwrap();
        inbox_b.drain();

        // when (操作):
        let result = usecase.execute(&a, message("m1", "general", "hi")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::DuplicateMessageId("m1".to_string()))
        );
        assert!(inbox_b.drain().is_empty());
        let hub = t.hub.lock().await;
        assert_eq!(hub.room(&room_id("general")).unwrap().history.len(), 1);
    }

    #[tokio::test]
    async fn test_send_to_room_not_joined_is_rejected() {
        // テスト項目: 参加していないルームへの送信は拒否される
        let t = TestHub::new();
        let (a, _inbox_a) = t.join("general", "alice").await;
        let (_b, mut inbox_b) = t.join("music", "bob").await;

        let result = usecase(&t).execute(&a, message("m1", "music", "hi")).await;

        assert_eq!(result, Err(SendMessageError::NotAMember("music".to_string())));
        assert!(inbox_b.drain().is_empty());
    }

    #[tokio::test]
    async fn test_send_from_disconnected_connection_is_dropped() {
        // テスト項目: 切断済みの接続からのメッセージは履歴にも配信にも反映されない
        // given (前提条件):
        let t = TestHub::new();
        let (a, _inbox_a) = t.join("general", "alice").await;
        let (_b, mut inbox_b) = t.join("general", "bob").await;
        DisconnectClientUseCase::new(t.hub.clone(), t.pusher.clone())
            .execute(&a)
            .await;
        inbox_b.drain();

        // when (操作):
        let result = usecase(&t).execute(&a, message("m1", "general", "late")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SendMessageError::NotAMember("general".to_string()))
        );
        assert!(inbox_b.drain().is_empty());
        assert!(t.archive.messages(&room_id("general")).await.is_empty());
        let hub = t.hub.lock().await;
        assert!(hub.room(&room_id("general")).unwrap().history.is_empty());
    }

    #[tokio::test]
    async fn test_send_message_stamps_missing_timestamp() {
        // テスト項目: タイムスタンプがないメッセージにはサーバー時刻が付与される
        let t = TestHub::new();
        let (a, _inbox_a) = t.join("general", "alice").await;
        let mut unstamped = message("m1", "general", "hi");
        unstamped.timestamp = Timestamp::new(0);

        usecase(&t).execute(&a, unstamped).await.unwrap();

        let hub = t.hub.lock().await;
        let history = hub.room(&room_id("general")).unwrap().history_batch();
        assert_eq!(history[0].timestamp, Timestamp::new(START_MILLIS));
    }

    #[tokio::test]
    async fn test_archive_failure_does_not_fail_send() {
        // テスト項目: 外部への保存に失敗しても送信は成功する
        let t = TestHub::new();
        let (a, _inbox_a) = t.join("general", "alice").await;
        let (b, _inbox_b) = t.join("general", "bob").await;
        let mut archive = MockChatArchive::new();
        archive
            .expect_create_message()
            .times(1)
            .returning(|_| Err(ArchiveError::Unavailable("down".to_string())));
        let usecase = SendMessageUseCase::new(
            t.hub.clone(),
            t.pusher.clone(),
            Arc::new(archive),
            t.clock.clone(),
        );

        let result = usecase.execute(&a, message("m1", "general", "hi")).await;

        assert_eq!(result, Ok(vec![b]));
    }
}
