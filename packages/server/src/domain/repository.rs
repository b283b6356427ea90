//! 外部永続化サービスの trait 定義
//!
//! チャットの保存と ban 情報はこのサーバーの外にあるサービスが持ちます。
//! UseCase 層はこの trait に依存し、具体的な実装には依存しません。

use async_trait::async_trait;

use super::{entity::ChatMessage, error::ArchiveError, value_object::RoomId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatArchive: Send + Sync {
    /// チャットメッセージを保存
    async fn create_message(&self, message: &ChatMessage) -> Result<(), ArchiveError>;

    /// ユーザーがルームから ban されているか
    async fn is_banned(&self, room_id: &RoomId, user_id: &str) -> Result<bool, ArchiveError>;

    /// ユーザーをルームから ban する
    async fn ban_user(
        &self,
        room_id: &RoomId,
        user_id: &str,
        reason: Option<String>,
    ) -> Result<(), ArchiveError>;
}
