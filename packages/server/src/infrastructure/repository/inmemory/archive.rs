//! InMemory ChatArchive 実装
//!
//! 外部の永続化サービスが用意されていない環境（開発・テスト）で使用する代替実装です。
//! プロセスが終了すると内容は失われます。メッセージはルームごとに上限件数までしか
//! 保持せず、超えた分は古いものから捨てます。

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ArchiveError, ChatArchive, ChatMessage, RoomId};

/// ルームごとに保持するメッセージ数の既定値
pub const DEFAULT_ARCHIVE_LIMIT: usize = 1_000;

/// インメモリの ChatArchive 実装
pub struct InMemoryChatArchive {
    limit: usize,
    messages: Mutex<HashMap<RoomId, VecDeque<ChatMessage>>>,
    bans: Mutex<HashMap<RoomId, HashSet<String>>>,
}

impl Default for InMemoryChatArchive {
    fn default() -> Self {
        Self::with_limit(DEFAULT_ARCHIVE_LIMIT)
    }
}

impl InMemoryChatArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// ルームごとの保持件数を指定して生成
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            messages: Mutex::new(HashMap::new()),
            bans: Mutex::new(HashMap::new()),
        }
    }

    /// ルームに保存されたメッセージ（保存順）
    pub async fn messages(&self, room_id: &RoomId) -> Vec<ChatMessage> {
        self.messages
            .lock()
            .await
            .get(room_id)
            .map(|messages| messages.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatArchive for InMemoryChatArchive {
    async fn create_message(&self, message: &ChatMessage) -> Result<(), ArchiveError> {
        let mut messages = self.messages.lock().await;
        let room = messages.entry(message.room_id.clone()).or_default();
        room.push_back(message.clone());
        while room.len() > self.limit {
            room.pop_front();
        }
        Ok(())
    }

    async fn is_banned(&self, room_id: &RoomId, user_id: &str) -> Result<bool, ArchiveError> {
        let bans = self.bans.lock().await;
        Ok(bans
            .get(room_id)
            .is_some_and(|users| users.contains(user_id)))
    }

    async fn ban_user(
        &self,
        room_id: &RoomId,
        user_id: &str,
        reason: Option<String>,
    ) -> Result<(), ArchiveError> {
        let mut bans = self.bans.lock().await;
        bans.entry(room_id.clone())
            .or_default()
            .insert(user_id.to_string());
        tracing::info!(
            "User '{}' banned from room '{}' (reason: {})",
            user_id,
            room_id,
            reason.as_deref().unwrap_or("none")
        );
        Ok(())
    }
}
