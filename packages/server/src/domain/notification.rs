//! クライアントへ通知するドメインイベント
//!
//! ワイヤーフォーマットへの変換は Infrastructure 層（`dto::conversion`）が行います。

use super::{
    entity::{ChatMessage, Member, PlaybackState, PlaybackSync},
    value_object::{ConnectionId, SignalPayload},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// 接続直後に払い出した接続 ID を伝える
    Connected { connection_id: ConnectionId },
    /// 参加者に既存メンバーを伝える
    ExistingUsers { users: Vec<Member> },
    UserJoined { member: Member },
    UserLeft { connection_id: ConnectionId },
    /// 中継されたシグナリングのペイロード
    Signal {
        sender: ConnectionId,
        payload: SignalPayload,
    },
    ChatMessage(ChatMessage),
    ChatHistory { messages: Vec<ChatMessage> },
    ChatMessageUpdate(ChatMessage),
    UserTyping { user: String },
    UserStopTyping { user: String },
    PlaybackState(PlaybackState),
    PlaybackSync {
        sender: ConnectionId,
        sync: PlaybackSync,
    },
    /// 管理操作による強制切断
    ForceDisconnect { reason: String },
}

impl Notification {
    /// ログ出力用のイベント名
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::ExistingUsers { .. } => "existing-users",
            Self::UserJoined { .. } => "user-joined",
            Self::UserLeft { .. } => "user-left",
            Self::Signal { .. } => "signal",
            Self::ChatMessage(_) => "chat-message",
            Self::ChatHistory { .. } => "chat-history",
            Self::ChatMessageUpdate(_) => "chat-message-update",
            Self::UserTyping { .. } => "user-typing",
            Self::UserStopTyping { .. } => "user-stop-typing",
            Self::PlaybackState(_) => "tube-state",
            Self::PlaybackSync { .. } => "tube-sync",
            Self::ForceDisconnect { .. } => "force-disconnect",
        }
    }
}
