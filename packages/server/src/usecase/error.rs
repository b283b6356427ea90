//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::ArchiveError;

/// ルーム参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("Connection '{0}' is not registered")]
    ConnectionNotFound(String),

    #[error("User '{user_id}' is banned from room '{room_id}'")]
    Banned { room_id: String, user_id: String },
}

/// チャット送信・更新のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("Connection is not a member of room '{0}'")]
    NotAMember(String),

    #[error("Message '{0}' is already in the room history")]
    DuplicateMessageId(String),
}

/// 再生状態同期のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("Connection is not a member of room '{0}'")]
    NotAMember(String),

    #[error("Video '{0}' was already announced within the de-dup window")]
    DuplicateVideo(String),

    #[error("Room '{0}' has no playback state")]
    NoPlaybackState(String),
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Invalid room id")]
    InvalidRoomId,

    #[error("Room not found")]
    RoomNotFound,
}

/// 管理操作（kick / ban）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KickError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}
