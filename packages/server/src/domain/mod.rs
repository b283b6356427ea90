//! Domain layer
//!
//! - `value_object`: 識別子などの値オブジェクト
//! - `entity`: Room / Connection / ChatMessage / PlaybackState
//! - `hub`: プロセス全体の接続・ルーム状態
//! - `notification`: クライアントへ通知するドメインイベント
//! - `message_pusher`: 通知送信の抽象化
//! - `repository`: 外部永続化サービスの抽象化

pub mod entity;
pub mod error;
pub mod hub;
pub mod message_pusher;
pub mod notification;
pub mod repository;
pub mod value_object;

pub use entity::{
    ChatMessage, Connection, Member, PlaybackPatch, PlaybackState, PlaybackSync, Room,
    UserDescriptor,
};
pub use error::{ArchiveError, HubError, MessagePushError, ValueObjectError};
pub use hub::{HubConfig, HubState, JoinOutcome, LeaveOutcome, SharedHub};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use notification::Notification;
pub use repository::ChatArchive;
pub use value_object::{ConnectionId, MessageId, RoomId, SignalPayload, Timestamp, UserId};
