//! Conversion logic between DTOs and domain entities.

use hiroba_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ChatMessage, Member, MessageId, Notification, PlaybackState, Room, RoomId, Timestamp,
    UserDescriptor, ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::UserDto> for UserDescriptor {
    fn from(dto: dto::UserDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            color: dto.color,
            avatar: dto.avatar,
            role: dto.role,
        }
    }
}

impl TryFrom<dto::ChatMessageDto> for ChatMessage {
    type Error = ValueObjectError;

    fn try_from(dto: dto::ChatMessageDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MessageId::new(dto.id)?,
            room_id: RoomId::new(dto.room_id)?,
            text: dto.text,
            sender: dto.sender,
            sender_color: dto.sender_color,
            sender_avatar: dto.sender_avatar,
            timestamp: Timestamp::new(dto.timestamp),
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&UserDescriptor> for dto::UserDto {
    fn from(model: &UserDescriptor) -> Self {
        Self {
            id: model.id.clone(),
            name: model.name.clone(),
            color: model.color.clone(),
            avatar: model.avatar.clone(),
            role: model.role.clone(),
        }
    }
}

impl From<&Member> for dto::MemberDto {
    fn from(model: &Member) -> Self {
        Self {
            connection_id: model.connection_id.as_str().to_string(),
            user: (&model.user).into(),
        }
    }
}

impl From<&ChatMessage> for dto::ChatMessageDto {
    fn from(model: &ChatMessage) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            room_id: model.room_id.as_str().to_string(),
            text: model.text.clone(),
            sender: model.sender.clone(),
            sender_color: model.sender_color.clone(),
            sender_avatar: model.sender_avatar.clone(),
            timestamp: model.timestamp.value(),
        }
    }
}

impl From<&PlaybackState> for dto::PlaybackStateDto {
    fn from(model: &PlaybackState) -> Self {
        Self {
            video_id: model.video_id.clone(),
            is_playing: model.is_playing,
            current_position: model.current_position,
            timestamp: model.timestamp.value(),
            updated_at: model.updated_at.value(),
            owner: model.owner.as_ref().map(|id| id.as_str().to_string()),
        }
    }
}

impl From<&Notification> for dto::ServerEvent {
    fn from(notification: &Notification) -> Self {
        match notification {
            Notification::Connected { connection_id } => {
                Self::Connected(dto::ConnectedPayload {
                    connection_id: connection_id.as_str().to_string(),
                })
            }
            Notification::ExistingUsers { users } => {
                Self::ExistingUsers(dto::ExistingUsersPayload {
                    users: users.iter().map(Into::into).collect(),
                })
            }
            Notification::UserJoined { member } => Self::UserJoined(member.into()),
            Notification::UserLeft { connection_id } => Self::UserLeft(dto::UserLeftPayload {
                connection_id: connection_id.as_str().to_string(),
            }),
            Notification::Signal { sender, payload } => {
                Self::Signal(dto::RelayedSignalPayload {
                    sender: sender.as_str().to_string(),
                    payload: payload.clone(),
                })
            }
            Notification::ChatMessage(message) => Self::ChatMessage(message.into()),
            Notification::ChatHistory { messages } => {
                Self::ChatHistory(dto::ChatHistoryPayload {
                    messages: messages.iter().map(Into::into).collect(),
                })
            }
            Notification::ChatMessageUpdate(message) => Self::ChatMessageUpdate(message.into()),
            Notification::UserTyping { user } => {
                Self::UserTyping(dto::TypingUserPayload { user: user.clone() })
            }
            Notification::UserStopTyping { user } => {
                Self::UserStopTyping(dto::TypingUserPayload { user: user.clone() })
            }
            Notification::PlaybackState(state) => Self::TubeState(state.into()),
            Notification::PlaybackSync { sender, sync } => Self::TubeSync(dto::PlaybackSyncDto {
                sender: sender.as_str().to_string(),
                current_position: sync.current_position,
                is_playing: sync.is_playing,
            }),
            Notification::ForceDisconnect { reason } => {
                Self::ForceDisconnect(dto::ForceDisconnectPayload {
                    reason: reason.clone(),
                })
            }
        }
    }
}

impl From<&Room> for http::RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            members: room.members.iter().map(|m| m.user.name.clone()).collect(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&Room> for http::RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            members: room
                .members
                .iter()
                .map(|m| http::MemberDetailDto {
                    connection_id: m.connection_id.as_str().to_string(),
                    user: (&m.user).into(),
                    joined_at: timestamp_to_rfc3339(m.joined_at.value()),
                })
                .collect(),
            typing: room.typing.iter().cloned().collect(),
            playback: room.playback.as_ref().map(Into::into),
            history_size: room.history.len(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, PlaybackSync};

    #[test]
    fn test_dto_chat_message_to_domain() {
        // テスト項目: DTO の ChatMessage がドメインエンティティに変換される
        // given (前提条件):
        let dto_msg = dto::ChatMessageDto {
            id: "m1".to_string(),
            room_id: "general".to_string(),
            text: "hi".to_string(),
            sender: "alice".to_string(),
            sender_color: Some("#0af".to_string()),
            sender_avatar: None,
            timestamp: 1000,
        };

        // when (操作):
        let domain_msg = ChatMessage::try_from(dto_msg).unwrap();

        // then (期待する結果):
        assert_eq!(domain_msg.id.as_str(), "m1");
        assert_eq!(domain_msg.room_id.as_str(), "general");
        assert_eq!(domain_msg.sender_color.as_deref(), Some("#0af"));
        assert_eq!(domain_msg.timestamp, Timestamp::new(1000));
    }

    #[test]
    fn test_dto_chat_message_without_id_is_rejected() {
        // テスト項目: ID が空のメッセージは変換エラーになる
        let dto_msg = dto::ChatMessageDto {
            id: "".to_string(),
            room_id: "general".to_string(),
            text: "hi".to_string(),
            sender: "alice".to_string(),
            sender_color: None,
            sender_avatar: None,
            timestamp: 0,
        };

        let result = ChatMessage::try_from(dto_msg);

        assert_eq!(result, Err(ValueObjectError::Empty("message id")));
    }

    #[test]
    fn test_existing_users_notification_to_event() {
        // テスト項目: existing-users 通知が参加順のメンバー一覧に変換される
        // given (前提条件):
        let member = Member {
            connection_id: ConnectionId::new("c-1".to_string()).unwrap(),
            user: UserDescriptor::named("alice"),
            joined_at: Timestamp::new(0),
        };
        let notification = Notification::ExistingUsers {
            users: vec![member],
        };

        // when (操作):
        let event = dto::ServerEvent::from(&notification);

        // then (期待する結果):
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event": "existing-users",
                "data": {"users": [{"connectionId": "c-1", "user": {"name": "alice"}}]}
            })
        );
    }

    #[test]
    fn test_playback_sync_notification_to_event() {
        // テスト項目: tube-sync 通知に送信者と位置が含まれる
        let notification = Notification::PlaybackSync {
            sender: ConnectionId::new("c-9".to_string()).unwrap(),
            sync: PlaybackSync {
                current_position: 12.5,
                is_playing: false,
            },
        };

        let event = dto::ServerEvent::from(&notification);

        assert_eq!(
            event,
            dto::ServerEvent::TubeSync(dto::PlaybackSyncDto {
                sender: "c-9".to_string(),
                current_position: 12.5,
                is_playing: false,
            })
        );
    }
}
