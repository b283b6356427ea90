//! WebSocket message DTOs.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": {...}}` with
//! camelCase fields.

use serde::{Deserialize, Serialize};

/// User descriptor as sent on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A room member (used by `existing-users` and `user-joined`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub connection_id: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: String,
    pub room_id: String,
    pub text: String,
    /// May be omitted by `chat-message-update`
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub sender_color: Option<String>,
    #[serde(default)]
    pub sender_avatar: Option<String>,
    /// Unix milliseconds. Zero means "let the server stamp it".
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStateDto {
    pub video_id: Option<String>,
    pub is_playing: bool,
    pub current_position: f64,
    pub timestamp: i64,
    pub updated_at: i64,
    pub owner: Option<String>,
}

// ========================================
// Client → Server
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_id: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRequestPayload {
    pub target: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub room_id: String,
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TubeUpdatePayload {
    pub room_id: String,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub is_playing: Option<bool>,
    #[serde(default)]
    pub current_position: Option<f64>,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TubeSyncPayload {
    pub room_id: String,
    pub current_position: f64,
    pub is_playing: bool,
}

/// Events sent by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinRoom(JoinRoomPayload),
    LeaveRoom(RoomPayload),
    Signal(SignalRequestPayload),
    ChatMessage(ChatMessageDto),
    ChatMessageUpdate(ChatMessageDto),
    GetHistory(RoomPayload),
    Typing(TypingPayload),
    StopTyping(RoomPayload),
    TubeUpdate(TubeUpdatePayload),
    TubeSync(TubeSyncPayload),
    TubeRequestState(RoomPayload),
}

// ========================================
// Server → Client
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedPayload {
    pub connection_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingUsersPayload {
    pub users: Vec<MemberDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLeftPayload {
    pub connection_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedSignalPayload {
    pub sender: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryPayload {
    pub messages: Vec<ChatMessageDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUserPayload {
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSyncDto {
    pub sender: String,
    pub current_position: f64,
    pub is_playing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceDisconnectPayload {
    pub reason: String,
}

/// Events sent by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    Connected(ConnectedPayload),
    ExistingUsers(ExistingUsersPayload),
    UserJoined(MemberDto),
    UserLeft(UserLeftPayload),
    Signal(RelayedSignalPayload),
    ChatMessage(ChatMessageDto),
    ChatHistory(ChatHistoryPayload),
    ChatMessageUpdate(ChatMessageDto),
    UserTyping(TypingUserPayload),
    UserStopTyping(TypingUserPayload),
    TubeState(PlaybackStateDto),
    TubeSync(PlaybackSyncDto),
    ForceDisconnect(ForceDisconnectPayload),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_join_room_event() {
        // テスト項目: join-room イベントが camelCase のフィールドで読み取れる
        // given (前提条件):
        let json = r##"{"event":"join-room","data":{"roomId":"general","user":{"name":"alice","color":"#f00"}}}"##;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::JoinRoom(JoinRoomPayload {
                room_id: "general".to_string(),
                user: UserDto {
                    id: None,
                    name: "alice".to_string(),
                    color: Some("#f00".to_string()),
                    avatar: None,
                    role: None,
                },
            })
        );
    }

    #[test]
    fn test_decode_signal_keeps_payload_untouched() {
        // テスト項目: signal のペイロードは任意の JSON のまま保持される
        let json = r#"{"event":"signal","data":{"target":"c-2","payload":{"type":"offer","sdp":"v=0\r\n","nested":[1,null,true]}}}"#;

        let event: ClientEvent = serde_json::from_str(json).unwrap();

        let ClientEvent::Signal(signal) = event else {
            panic!("expected signal event");
        };
        assert_eq!(signal.target, "c-2");
        assert_eq!(
            signal.payload,
            serde_json::json!({"type": "offer", "sdp": "v=0\r\n", "nested": [1, null, true]})
        );
    }

    #[test]
    fn test_decode_missing_room_id_fails() {
        // テスト項目: 必須フィールドが欠けたイベントはデコードエラーになる
        let json = r#"{"event":"leave-room","data":{}}"#;

        let result = serde_json::from_str::<ClientEvent>(json);

        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_event_fails() {
        // テスト項目: 未知のイベント名はデコードエラーになる
        let json = r#"{"event":"self-destruct","data":{}}"#;

        assert!(serde_json::from_str::<ClientEvent>(json).is_err());
    }

    #[test]
    fn test_encode_user_left_event() {
        // テスト項目: user-left イベントが期待する形式で書き出される
        let event = ServerEvent::UserLeft(UserLeftPayload {
            connection_id: "c-1".to_string(),
        });

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"event": "user-left", "data": {"connectionId": "c-1"}})
        );
    }
}
