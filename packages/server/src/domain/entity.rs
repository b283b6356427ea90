//! ドメインエンティティ
//!
//! Room はメンバー集合・チャット履歴・タイピング集合・再生状態を保持する集約です。
//! ここにあるメソッドはすべて副作用のない状態遷移で、通知は UseCase 層が行います。

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use super::value_object::{ConnectionId, MessageId, RoomId, Timestamp};

/// 参加時にクライアントが渡すユーザー情報
///
/// 一意性は保証されない。1 回のメンバーシップの間は不変。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserDescriptor {
    /// アプリケーションのユーザー ID（ゲストは None）
    pub id: Option<String>,
    pub name: String,
    pub color: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<String>,
}

impl UserDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// ルームのメンバー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub user: UserDescriptor,
    pub joined_at: Timestamp,
}

/// トランスポート層の 1 セッション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    /// 参加中のルーム（未参加なら None）
    pub room: Option<RoomId>,
    /// 参加中ルームでのユーザー情報
    pub user: Option<UserDescriptor>,
    pub connected_at: Timestamp,
    /// シグナリングをやり取りした相手
    pub peers: HashSet<ConnectionId>,
}

impl Connection {
    pub fn new(id: ConnectionId, connected_at: Timestamp) -> Self {
        Self {
            id,
            room: None,
            user: None,
            connected_at,
            peers: HashSet::new(),
        }
    }

    /// kick 対象のユーザーかどうか
    pub fn belongs_to_user(&self, user_id: &str) -> bool {
        self.user
            .as_ref()
            .and_then(|user| user.id.as_deref())
            .is_some_and(|id| id == user_id)
    }
}

/// チャットメッセージ
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub text: String,
    pub sender: String,
    pub sender_color: Option<String>,
    pub sender_avatar: Option<String>,
    pub timestamp: Timestamp,
}

/// ルームで共有される再生状態
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackState {
    pub video_id: Option<String>,
    pub is_playing: bool,
    /// 再生位置（秒）
    pub current_position: f64,
    /// クライアントが送ってきた時刻
    pub timestamp: Timestamp,
    /// サーバーが最後に更新を受け付けた時刻
    pub updated_at: Timestamp,
    /// 最後に更新した接続（表示用であり、他の接続の更新は妨げない）
    pub owner: Option<ConnectionId>,
}

/// 再生状態の部分更新
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackPatch {
    pub video_id: Option<String>,
    pub is_playing: Option<bool>,
    pub current_position: Option<f64>,
    pub timestamp: Timestamp,
}

/// 定期的な再生位置の補正
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSync {
    pub current_position: f64,
    pub is_playing: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct AcceptedPlaybackUpdate {
    video_id: Option<String>,
    accepted_at: Timestamp,
}

/// チャットルーム集約
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    /// 参加順に並んだメンバー
    pub members: Vec<Member>,
    /// 直近のメッセージ（古い順）
    pub history: VecDeque<ChatMessage>,
    pub history_limit: usize,
    /// タイピング中の名前
    pub typing: BTreeSet<String>,
    pub playback: Option<PlaybackState>,
    /// 接続ごとに最後にタイピングを開始したときの名前
    typing_names: HashMap<ConnectionId, String>,
    last_playback_update: Option<AcceptedPlaybackUpdate>,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp, history_limit: usize) -> Self {
        Self {
            id,
            created_at,
            members: Vec::new(),
            history: VecDeque::new(),
            history_limit,
            typing: BTreeSet::new(),
            playback: None,
            typing_names: HashMap::new(),
            last_playback_update: None,
        }
    }

    pub fn is_member(&self, connection_id: &ConnectionId) -> bool {
        self.members
            .iter()
            .any(|m| &m.connection_id == connection_id)
    }

    pub fn member(&self, connection_id: &ConnectionId) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| &m.connection_id == connection_id)
    }

    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|m| m.connection_id.clone()).collect()
    }

    /// `exclude` 以外のメンバーの接続 ID
    pub fn member_ids_except(&self, exclude: &ConnectionId) -> Vec<ConnectionId> {
        self.members
            .iter()
            .filter(|m| &m.connection_id != exclude)
            .map(|m| m.connection_id.clone())
            .collect()
    }

    /// メンバーを末尾に追加する。既にメンバーなら false
    pub fn add_member(&mut self, member: Member) -> bool {
        if self.is_member(&member.connection_id) {
            return false;
        }
        self.members.push(member);
        true
    }

    /// メンバーを削除する。タイピング中ならその状態も消す
    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> Option<Member> {
        let index = self
            .members
            .iter()
            .position(|m| &m.connection_id == connection_id)?;
        let member = self.members.remove(index);

        self.stop_typing(connection_id);
        if let Some(playback) = self.playback.as_mut()
            && playback.owner.as_ref() == Some(connection_id)
        {
            playback.owner = None;
        }
        Some(member)
    }

    pub fn has_message(&self, id: &MessageId) -> bool {
        self.history.iter().any(|m| &m.id == id)
    }

    /// 履歴に追加する。同じ ID が既にあれば追加せず false
    pub fn append_message(&mut self, message: ChatMessage) -> bool {
        if self.has_message(&message.id) {
            return false;
        }
        self.history.push_back(message);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
        true
    }

    /// 同じ ID があればその位置で本文を置き換え、なければ追加する
    ///
    /// 送信者の情報とタイムスタンプは指定された場合だけ上書きする。
    /// 保存された内容を返す。
    pub fn upsert_message(&mut self, message: ChatMessage) -> ChatMessage {
        if let Some(existing) = self.history.iter_mut().find(|m| m.id == message.id) {
            existing.text = message.text;
            if !message.sender.is_empty() {
                existing.sender = message.sender;
            }
            if message.sender_color.is_some() {
                existing.sender_color = message.sender_color;
            }
            if message.sender_avatar.is_some() {
                existing.sender_avatar = message.sender_avatar;
            }
            if message.timestamp.value() != 0 {
                existing.timestamp = message.timestamp;
            }
            return existing.clone();
        }
        self.append_message(message.clone());
        message
    }

    /// 履歴を古い順に返す。ID が重複していれば最初のものだけを残す
    pub fn history_batch(&self) -> Vec<ChatMessage> {
        let mut seen = HashSet::new();
        self.history
            .iter()
            .filter(|m| seen.insert(m.id.clone()))
            .cloned()
            .collect()
    }

    /// 接続がタイピングを開始した名前を記録する
    ///
    /// 同じ接続が別の名前で開始し直した場合、前の名前は取り除かれる。
    pub fn start_typing(&mut self, connection_id: &ConnectionId, name: &str) {
        if let Some(previous) = self
            .typing_names
            .insert(connection_id.clone(), name.to_string())
            && previous != name
        {
            self.release_typing_name(&previous);
        }
        self.typing.insert(name.to_string());
    }

    /// 接続のタイピングを終了し、開始時に記録した名前を返す
    pub fn stop_typing(&mut self, connection_id: &ConnectionId) -> Option<String> {
        let name = self.typing_names.remove(connection_id)?;
        self.release_typing_name(&name);
        Some(name)
    }

    // 同名でタイピング中の別接続が残っていれば、その表示は消さない
    fn release_typing_name(&mut self, name: &str) {
        if !self.typing_names.values().any(|n| n == name) {
            self.typing.remove(name);
        }
    }

    /// 再生状態の部分更新を適用する
    ///
    /// 直前に受け付けた更新と同じ動画 ID が `dedup_window_millis` 以内に
    /// 再度指定された場合は何も変更せず None を返す。
    pub fn apply_playback_update(
        &mut self,
        owner: &ConnectionId,
        patch: PlaybackPatch,
        now: Timestamp,
        dedup_window_millis: i64,
    ) -> Option<PlaybackState> {
        if let (Some(video_id), Some(last)) = (&patch.video_id, &self.last_playback_update)
            && last.video_id.as_ref() == Some(video_id)
            && now.millis_since(last.accepted_at) < dedup_window_millis
        {
            return None;
        }

        let mut state = self.playback.take().unwrap_or_default();
        if let Some(video_id) = patch.video_id.clone() {
            if state.video_id.as_ref() != Some(&video_id) && patch.current_position.is_none() {
                state.current_position = 0.0;
            }
            state.video_id = Some(video_id);
        }
        if let Some(is_playing) = patch.is_playing {
            state.is_playing = is_playing;
        }
        if let Some(position) = patch.current_position {
            state.current_position = position;
        }
        state.timestamp = patch.timestamp;
        state.updated_at = now;
        state.owner = Some(owner.clone());

        self.last_playback_update = Some(AcceptedPlaybackUpdate {
            video_id: patch.video_id,
            accepted_at: now,
        });
        self.playback = Some(state.clone());
        Some(state)
    }

    /// 再生位置と再生中フラグだけを補正する。再生状態がなければ None
    pub fn apply_playback_sync(
        &mut self,
        sync: PlaybackSync,
        now: Timestamp,
    ) -> Option<PlaybackState> {
        let state = self.playback.as_mut()?;
        state.current_position = sync.current_position;
        state.is_playing = sync.is_playing;
        state.updated_at = now;
        Some(state.clone())
    }

    /// 保持する価値のある状態が何もないか
    pub fn is_idle(&self) -> bool {
        self.members.is_empty() && self.history.is_empty() && self.playback.is_none()
    }
}
