//! プロセス全体の接続・ルーム状態
//!
//! `HubState` は接続レジストリとルーム集合をまとめて保持します。
//! サーバー起動時に 1 つだけ生成され、`SharedHub` として各 UseCase に渡されます。
//! すべての状態変更はこのロックの中で行われるため、同じルームへの変更が
//! 部分的に交錯することはありません。

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
};

use tokio::sync::Mutex;

use super::{
    entity::{Connection, Member, Room, UserDescriptor},
    error::HubError,
    value_object::{ConnectionId, RoomId, Timestamp},
};

/// 共有される Hub 状態
pub type SharedHub = Arc<Mutex<HubState>>;

/// Hub の設定値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    /// ルームごとに保持するチャット履歴の件数
    pub history_limit: usize,
    /// 同じ動画 ID の再生更新を重複とみなす時間（ミリ秒）
    pub playback_dedup_window_millis: i64,
    /// メンバーがいなくなった後も履歴や再生状態のために残すルームの最大数
    pub max_retained_rooms: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            playback_dedup_window_millis: 5_000,
            max_retained_rooms: 1_000,
        }
    }
}

/// ルーム参加の結果
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    /// 別のルームから暗黙的に退出した場合、その結果
    pub left: Option<LeaveOutcome>,
    /// 参加者自身を除いた、参加時点のメンバー（参加順）
    pub existing: Vec<Member>,
    /// 既に同じルームのメンバーだった
    pub already_member: bool,
}

/// ルーム退出の結果
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveOutcome {
    pub room_id: RoomId,
    pub member: Member,
    /// 退出後に残っているメンバー
    pub remaining: Vec<ConnectionId>,
}

/// 接続レジストリとルーム集合
#[derive(Debug, Default)]
pub struct HubState {
    config: HubConfig,
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<RoomId, Room>,
    /// メンバーがいないまま残っているルーム（空になった順）
    retained: VecDeque<RoomId>,
    /// ルームごとの ban 済みユーザー ID
    bans: HashMap<RoomId, HashSet<String>>,
}

impl HubState {
    pub fn new(config: HubConfig) -> Self {
        Self {
            config,
            connections: HashMap::new(),
            rooms: HashMap::new(),
            retained: VecDeque::new(),
            bans: HashMap::new(),
        }
    }

    /// `SharedHub` に包む
    pub fn into_shared(self) -> SharedHub {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    // ========================================
    // Connection Registry
    // ========================================

    /// 新しい接続を登録し、生存中の接続と重複しない ID を返す
    pub fn register_connection(&mut self, connected_at: Timestamp) -> ConnectionId {
        let mut id = ConnectionId::generate();
        while self.connections.contains_key(&id) {
            id = ConnectionId::generate();
        }
        self.connections
            .insert(id.clone(), Connection::new(id.clone(), connected_at));
        id
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn is_connected(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// 接続を削除し、相手側に残っているシグナリングの関係も取り除く
    ///
    /// ルームからの退出は呼び出し側が先に `leave_current_room` で行うこと。
    pub fn remove_connection(&mut self, id: &ConnectionId) -> Option<Connection> {
        let connection = self.connections.remove(id)?;
        for peer in &connection.peers {
            if let Some(peer_connection) = self.connections.get_mut(peer) {
                peer_connection.peers.remove(id);
            }
        }
        Some(connection)
    }

    /// 指定したユーザー ID を持つ接続
    pub fn connections_of_user(&self, user_id: &str) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.belongs_to_user(user_id))
            .map(|c| c.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// シグナリングの関係を記録する。どちらかが未登録なら false
    pub fn record_relay(&mut self, from: &ConnectionId, to: &ConnectionId) -> bool {
        if !self.connections.contains_key(from) || !self.connections.contains_key(to) {
            return false;
        }
        if let Some(sender) = self.connections.get_mut(from) {
            sender.peers.insert(to.clone());
        }
        if let Some(target) = self.connections.get_mut(to) {
            target.peers.insert(from.clone());
        }
        true
    }

    // ========================================
    // Room Presence
    // ========================================

    /// ルームに参加する
    ///
    /// 別のルームに参加中なら先に退出する。参加者はスナップショットを
    /// 計算する前にメンバー集合へ追加される。
    pub fn join_room(
        &mut self,
        id: &ConnectionId,
        room_id: &RoomId,
        user: UserDescriptor,
        now: Timestamp,
    ) -> Result<JoinOutcome, HubError> {
        let current_room = self
            .connections
            .get(id)
            .ok_or_else(|| HubError::ConnectionNotFound(id.as_str().to_string()))?
            .room
            .clone();

        if current_room.as_ref() == Some(room_id) {
            let existing = self
                .rooms
                .get(room_id)
                .map(|room| {
                    room.members
                        .iter()
                        .filter(|m| &m.connection_id != id)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            return Ok(JoinOutcome {
                left: None,
                existing,
                already_member: true,
            });
        }

        let left = self.leave_current_room(id);

        self.retained.retain(|id| id != room_id);
        let history_limit = self.config.history_limit;
        let room = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone(), now, history_limit));
        room.add_member(Member {
            connection_id: id.clone(),
            user: user.clone(),
            joined_at: now,
        });
        let existing = room
            .members
            .iter()
            .filter(|m| &m.connection_id != id)
            .cloned()
            .collect();

        if let Some(connection) = self.connections.get_mut(id) {
            connection.room = Some(room_id.clone());
            connection.user = Some(user);
        }

        Ok(JoinOutcome {
            left,
            existing,
            already_member: false,
        })
    }

    /// ルームから退出する。メンバーでなければ None
    pub fn leave_room(&mut self, id: &ConnectionId, room_id: &RoomId) -> Option<LeaveOutcome> {
        let room = self.rooms.get_mut(room_id)?;
        let member = room.remove_member(id)?;
        let remaining = room.member_ids();

        if let Some(connection) = self.connections.get_mut(id)
            && connection.room.as_ref() == Some(room_id)
        {
            connection.room = None;
            connection.user = None;
        }
        self.discard_if_idle(room_id);

        Some(LeaveOutcome {
            room_id: room_id.clone(),
            member,
            remaining,
        })
    }

    /// 参加中のルームから退出する
    pub fn leave_current_room(&mut self, id: &ConnectionId) -> Option<LeaveOutcome> {
        let room_id = self.connections.get(id)?.room.clone()?;
        self.leave_room(id, &room_id)
    }

    /// メンバーがいなくなったルームを片付ける
    ///
    /// 何も残っていなければすぐに捨てる。履歴や再生状態が残っていれば保持し、
    /// 保持数が上限を超えたら最も早く空になったルームから捨てる。
    fn discard_if_idle(&mut self, room_id: &RoomId) {
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };
        if room.is_idle() {
            self.rooms.remove(room_id);
            tracing::debug!("Room '{}' discarded", room_id);
            return;
        }
        if !room.members.is_empty() {
            return;
        }

        self.retained.push_back(room_id.clone());
        while self.retained.len() > self.config.max_retained_rooms {
            let Some(evicted) = self.retained.pop_front() else {
                break;
            };
            self.rooms.remove(&evicted);
            tracing::debug!("Room '{}' evicted from retained rooms", evicted);
        }
    }

    // ========================================
    // Bans
    // ========================================

    /// ban を記録する。以後の参加はこのロックの中で拒否される
    pub fn record_ban(&mut self, room_id: &RoomId, user_id: &str) {
        self.bans
            .entry(room_id.clone())
            .or_default()
            .insert(user_id.to_string());
    }

    pub fn is_banned(&self, room_id: &RoomId, user_id: &str) -> bool {
        self.bans
            .get(room_id)
            .is_some_and(|users| users.contains(user_id))
    }

    // ========================================
    // Rooms
    // ========================================

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn room_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    /// `id` がメンバーであるルームを可変参照で返す
    pub fn joined_room_mut(&mut self, id: &ConnectionId, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id).filter(|room| room.is_member(id))
    }

    /// ルーム ID 順に並べたルーム一覧
    pub fn rooms(&self) -> Vec<&Room> {
        let mut rooms: Vec<&Room> = self.rooms.values().collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }
}
