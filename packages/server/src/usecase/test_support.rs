//! UseCase テスト用のヘルパー

use std::sync::Arc;

use hiroba_shared::time::ManualClock;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, HubConfig, HubState, RoomId, SharedHub, UserDescriptor},
    infrastructure::{
        dto::websocket::ServerEvent, message_pusher::WebSocketMessagePusher,
        repository::InMemoryChatArchive,
    },
};

use super::{ConnectClientUseCase, JoinRoomUseCase};

/// テスト開始時刻
pub const START_MILLIS: i64 = 1_700_000_000_000;

/// UseCase が共有する依存関係一式
pub struct TestHub {
    pub hub: SharedHub,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub archive: Arc<InMemoryChatArchive>,
    pub clock: Arc<ManualClock>,
}

/// 1 接続分の受信キュー
pub struct Inbox(mpsc::UnboundedReceiver<String>);

impl Inbox {
    /// これまでに届いたイベントをすべて取り出す
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(text) = self.0.try_recv() {
            events.push(serde_json::from_str(&text).expect("server event should decode"));
        }
        events
    }

    /// キューが閉じられたか（未読イベントは読み捨てる）
    pub fn is_closed(&mut self) -> bool {
        loop {
            match self.0.try_recv() {
                Ok(_) => continue,
                Err(mpsc::error::TryRecvError::Empty) => return false,
                Err(mpsc::error::TryRecvError::Disconnected) => return true,
            }
        }
    }
}

impl TestHub {
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    pub fn with_config(config: HubConfig) -> Self {
        Self {
            hub: HubState::new(config).into_shared(),
            pusher: Arc::new(WebSocketMessagePusher::default()),
            archive: Arc::new(InMemoryChatArchive::new()),
            clock: Arc::new(ManualClock::new(START_MILLIS)),
        }
    }

    /// 接続を確立し、`connected` イベントを読み捨てた受信キューを返す
    pub async fn connect(&self) -> (ConnectionId, Inbox) {
        let usecase =
            ConnectClientUseCase::new(self.hub.clone(), self.pusher.clone(), self.clock.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        let id = usecase.execute(tx).await;
        let mut inbox = Inbox(rx);
        inbox.drain();
        (id, inbox)
    }

    /// 接続してルームに参加し、参加時のイベントを読み捨てる
    pub async fn join(&self, room: &str, name: &str) -> (ConnectionId, Inbox) {
        let (id, mut inbox) = self.connect().await;
        self.join_usecase()
            .execute(&id, room_id(room), UserDescriptor::named(name))
            .await
            .expect("join should succeed");
        inbox.drain();
        (id, inbox)
    }

    pub fn join_usecase(&self) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            self.hub.clone(),
            self.pusher.clone(),
            self.archive.clone(),
            self.clock.clone(),
        )
    }
}

pub fn room_id(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}
