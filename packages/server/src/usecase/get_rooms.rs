//! UseCase: ルーム一覧・詳細の取得（HTTP の参照 API 用）

use crate::domain::{Room, RoomId, SharedHub};

use super::error::GetRoomDetailError;

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    hub: SharedHub,
}

impl GetRoomsUseCase {
    pub fn new(hub: SharedHub) -> Self {
        Self { hub }
    }

    /// ルーム ID 順のスナップショット
    pub async fn execute(&self) -> Vec<Room> {
        let hub = self.hub.lock().await;
        hub.rooms().into_iter().cloned().collect()
    }
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    hub: SharedHub,
}

impl GetRoomDetailUseCase {
    pub fn new(hub: SharedHub) -> Self {
        Self { hub }
    }

    pub async fn execute(&self, room_id: String) -> Result<Room, GetRoomDetailError> {
        let room_id = RoomId::new(room_id).map_err(|_| GetRoomDetailError::InvalidRoomId)?;
        let hub = self.hub.lock().await;
        hub.room(&room_id)
            .cloned()
            .ok_or(GetRoomDetailError::RoomNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{TestHub, room_id};

    #[tokio::test]
    async fn test_get_rooms_sorted_by_id() {
        // テスト項目: ルーム一覧は ID 順に返る
        // given (前提条件):
        let t = TestHub::new();
        let (_a, _inbox_a) = t.join("music", "alice").await;
        let (_b, _inbox_b) = t.join("general", "bob").await;

        // when (操作):
        let rooms = GetRoomsUseCase::new(t.hub.clone()).execute().await;

        // then (期待する結果):
        let ids: Vec<&str> = rooms.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["general", "music"]);
    }

    #[tokio::test]
    async fn test_get_rooms_empty() {
        // テスト項目: ルームがなければ空
        let t = TestHub::new();

        let rooms = GetRoomsUseCase::new(t.hub.clone()).execute().await;

        assert!(rooms.is_empty());
    }

    #[tokio::test]
    async fn test_get_room_detail() {
        // テスト項目: 存在するルームの詳細が返り、存在しない・不正な ID はエラー
        let t = TestHub::new();
        let (a, _inbox_a) = t.join("general", "alice").await;
        let usecase = GetRoomDetailUseCase::new(t.hub.clone());

        let room = usecase.execute("general".to_string()).await.unwrap();
        assert_eq!(room.id, room_id("general"));
        assert_eq!(room.member_ids(), vec![a]);

        assert_eq!(
            usecase.execute("music".to_string()).await,
            Err(GetRoomDetailError::RoomNotFound)
        );
        assert_eq!(
            usecase.execute("   ".to_string()).await,
            Err(GetRoomDetailError::InvalidRoomId)
        );
    }
}
