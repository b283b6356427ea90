//! Server state shared by every handler.

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::{
    domain::{ChatArchive, MessagePusher, SharedHub},
    usecase::{
        ConnectClientUseCase, DisconnectClientUseCase, GetChatHistoryUseCase,
        GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase, KickUserUseCase,
        LeaveRoomUseCase, PlaybackUseCase, RelaySignalUseCase, SendMessageUseCase, TypingUseCase,
        UpdateMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectClientUseCase（接続のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// DisconnectClientUseCase（切断のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub relay_signal_usecase: Arc<RelaySignalUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub update_message_usecase: Arc<UpdateMessageUseCase>,
    pub get_chat_history_usecase: Arc<GetChatHistoryUseCase>,
    pub typing_usecase: Arc<TypingUseCase>,
    pub playback_usecase: Arc<PlaybackUseCase>,
    /// KickUserUseCase（管理 API からの強制切断）
    pub kick_user_usecase: Arc<KickUserUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
}

impl AppState {
    /// Wire every use case against the same hub and collaborators.
    pub fn new(
        hub: SharedHub,
        message_pusher: Arc<dyn MessagePusher>,
        archive: Arc<dyn ChatArchive>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            connect_client_usecase: Arc::new(ConnectClientUseCase::new(
                hub.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            disconnect_client_usecase: Arc::new(DisconnectClientUseCase::new(
                hub.clone(),
                message_pusher.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                hub.clone(),
                message_pusher.clone(),
                archive.clone(),
                clock.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                hub.clone(),
                message_pusher.clone(),
            )),
            relay_signal_usecase: Arc::new(RelaySignalUseCase::new(
                hub.clone(),
                message_pusher.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                hub.clone(),
                message_pusher.clone(),
                archive.clone(),
                clock.clone(),
            )),
            update_message_usecase: Arc::new(UpdateMessageUseCase::new(
                hub.clone(),
                message_pusher.clone(),
            )),
            get_chat_history_usecase: Arc::new(GetChatHistoryUseCase::new(
                hub.clone(),
                message_pusher.clone(),
            )),
            typing_usecase: Arc::new(TypingUseCase::new(hub.clone(), message_pusher.clone())),
            playback_usecase: Arc::new(PlaybackUseCase::new(
                hub.clone(),
                message_pusher.clone(),
                clock,
            )),
            kick_user_usecase: Arc::new(KickUserUseCase::new(
                hub.clone(),
                message_pusher,
                archive,
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(hub.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(hub)),
        }
    }
}
