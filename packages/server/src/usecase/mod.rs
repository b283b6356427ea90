//! UseCase 層
//!
//! 各ユースケースは共有ハブのロックを 1 回だけ取り、状態の変更と通知のキュー投入を
//! そのロックの中で済ませます。外部サービスの呼び出しはロックの外で行います。

mod chat_history;
mod connect_client;
mod disconnect_client;
mod error;
mod get_rooms;
mod join_room;
mod kick_user;
mod leave_room;
mod notify;
mod playback;
mod relay_signal;
mod send_message;
mod typing;
mod update_message;

#[cfg(test)]
mod test_support;

pub use chat_history::GetChatHistoryUseCase;
pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{GetRoomDetailError, JoinRoomError, KickError, PlaybackError, SendMessageError};
pub use get_rooms::{GetRoomDetailUseCase, GetRoomsUseCase};
pub use join_room::JoinRoomUseCase;
pub use kick_user::KickUserUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use playback::PlaybackUseCase;
pub use relay_signal::RelaySignalUseCase;
pub use send_message::SendMessageUseCase;
pub use typing::TypingUseCase;
pub use update_message::UpdateMessageUseCase;
