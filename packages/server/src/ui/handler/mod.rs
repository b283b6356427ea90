mod http;
mod websocket;

pub use http::{ban_user, disconnect_user, get_room_detail, get_rooms, health_check};
pub use websocket::websocket_handler;
