//! Infrastructure layer
//!
//! - `dto`: WebSocket / HTTP のワイヤーフォーマット
//! - `message_pusher`: MessagePusher の実装
//! - `repository`: ChatArchive の実装

pub mod dto;
pub mod message_pusher;
pub mod repository;
