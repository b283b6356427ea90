//! Room presence, chat and signaling relay server.
//!
//! This library provides the WebSocket server that lets browser clients meet in
//! a room, exchange peer-to-peer negotiation payloads, chat, and share a
//! synchronized playback state.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
