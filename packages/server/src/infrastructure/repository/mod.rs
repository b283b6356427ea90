//! 外部永続化サービスの実装

pub mod inmemory;

pub use inmemory::{DEFAULT_ARCHIVE_LIMIT, InMemoryChatArchive};
