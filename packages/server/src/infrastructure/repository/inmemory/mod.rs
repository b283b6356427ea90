//! インメモリ実装

mod archive;

pub use archive::{DEFAULT_ARCHIVE_LIMIT, InMemoryChatArchive};
