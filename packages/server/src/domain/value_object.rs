//! 値オブジェクト
//!
//! 文字列ベースの識別子は生成時に検証され、以降は不変です。
//! クライアントが生成したメッセージ ID は、そのまま送り返すため空白を取り除きません。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// シグナリングのペイロード（中身は解釈しない）
pub type SignalPayload = serde_json::Value;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal, $max:expr, trim = $trim:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// 最大文字数
            pub const MAX_LEN: usize = $max;

            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                if value.trim().is_empty() {
                    return Err(ValueObjectError::Empty($label));
                }
                let value = if $trim {
                    value.trim().to_string()
                } else {
                    value
                };
                let len = value.chars().count();
                if len > Self::MAX_LEN {
                    return Err(ValueObjectError::TooLong {
                        field: $label,
                        len,
                        max: Self::MAX_LEN,
                    });
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// 接続 ID（サーバーが接続ごとに払い出す）
    ConnectionId,
    "connection id",
    64,
    trim = true
);

string_id!(
    /// ルーム ID（クライアントが指定する slug）
    RoomId,
    "room id",
    128,
    trim = true
);

string_id!(
    /// チャットメッセージ ID（クライアントが生成する）
    MessageId,
    "message id",
    128,
    trim = false
);

string_id!(
    /// アプリケーションのユーザー ID（kick / ban の対象指定に使う）
    UserId,
    "user id",
    128,
    trim = true
);

impl ConnectionId {
    /// ランダムな接続 ID を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// `earlier` からの経過ミリ秒
    pub fn millis_since(&self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}
