//! UseCase: シグナリング中継
//!
//! ペイロードの中身は解釈せず、宛先の接続にそのまま転送します。
//! 宛先が切断済みなら黙って破棄します（再送は上位のネゴシエーション層の責務）。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, Notification, SharedHub, SignalPayload};

use super::notify::push_or_log;

/// シグナリング中継のユースケース
pub struct RelaySignalUseCase {
    hub: SharedHub,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelaySignalUseCase {
    pub fn new(hub: SharedHub, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            hub,
            message_pusher,
        }
    }

    /// ペイロードを中継する
    ///
    /// # Returns
    ///
    /// 宛先のキューに投入できたか
    pub async fn execute(
        &self,
        from: &ConnectionId,
        to: &ConnectionId,
        payload: SignalPayload,
    ) -> bool {
        if from == to {
            tracing::debug!("Client '{}' tried to signal itself, dropping", from);
            return false;
        }

        let mut hub = self.hub.lock().await;
        if !hub.record_relay(from, to) {
            tracing::debug!("Dropped signal from '{}' to '{}': peer gone", from, to);
            return false;
        }

        push_or_log(
            self.message_pusher.as_ref(),
            to,
            &Notification::Signal {
                sender: from.clone(),
                payload,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::message_pusher::MockMessagePusher,
        infrastructure::dto::websocket::{RelayedSignalPayload, ServerEvent},
        usecase::{DisconnectClientUseCase, test_support::TestHub},
    };
    use serde_json::json;

    #[tokio::test]
    async fn test_relay_forwards_payload_verbatim() {
        // テスト項目: ペイロードは変更されずに宛先にだけ届く
        // given (前提条件):
        let t = TestHub::new();
        let (a, mut inbox_a) = t.connect().await;
        let (b, mut inbox_b) = t.connect().await;
        let usecase = RelaySignalUseCase::new(t.hub.clone(), t.pusher.clone());
        let payload = json!({"type": "offer", "sdp": "v=0\r\no=- 1 2 IN IP4 0.0.0.0", "candidates": [null, {"x": 1.5}]});

        // when (操作):
        let delivered = usecase.execute(&a, &b, payload.clone()).await;

        // then (期待する結果):
        assert!(delivered);
        assert_eq!(
            inbox_b.drain(),
            vec![ServerEvent::Signal(RelayedSignalPayload {
                sender: a.as_str().to_string(),
                payload
            })]
        );
        assert!(inbox_a.drain().is_empty());
    }

    #[tokio::test]
    async fn test_relay_to_disconnected_target_is_dropped() {
        // テスト項目: 切断済みの宛先への中継は黙って破棄される
        // given (前提条件):
        let t = TestHub::new();
        let (a, mut inbox_a) = t.connect().await;
        let (b, _inbox_b) = t.connect().await;
        DisconnectClientUseCase::new(t.hub.clone(), t.pusher.clone())
            .execute(&b)
            .await;
        let usecase = RelaySignalUseCase::new(t.hub.clone(), t.pusher.clone());

        // when (操作):
        let delivered = usecase.execute(&a, &b, json!({"type": "answer"})).await;

        // then (期待する結果): 送信者にもエラーは返らない
        assert!(!delivered);
        assert!(inbox_a.drain().is_empty());
    }

    #[tokio::test]
    async fn test_relay_from_disconnected_sender_is_dropped() {
        // テスト項目: 切断済みの接続からの中継は受け付けない
        // given (前提条件):
        let t = TestHub::new();
        let (a, _inbox_a) = t.connect().await;
        let (b, mut inbox_b) = t.connect().await;
        let usecase = RelaySignalUseCase::new(t.hub.clone(), t.pusher.clone());
        usecase.execute(&a, &b, json!({"n": 1})).await;
        inbox_b.drain();
        DisconnectClientUseCase::new(t.hub.clone(), t.pusher.clone())
            .execute(&a)
            .await;

        // when (操作):
        let delivered = usecase.execute(&a, &b, json!({"n": 2})).await;

        // then (期待する結果):
        assert!(!delivered);
        assert!(inbox_b.drain().is_empty());
        assert!(t.hub.lock().await.connection(&b).unwrap().peers.is_empty());
    }

    #[tokio::test]
    async fn test_relay_preserves_sender_order() {
        // テスト項目: 同じ送信者からのペイロードは送った順に届く
        let t = TestHub::new();
        let (a, _inbox_a) = t.connect().await;
        let (b, mut inbox_b) = t.connect().await;
        let usecase = RelaySignalUseCase::new(t.hub.clone(), t.pusher.clone());

        for n in 0..5 {
            usecase.execute(&a, &b, json!({"seq": n})).await;
        }

        let seqs: Vec<serde_json::Value> = inbox_b
            .drain()
            .into_iter()
            .map(|event| match event {
                ServerEvent::Signal(signal) => signal.payload["seq"].clone(),
                other => panic!("unexpected event: {other:?}"),
            })
            .collect();
        assert_eq!(seqs, (0..5).map(|n| json!(n)).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_relay_to_self_never_pushes() {
        // テスト項目: 自分自身宛てのシグナリングは送信されない
        let t = TestHub::new();
        let (a, _inbox_a) = t.connect().await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_push_to().never();
        let usecase = RelaySignalUseCase::new(t.hub.clone(), Arc::new(pusher));

        assert!(!usecase.execute(&a, &a, json!({})).await);
    }
}
