//! UseCase: 接続開始処理
//!
//! 新しい接続にセッションを割り当て、送信チャンネルを登録する。
//! この時点ではどのルームにも属さない（Unbound）。

use std::sync::Arc;

use chatrelay_shared::time::Clock;

use crate::domain::{ConnectionId, ConnectionSession, MessagePusher, PusherChannel, Timestamp};

/// 接続開始のユースケース
pub struct ConnectClientUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectClientUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            message_pusher,
            clock,
        }
    }

    /// 接続を登録し、Unbound のセッションを返す
    pub async fn execute(&self, sender: PusherChannel) -> ConnectionSession {
        let connection_id = ConnectionId::generate();
        let connected_at = Timestamp::new(self.clock.now_millis());
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
        tracing::info!("Connection '{}' opened", connection_id);
        ConnectionSession::new(connection_id, connected_at)
    }
}
