//! UseCase: メッセージ中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージストアへの保存と、確定したメッセージのルームへの配信
//!
//! ### なぜこのテストが必要か
//! - ストアが確定したメッセージだけが配信されることを保証
//! - 失敗時に送信者だけへ relay_failed が届き、他のメンバーには何も届かないことを確認
//! - タイムアウトでストアの遅延が接続を止めないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：保存成功とブロードキャスト
//! - 異常系：ストアの拒否、タイムアウト
//! - エッジケース：送信者がルームのメンバーでない場合

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{
    ChatMessage, ConnectionId, MessagePusher, MessageStore, OutgoingMessage, PushEvent,
    RoomRepository, StoreError,
};

use super::error::RelayError;

const RELAY_FAILED_MESSAGE: &str = "Failed to send message";

/// メッセージ中継のユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    store: Arc<dyn MessageStore>,
    /// ストア呼び出し全体の上限
    timeout: Duration,
}

impl SendMessageUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        store: Arc<dyn MessageStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            store,
            timeout,
        }
    }

    /// メッセージを保存し、確定したメッセージをルームに配信する
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信元の接続（失敗通知の宛先）
    /// * `message` - 検証済みのメッセージ
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - ストアが確定し、配信したメッセージ
    /// * `Err(RelayError)` - 保存または配信の失敗（送信者には通知済み）
    pub async fn execute(
        &self,
        sender: ConnectionId,
        message: OutgoingMessage,
    ) -> Result<ChatMessage, RelayError> {
        let saved = match tokio::time::timeout(self.timeout, self.store.save_message(&message))
            .await
        {
            Ok(Ok(saved)) => saved,
            Ok(Err(e)) => return Err(self.report_failure(sender, &message, e).await),
            Err(_) => {
                let e = StoreError::Timeout(self.timeout);
                return Err(self.report_failure(sender, &message, e).await);
            }
        };

        let chat_message = ChatMessage::confirmed(message, saved.message_id, saved.created_at);
        let targets = self.repository.members(&chat_message.project_id).await;
        let targets = targets.iter().map(|m| m.connection_id).collect();

        tracing::info!(
            "Message {} from '{}' relayed to '{}'",
            chat_message.id,
            chat_message.author_id,
            chat_message.project_id.room_name()
        );
        self.message_pusher
            .broadcast(targets, &PushEvent::MessageDelivered(chat_message.clone()))
            .await?;

        Ok(chat_message)
    }

    async fn report_failure(
        &self,
        sender: ConnectionId,
        message: &OutgoingMessage,
        error: StoreError,
    ) -> RelayError {
        tracing::error!(
            "Failed to save message from '{}' in '{}': {}",
            message.author_id,
            message.project_id.room_name(),
            error
        );
        let event = PushEvent::RelayFailed {
            message: RELAY_FAILED_MESSAGE.to_string(),
            details: error.details(),
        };
        if let Err(e) = self.message_pusher.push_to(&sender, &event).await {
            tracing::warn!("Failed to notify '{}' of relay failure: {}", sender, e);
        }
        RelayError::Store(error)
    }
}
