//! UseCase: 履歴取得処理
//!
//! ストアから履歴を取得し、要求した接続にだけ届ける。
//! 失敗はその接続にだけ history_unavailable として通知し、再試行はしない。

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ConnectionId, MessagePusher, MessageStore, ProjectId, PushEvent, StoreError};

use super::error::HistoryError;

const HISTORY_UNAVAILABLE_MESSAGE: &str = "Failed to load message history";

/// 履歴取得のユースケース
pub struct FetchHistoryUseCase {
    store: Arc<dyn MessageStore>,
    message_pusher: Arc<dyn MessagePusher>,
    timeout: Duration,
}

impl FetchHistoryUseCase {
    pub fn new(
        store: Arc<dyn MessageStore>,
        message_pusher: Arc<dyn MessagePusher>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            message_pusher,
            timeout,
        }
    }

    /// 履歴を取得して `requester` に届ける
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 届けたメッセージ数
    /// * `Err(HistoryError)` - 取得失敗（要求者には通知済み）または送信失敗
    pub async fn execute(
        &self,
        requester: ConnectionId,
        project_id: ProjectId,
    ) -> Result<usize, HistoryError> {
        let fetched =
            match tokio::time::timeout(self.timeout, self.store.fetch_history(&project_id)).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout(self.timeout)),
            };

        match fetched {
            Ok(messages) => {
                let count = messages.len();
                tracing::debug!(
                    "Delivering {} messages of '{}' to '{}'",
                    count,
                    project_id.room_name(),
                    requester
                );
                self.message_pusher
                    .push_to(
                        &requester,
                        &PushEvent::HistorySnapshot {
                            project_id,
                            messages,
                        },
                    )
                    .await?;
                Ok(count)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to fetch history of '{}' for '{}': {}",
                    project_id.room_name(),
                    requester,
                    e
                );
                let event = PushEvent::HistoryUnavailable {
                    project_id,
                    message: HISTORY_UNAVAILABLE_MESSAGE.to_string(),
                    details: e.details(),
                };
                if let Err(push_error) = self.message_pusher.push_to(&requester, &event).await {
                    tracing::warn!(
                        "Failed to notify '{}' of history failure: {}",
                        requester,
                        push_error
                    );
                }
                Err(HistoryError::Store(e))
            }
        }
    }
}
