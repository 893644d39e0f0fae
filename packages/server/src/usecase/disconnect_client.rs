//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//! - メンバーシップの後始末と送信チャンネルの登録解除
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム参加中の接続の切断
//! - エッジケース：どのルームにも属さない接続の切断

use std::sync::Arc;

use crate::domain::{ConnectionSession, MessagePusher, RoomSnapshot};

use super::MembershipController;

/// 切断のユースケース
pub struct DisconnectClientUseCase {
    membership: Arc<MembershipController>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectClientUseCase {
    pub fn new(
        membership: Arc<MembershipController>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            membership,
            message_pusher,
        }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(RoomSnapshot)` - ルームから抜けた後のメンバー一覧
    /// * `None` - 何も変更されなかった
    pub async fn execute(&self, mut session: ConnectionSession) -> Option<RoomSnapshot> {
        let connection_id = session.connection_id();
        let snapshot = self.membership.disconnect(&mut session).await;
        self.message_pusher.unregister_client(&connection_id).await;
        tracing::info!("Connection '{}' closed", connection_id);
        snapshot
    }
}
