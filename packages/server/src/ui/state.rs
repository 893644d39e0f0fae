//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use chatrelay_shared::time::Clock;

use crate::domain::{MessagePusher, MessageStore, RoomRepository};
use crate::usecase::{
    CheckMessageStoreUseCase, ConnectClientUseCase, DisconnectClientUseCase, FetchHistoryUseCase,
    GetRoomsUseCase, MembershipController, SendMessageUseCase,
};

/// Use cases shared by every handler
pub struct AppState {
    /// ConnectClientUseCase（接続開始のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// DisconnectClientUseCase（切断のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// MembershipController（join / leave / snapshot）
    pub membership: Arc<MembershipController>,
    /// SendMessageUseCase（メッセージ中継のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// FetchHistoryUseCase（履歴取得のユースケース）
    pub fetch_history_usecase: Arc<FetchHistoryUseCase>,
    /// GetRoomsUseCase（ルーム参照のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// CheckMessageStoreUseCase（ストア疎通確認のユースケース）
    pub check_store_usecase: Arc<CheckMessageStoreUseCase>,
    /// MessagePusher（イベント送信の抽象化）
    pub message_pusher: Arc<dyn MessagePusher>,
    /// Deployment name reported by `/health`
    pub environment: String,
}

impl AppState {
    /// Wire every use case on top of the given adapters
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        store: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
        environment: impl Into<String>,
    ) -> Self {
        let membership = Arc::new(MembershipController::new(
            repository.clone(),
            message_pusher.clone(),
            clock.clone(),
        ));
        Self {
            connect_client_usecase: Arc::new(ConnectClientUseCase::new(
                message_pusher.clone(),
                clock,
            )),
            disconnect_client_usecase: Arc::new(DisconnectClientUseCase::new(
                membership.clone(),
                message_pusher.clone(),
            )),
            membership,
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                store.clone(),
                store_timeout,
            )),
            fetch_history_usecase: Arc::new(FetchHistoryUseCase::new(
                store.clone(),
                message_pusher.clone(),
                store_timeout,
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository, message_pusher.clone())),
            message_pusher,
            check_store_usecase: Arc::new(CheckMessageStoreUseCase::new(store)),
            environment: environment.into(),
        }
    }
}
