//! UseCase: メッセージストアの疎通確認

use std::sync::Arc;

use crate::domain::{MessageStore, StoreError};

pub struct CheckMessageStoreUseCase {
    store: Arc<dyn MessageStore>,
}

impl CheckMessageStoreUseCase {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Probe the store and return its answer
    pub async fn execute(&self) -> Result<serde_json::Value, StoreError> {
        match self.store.health_check().await {
            Ok(response) => {
                tracing::info!("Message store is reachable");
                Ok(response)
            }
            Err(e) => {
                tracing::warn!("Message store check failed: {}", e);
                Err(e)
            }
        }
    }
}
