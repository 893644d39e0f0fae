//! HTTP client for the external message store.
//!
//! Endpoints (relative to the configured base URL):
//!
//! - `GET  /api/get-messages/{project_id}/` - history
//! - `POST /api/save-message/` - persist one message
//! - `GET  /api/test/` - reachability probe

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::domain::{
    MessageHistory, MessageId, MessageStore, OutgoingMessage, ProjectId, SavedMessage, StoreError,
};

/// Default bound on every store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct SaveMessageRequest<'a> {
    project_id: &'a str,
    body: &'a str,
    author_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct SaveMessageResponse {
    status: String,
    #[serde(default)]
    message_id: Option<MessageId>,
    #[serde(default, alias = "created")]
    created_at: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// reqwest based `MessageStore`
#[derive(Debug, Clone)]
pub struct HttpMessageStore {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpMessageStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(&self, error: reqwest::Error) -> StoreError {
        if error.is_timeout() {
            StoreError::Timeout(self.timeout)
        } else {
            StoreError::Unavailable(error.to_string())
        }
    }

    /// Read the body as JSON, turning non-2xx answers into `Rejected`.
    async fn read_json(&self, response: Response) -> Result<serde_json::Value, StoreError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        let body = serde_json::from_str::<serde_json::Value>(&text);

        if !status.is_success() {
            let details = body.unwrap_or(serde_json::Value::String(text));
            let message = details
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("message store answered {}", status));
            return Err(StoreError::Rejected {
                message,
                details: Some(details),
            });
        }

        body.map_err(|e| StoreError::Malformed(format!("response is not JSON: {}", e)))
    }
}

/// Accept either a bare array or `{"messages": [...]}`.
fn parse_history(body: serde_json::Value) -> Result<MessageHistory, StoreError> {
    match body {
        serde_json::Value::Array(messages) => Ok(messages),
        serde_json::Value::Object(mut object) => match object.remove("messages") {
            Some(serde_json::Value::Array(messages)) => Ok(messages),
            _ => Err(StoreError::Malformed(
                "history response has no 'messages' array".to_string(),
            )),
        },
        other => Err(StoreError::Malformed(format!(
            "unexpected history response: {}",
            other
        ))),
    }
}

fn parse_save_response(body: serde_json::Value) -> Result<SavedMessage, StoreError> {
    let response: SaveMessageResponse = serde_json::from_value(body.clone())
        .map_err(|e| StoreError::Malformed(format!("unexpected save response: {}", e)))?;

    if response.status != "success" {
        return Err(StoreError::Rejected {
            message: response
                .message
                .unwrap_or_else(|| "Unknown error from message store".to_string()),
            details: Some(body),
        });
    }

    let message_id = response
        .message_id
        .ok_or_else(|| StoreError::Malformed("save response has no message_id".to_string()))?;
    let created_at = match response.created_at {
        Some(serde_json::Value::String(created_at)) => created_at,
        Some(serde_json::Value::Null) | None => {
            return Err(StoreError::Malformed(
                "save response has no created_at".to_string(),
            ));
        }
        Some(other) => other.to_string(),
    };

    Ok(SavedMessage {
        message_id,
        created_at,
    })
}

#[async_trait]
impl MessageStore for HttpMessageStore {
    async fn fetch_history(&self, project_id: &ProjectId) -> Result<MessageHistory, StoreError> {
        let url = self.url(&format!("/api/get-messages/{}/", project_id));
        tracing::debug!("Fetching history from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        parse_history(self.read_json(response).await?)
    }

    async fn save_message(&self, message: &OutgoingMessage) -> Result<SavedMessage, StoreError> {
        let url = self.url("/api/save-message/");
        let request = SaveMessageRequest {
            project_id: message.project_id.as_str(),
            body: message.body.as_str(),
            author_id: message.author_id.as_str(),
        };
        tracing::debug!(
            "Saving message for project '{}' from '{}'",
            message.project_id,
            message.author_id
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        parse_save_response(self.read_json(response).await?)
    }

    async fn health_check(&self) -> Result<serde_json::Value, StoreError> {
        let response = self
            .client
            .get(self.url("/api/test/"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_history_accepts_array_and_wrapped_object() {
        // テスト項目: 配列と {"messages": [...]} の両方の形式を受け付ける
        // given (前提条件):
        let array = json!([{"id": 1}, {"id": 2}]);
        let wrapped = json!({"messages": [{"id": 3}]});

        // when (操作):
        let from_array = parse_history(array).unwrap();
        let from_wrapped = parse_history(wrapped).unwrap();

        // then (期待する結果):
        assert_eq!(from_array.len(), 2);
        assert_eq!(from_wrapped, vec![json!({"id": 3})]);
    }

    #[test]
    fn test_parse_history_rejects_other_shapes() {
        // テスト項目: 想定外の形式は Malformed
        // given (前提条件):
        let body = json!({"status": "ok"});

        // when (操作):
        let result = parse_history(body);

        // then (期待する結果):
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[test]
    fn test_parse_save_response_success() {
        // テスト項目: 成功レスポンスから ID と作成日時が取り出される（created エイリアス対応）
        // given (前提条件):
        let body = json!({"status": "success", "message_id": 42, "created": "2024-05-01T10:00:00Z"});

        // when (操作):
        let saved = parse_save_response(body).unwrap();

        // then (期待する結果):
        assert_eq!(saved.message_id, MessageId::Number(42));
        assert_eq!(saved.created_at, "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_parse_save_response_error_status() {
        // テスト項目: status が success でない場合は Rejected（ストアのメッセージ付き）
        // given (前提条件):
        let body = json!({"status": "error", "message": "Project not found"});

        // when (操作):
        let result = parse_save_response(body.clone());

        // then (期待する結果):
        assert_eq!(
            result,
            Err(StoreError::Rejected {
                message: "Project not found".to_string(),
                details: Some(body),
            })
        );
    }

    #[test]
    fn test_parse_save_response_missing_id_is_malformed() {
        // テスト項目: 成功でも message_id がなければ Malformed
        // given (前提条件):
        let body = json!({"status": "success", "created_at": "2024-05-01T10:00:00Z"});

        // when (操作):
        let result = parse_save_response(body);

        // then (期待する結果):
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        // テスト項目: ベース URL 末尾のスラッシュが取り除かれる
        // given (前提条件):
        let store = HttpMessageStore::new("http://localhost:8000/", DEFAULT_STORE_TIMEOUT).unwrap();

        // when (操作):
        let url = store.url("/api/test/");

        // then (期待する結果):
        assert_eq!(url, "http://localhost:8000/api/test/");
    }
}
