//! End-to-end tests of the WebSocket relay against a stub message store.

mod common;

use std::time::Duration;

use common::{CREATED_AT, FIRST_MESSAGE_ID, StoreMode, StubStore, TestRelay};
use serde_json::json;

const QUIET: Duration = Duration::from_millis(300);

async fn setup(store_timeout: Duration) -> (StubStore, TestRelay) {
    let store = StubStore::new();
    let store_url = store.spawn().await;
    let relay = TestRelay::start(&store_url, store_timeout).await;
    (store, relay)
}

#[tokio::test]
async fn test_join_disconnect_leave_scenario() {
    // テスト項目: A 参加 → B 参加 → A 切断 → B 退出 の一連の流れ
    // given (前提条件):
    let (_store, relay) = setup(Duration::from_secs(5)).await;
    let mut alice = relay.connect().await;
    let mut bob = relay.connect().await;

    // when (操作) / then (期待する結果): A joins room 7
    alice.join("7", "1", "alice").await;
    let update = alice.expect("membership_update").await;
    assert_eq!(update["count"], 1);
    assert_eq!(update["room"], "project_7");
    assert_eq!(update["project_id"], "7");
    let history = alice.expect("history_snapshot").await;
    assert_eq!(history["messages"], json!([]));

    // B joins: both see two members
    bob.join("7", "2", "bob").await;
    let update = alice.expect("membership_update").await;
    assert_eq!(update["count"], 2);
    let update = bob.expect("membership_update").await;
    assert_eq!(update["count"], 2);
    assert_eq!(update["members"][0]["user_id"], "1");
    assert_eq!(update["members"][1]["user_id"], "2");
    assert_eq!(update["members"][1]["display_name"], "bob");

    // A disconnects: B sees one member
    alice.close().await;
    let update = bob.expect("membership_update").await;
    assert_eq!(update["count"], 1);
    assert_eq!(update["members"][0]["user_id"], "2");

    // B leaves: B receives the final update with count 0
    bob.send("leave_room", json!({"project_id": "7", "user_id": "2"}))
        .await;
    let update = bob.expect("membership_update").await;
    assert_eq!(update["count"], 0);

    let rooms: serde_json::Value = reqwest::get(relay.http_url("/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rooms, json!([]));
}

#[tokio::test]
async fn test_message_is_persisted_then_broadcast() {
    // テスト項目: ストアが確定したメッセージが全メンバーに届き、履歴にも残る
    // given (前提条件):
    let (store, relay) = setup(Duration::from_secs(5)).await;
    let mut alice = relay.connect().await;
    let mut bob = relay.connect().await;
    alice.join("7", "1", "alice").await;
    alice.expect("history_snapshot").await;
    bob.join("7", "2", "bob").await;
    bob.expect("history_snapshot").await;

    // when (操作):
    alice
        .send(
            "send_message",
            json!({
                "project_id": "7",
                "body": "hello",
                "user_id": "1",
                "username": "alice",
                "display_name": "Alice A."
            }),
        )
        .await;

    // then (期待する結果):
    for client in [&mut alice, &mut bob] {
        let message = client.expect("message_delivered").await;
        assert_eq!(message["id"], FIRST_MESSAGE_ID);
        assert_eq!(message["body"], "hello");
        assert_eq!(message["author_id"], "1");
        assert_eq!(message["author_name"], "Alice A.");
        assert_eq!(message["author_handle"], "alice");
        assert_eq!(message["created_at"], CREATED_AT);
        assert_eq!(message["project_id"], "7");
    }
    assert_eq!(store.saved().len(), 1);

    // history of a later joiner contains the message
    let mut carol = relay.connect().await;
    carol.join("7", "3", "carol").await;
    let history = carol.expect("history_snapshot").await;
    assert_eq!(history["messages"][0]["body"], "hello");
}

#[tokio::test]
async fn test_store_timeout_reaches_sender_only() {
    // テスト項目: ストアがタイムアウトすると送信者にだけ relay_failed が届き、メンバーは変わらない
    // given (前提条件):
    let (store, relay) = setup(Duration::from_millis(200)).await;
    let mut alice = relay.connect().await;
    let mut bob = relay.connect().await;
    alice.join("7", "1", "alice").await;
    alice.expect("history_snapshot").await;
    bob.join("7", "2", "bob").await;
    bob.expect("history_snapshot").await;
    alice.expect("membership_update").await;
    store.set_mode(StoreMode::Slow(Duration::from_secs(2)));

    // when (操作):
    alice
        .send(
            "send_message",
            json!({"project_id": "7", "body": "hello", "user_id": "1", "username": "alice"}),
        )
        .await;

    // then (期待する結果):
    let failure = alice.expect("relay_failed").await;
    assert_eq!(failure["message"], "Failed to send message");
    bob.expect_none("message_delivered", QUIET).await;
    bob.expect_none("relay_failed", QUIET).await;

    alice
        .send("request_room_snapshot", json!({"project_id": "7"}))
        .await;
    let snapshot = alice.expect("room_snapshot_response").await;
    assert_eq!(snapshot["count"], 2);
}

#[tokio::test]
async fn test_store_rejection_is_reported_with_details() {
    // テスト項目: ストアが拒否した場合、理由が relay_failed の details に含まれる
    // given (前提条件):
    let (store, relay) = setup(Duration::from_secs(5)).await;
    let mut alice = relay.connect().await;
    alice.join("7", "1", "alice").await;
    alice.expect("history_snapshot").await;
    store.set_mode(StoreMode::Reject);

    // when (操作):
    alice
        .send(
            "send_message",
            json!({"project_id": 7, "body": "hello", "user_id": 1, "username": "alice"}),
        )
        .await;

    // then (期待する結果):
    let failure = alice.expect("relay_failed").await;
    assert_eq!(failure["details"]["message"], "project not found");
    assert!(store.saved().is_empty());
}

#[tokio::test]
async fn test_rejoin_from_new_connection_keeps_one_member() {
    // テスト項目: 再接続後の rejoin でメンバーは1件のまま、古い接続の切断で消えない
    // given (前提条件):
    let (_store, relay) = setup(Duration::from_secs(5)).await;
    let mut old_tab = relay.connect().await;
    old_tab.join("7", "1", "alice").await;
    old_tab.expect("history_snapshot").await;

    // when (操作):
    let mut new_tab = relay.connect().await;
    new_tab
        .send(
            "rejoin_room",
            json!({"project_id": "7", "user_id": "1", "username": "alice"}),
        )
        .await;
    let update = new_tab.expect("membership_update").await;
    old_tab.close().await;

    // then (期待する結果):
    assert_eq!(update["count"], 1);
    new_tab.expect_none("membership_update", QUIET).await;
    new_tab
        .send("request_room_snapshot", json!({"project_id": "7"}))
        .await;
    let snapshot = new_tab.expect("room_snapshot_response").await;
    assert_eq!(snapshot["count"], 1);
}

#[tokio::test]
async fn test_invalid_payload_and_keepalive() {
    // テスト項目: 不正なフレームには invalid_payload、keepalive には keepalive_ack が返る
    // given (前提条件):
    let (_store, relay) = setup(Duration::from_secs(5)).await;
    let mut client = relay.connect().await;

    // when (操作):
    client
        .send("join_room", json!({"project_id": "7", "user_id": "1"}))
        .await;
    let missing_field = client.expect("invalid_payload").await;
    client.send_raw("not json").await;
    let garbage = client.expect("invalid_payload").await;
    client.send("keepalive", json!({})).await;
    let ack = client.next_within(Duration::from_secs(3)).await.unwrap();

    // then (期待する結果):
    assert_eq!(missing_field["event"], "join_room");
    assert_eq!(garbage["event"], "unknown");
    assert_eq!(ack, json!({"event": "keepalive_ack"}));

    let rooms: serde_json::Value = reqwest::get(relay.http_url("/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rooms, json!([]));
}

#[tokio::test]
async fn test_snapshot_of_unknown_room_is_empty() {
    // テスト項目: 存在しないルームのスナップショットは 0 人
    // given (前提条件):
    let (_store, relay) = setup(Duration::from_secs(5)).await;
    let mut client = relay.connect().await;

    // when (操作):
    client
        .send("request_room_snapshot", json!({"project_id": "404"}))
        .await;

    // then (期待する結果):
    let snapshot = client.expect("room_snapshot_response").await;
    assert_eq!(snapshot["count"], 0);
    assert_eq!(snapshot["members"], json!([]));
}

#[tokio::test]
async fn test_admin_clear_notifies_members() {
    // テスト項目: 管理 API でルームをクリアするとメンバーに room_reset が届く
    // given (前提条件):
    let (_store, relay) = setup(Duration::from_secs(5)).await;
    let mut client = relay.connect().await;
    client.join("7", "1", "alice").await;
    client.expect("history_snapshot").await;

    // when (操作):
    let response = reqwest::Client::new()
        .delete(relay.http_url("/admin/rooms/7"))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["cleared"], json!(["project_7"]));
    assert_eq!(body["notified_connections"], 1);
    let reset = client.expect("room_reset").await;
    assert_eq!(reset["project_id"], "7");
}
