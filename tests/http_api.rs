//! End-to-end HTTP scenarios against a single node.

mod common;

use common::TestNode;
use raftkv::raft::Role;
use raftkv::store::StorageEngine;
use serde_json::{json, Value};

#[tokio::test]
async fn store_then_fetch_roundtrips() {
    let node = TestNode::new();
    let (base, _shutdown) = node.serve().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/store"))
        .json(&json!({"key": "a", "value": "1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "success persisting data");
    assert_eq!(body["data"], json!({"key": "a", "value": "1"}));

    let resp = client
        .get(format!("{base}/store/a"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], json!({"key": "a", "value": "1"}));
}

#[tokio::test]
async fn delete_then_fetch_reports_missing() {
    let node = TestNode::new();
    let (base, _shutdown) = node.serve().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/store"))
        .json(&json!({"key": "a", "value": "1"}))
        .send()
        .await
        .unwrap();

    let resp = client
        .delete(format!("{base}/store/a"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "success removing data");
    assert_eq!(body["data"], json!({"key": "a", "value": null}));

    let resp = client
        .get(format!("{base}/store/a"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "key not found");

    // Internal storage confirms absence.
    assert_eq!(node.store.get("a").unwrap(), None);
}

#[tokio::test]
async fn follower_refuses_writes_without_touching_storage() {
    let node = TestNode::new();
    node.engine.set_role(Role::Follower);
    let (base, _shutdown) = node.serve().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/store"))
        .json(&json!({"key": "a", "value": "1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "not the leader");
    assert_eq!(node.store.get("a").unwrap(), None);

    // The delete endpoint keeps its historical 422 on not-leader.
    let resp = client
        .delete(format!("{base}/store/a"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "not the leader");
}

#[tokio::test]
async fn join_on_follower_answers_not_leader() {
    let node = TestNode::new();
    node.engine.set_role(Role::Follower);
    let (base, _shutdown) = node.serve().await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/raft/join"))
        .json(&json!({"node_id": "2", "raft_address": "host:2222"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "not the leader");
}

#[tokio::test]
async fn join_remove_and_stats() {
    let node = TestNode::new();
    let (base, _shutdown) = node.serve().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/raft/join"))
        .json(&json!({"node_id": "2", "raft_address": "host:2222"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "node 2 at host:2222 joined successfully");
    assert_eq!(body["data"]["num_peers"], "1");

    // Duplicate join surfaces the engine error verbatim.
    let resp = client
        .post(format!("{base}/raft/join"))
        .json(&json!({"node_id": "2", "raft_address": "host:2222"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 503);

    let resp = client
        .post(format!("{base}/raft/remove"))
        .json(&json!({"node_id": "2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "node 2 removed successfully");

    let resp = client
        .get(format!("{base}/raft/stats"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Here is the raft status");
    assert_eq!(body["data"]["state"], "leader");
}

#[tokio::test]
async fn validation_failures_answer_422() {
    let node = TestNode::new();
    let (base, _shutdown) = node.serve().await;
    let client = reqwest::Client::new();

    // Whitespace-only key.
    let resp = client
        .post(format!("{base}/store"))
        .json(&json!({"key": "   ", "value": "1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "key is required");

    // Body that does not bind.
    let resp = client
        .post(format!("{base}/store"))
        .json(&json!({"value": "1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    // Empty key on the read path.
    let resp = client
        .get(format!("{base}/store/"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
}

#[tokio::test]
async fn absent_value_is_a_noop_write() {
    let node = TestNode::new();
    let (base, _shutdown) = node.serve().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/store"))
        .json(&json!({"key": "a", "value": "before"}))
        .send()
        .await
        .unwrap();

    let resp = client
        .post(format!("{base}/store"))
        .json(&json!({"key": "a"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(format!("{base}/store/a"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["value"], "before");
}

#[tokio::test]
async fn status_reports_identity_and_role() {
    let node = TestNode::new();
    let (base, _shutdown) = node.serve().await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/status"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["service"], "raftkv");
    assert_eq!(body["node_id"], "1");
    assert_eq!(body["role"], "leader");
}
