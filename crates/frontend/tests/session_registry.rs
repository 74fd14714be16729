//! Tests for `SessionRegistry`.
//!
//! Exercise the registry directly: creation under a login key, the move to a
//! runtime key on attach, and removal.

use std::sync::Arc;

use docchat_frontend::registry::SessionRegistry;
use docchat_frontend::session::SessionState;

fn session(username: &str) -> SessionState {
    SessionState::new(username, "token", true, format!("{username}_docs"))
}

#[tokio::test]
async fn create_and_lookup() {
    let registry = SessionRegistry::new();
    registry.create("alice", session("alice")).await;

    assert_eq!(registry.len().await, 1);
    assert!(registry.lookup("alice").await.is_some());
    assert!(registry.lookup("bob").await.is_none());
}

#[tokio::test]
async fn create_replaces_previous_login() {
    let registry = SessionRegistry::new();
    let first = registry.create("alice", session("alice")).await;
    let second = registry.create("alice", session("alice")).await;

    let current = registry.lookup("alice").await.unwrap();
    assert!(Arc::ptr_eq(&current, &second));
    assert!(!Arc::ptr_eq(&current, &first));
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn attach_moves_entry() {
    let registry = SessionRegistry::new();
    let created = registry.create("alice", session("alice")).await;

    let attached = registry.attach("page-1", "alice").await.unwrap();

    assert!(Arc::ptr_eq(&created, &attached));
    assert!(registry.lookup("alice").await.is_none());
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn attach_is_idempotent() {
    let registry = SessionRegistry::new();
    registry.create("alice", session("alice")).await;

    let first = registry.attach("page-1", "alice").await.unwrap();
    let second = registry.attach("page-1", "alice").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn attach_without_session_returns_none() {
    let registry = SessionRegistry::new();
    assert!(registry.attach("page-1", "alice").await.is_none());
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn mutation_is_visible_through_every_handle() {
    let registry = SessionRegistry::new();
    let created = registry.create("alice", session("alice")).await;
    let attached = registry.attach("page-1", "alice").await.unwrap();

    attached.lock().await.session_id = "conv-7".into();

    assert_eq!(created.lock().await.session_id, "conv-7");
}

#[tokio::test]
async fn concurrent_attach_yields_one_session() {
    let registry = Arc::new(SessionRegistry::new());
    registry.create("alice", session("alice")).await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.attach("page-1", "alice").await })
        })
        .collect();

    let mut attached = Vec::new();
    for handle in handles {
        attached.push(handle.await.unwrap().expect("every attach should find the session"));
    }

    assert!(attached.iter().all(|h| Arc::ptr_eq(h, &attached[0])));
    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn destroy() {
    let registry = SessionRegistry::new();
    registry.create("alice", session("alice")).await;
    registry.attach("page-1", "alice").await;

    assert!(registry.destroy("page-1").await);
    assert!(!registry.destroy("page-1").await);
    assert!(registry.is_empty().await);
}
