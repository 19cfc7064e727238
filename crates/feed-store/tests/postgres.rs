//! Postgres-backed tests.
//!
//! Run with a scratch database:
//! `DATABASE_URL=postgres://localhost/feed_test cargo test -p feed-store --features integration-tests`

#![cfg(feature = "integration-tests")]

use feed_core::{Category, Identity, MsgId};
use feed_store::{MessageService, ProfileRegistry, Store, StoreConfig, StoreError};

async fn services() -> (MessageService, ProfileRegistry) {
    let config = StoreConfig::from_env().expect("store config");
    assert!(
        config.database_url.is_some(),
        "DATABASE_URL must be set for integration tests"
    );
    let store = Store::connect(config).await.expect("connect");
    assert_eq!(store.backend_name(), "postgres");

    let profiles = ProfileRegistry::new(store.clone());
    (MessageService::new(store, profiles.clone()), profiles)
}

#[tokio::test]
async fn test_create_and_fetch() {
    let (messages, _) = services().await;
    let author = Identity::from_bytes([7; 32]);

    let msg = messages
        .create_msg(author, "from postgres", Category::Sports)
        .await
        .unwrap();
    let fetched = messages.get_msg(&msg.id).await.unwrap();

    assert_eq!(fetched, msg);
    assert_eq!(fetched.author, author);

    let sports = messages.get_msgs_by_category(Category::Sports).await.unwrap();
    assert_eq!(sports[0].id, msg.id);
    assert!(sports.iter().all(|m| m.category == Category::Sports));
}

#[tokio::test]
async fn test_missing_msg() {
    let (messages, _) = services().await;
    let missing = MsgId::from("no-such-msg");

    assert!(matches!(
        messages.like_msg(&missing).await,
        Err(StoreError::MsgNotFound(_))
    ));
    assert!(matches!(
        messages
            .reply_to_msg(Identity::anonymous(), &missing, "hi", Category::Other)
            .await,
        Err(StoreError::MsgNotFound(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_likes_are_not_lost() {
    let (messages, _) = services().await;
    let msg = messages
        .create_msg(Identity::anonymous(), "popular", Category::News)
        .await
        .unwrap();

    let likes = (0..25).map(|_| {
        let messages = messages.clone();
        let id = msg.id.clone();
        tokio::spawn(async move { messages.like_msg(&id).await })
    });
    for handle in futures::future::join_all(likes).await {
        handle.unwrap().unwrap();
    }

    assert_eq!(messages.get_msg(&msg.id).await.unwrap().likes, 25);
}

#[tokio::test]
async fn test_reply_appends_to_parent() {
    let (messages, _) = services().await;
    let parent = messages
        .create_msg(Identity::anonymous(), "parent", Category::Crypto)
        .await
        .unwrap();

    let first = messages
        .reply_to_msg(Identity::anonymous(), &parent.id, "one", Category::Other)
        .await
        .unwrap();
    let second = messages
        .reply_to_msg(Identity::anonymous(), &parent.id, "two", Category::Other)
        .await
        .unwrap();

    let reloaded = messages.get_msg(&parent.id).await.unwrap();
    assert_eq!(reloaded.replies, vec![first.id.clone(), second.id.clone()]);
    assert_eq!(reloaded.content, "parent");

    let replies = messages.get_replies(&parent.id).await.unwrap();
    let contents: Vec<&str> = replies.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two"]);
}

#[tokio::test]
async fn test_profile_upsert() {
    let (_, profiles) = services().await;
    let who = Identity::from_bytes([42; 32]);

    profiles.update_user_profile(who, "alice").await.unwrap();
    profiles.update_user_profile(who, "bob").await.unwrap();

    assert_eq!(profiles.username_of(&who).await.unwrap().as_deref(), Some("bob"));
}

#[tokio::test]
async fn test_nul_characters_round_trip() {
    let (messages, profiles) = services().await;
    let who = Identity::from_bytes([43; 32]);

    profiles.update_user_profile(who, "a\0b").await.unwrap();
    assert_eq!(profiles.username_of(&who).await.unwrap().as_deref(), Some("a\0b"));

    let msg = messages
        .create_msg(who, "before\0after", Category::Other)
        .await
        .unwrap();
    assert_eq!(messages.get_msg(&msg.id).await.unwrap().content, "before\0after");

    let missing = MsgId::from("no\0such");
    assert!(matches!(
        messages.get_msg(&missing).await,
        Err(StoreError::MsgNotFound(_))
    ));
    assert!(matches!(
        messages.like_msg(&missing).await,
        Err(StoreError::MsgNotFound(_))
    ));
}
