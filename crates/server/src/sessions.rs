//! Session tokens backed by the kv store.
//!
//! A session is a random UUID token mapped to a sentinel value under a
//! `session:` key with a TTL. Validation is a presence check: once the kv
//! entry expires the token is dead, so sessions need no revocation list and
//! no server-side bookkeeping beyond the store itself.

use locker_kv::{KvResult, KvStore};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const SESSION_KEY_PREFIX: &str = "session:";

/// Value stored for a live session. Only presence matters.
const SESSION_SENTINEL: &str = "valid";

/// Issues and validates session tokens.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { kv, ttl }
    }

    fn key(token: &str) -> String {
        format!("{SESSION_KEY_PREFIX}{token}")
    }

    /// Issue a fresh session token.
    pub async fn create(&self) -> KvResult<String> {
        let token = Uuid::new_v4().to_string();
        self.kv
            .put(&Self::key(&token), SESSION_SENTINEL, Some(self.ttl))
            .await?;
        Ok(token)
    }

    /// Whether a token belongs to a live session.
    pub async fn validate(&self, token: &str) -> KvResult<bool> {
        Ok(self.kv.get(&Self::key(token)).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locker_kv::MemoryKvStore;

    fn store(ttl: Duration) -> SessionStore {
        SessionStore::new(Arc::new(MemoryKvStore::new()), ttl)
    }

    #[tokio::test]
    async fn created_tokens_validate() {
        let sessions = store(Duration::from_secs(60));
        let token = sessions.create().await.unwrap();
        assert!(sessions.validate(&token).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_tokens_do_not_validate() {
        let sessions = store(Duration::from_secs(60));
        sessions.create().await.unwrap();
        assert!(!sessions.validate("not-a-token").await.unwrap());
    }

    #[tokio::test]
    async fn tokens_are_unique() {
        let sessions = store(Duration::from_secs(60));
        let first = sessions.create().await.unwrap();
        let second = sessions.create().await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn expired_tokens_do_not_validate() {
        let sessions = store(Duration::ZERO);
        let token = sessions.create().await.unwrap();
        assert!(!sessions.validate(&token).await.unwrap());
    }
}
