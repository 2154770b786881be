//! In-process stores.
//!
//! [`MemoryTripleStore`] backs tests and embedded use. It can simulate a slow
//! or unreachable store so deadline handling is exercisable without a network.
//!
//! ```rust
//! use openvocab_core::memory::MemoryTripleStore;
//!
//! let store = MemoryTripleStore::new().with_latency_ms(50);
//! assert_eq!(store.write_count(), 0);
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::{Error, Result};
use crate::rdf::{Triple, Uri};
use crate::traits::{TriplePattern, TripleStore, UserStore};
use crate::user::User;

// =============================================================================
// TRIPLE STORE
// =============================================================================

/// Triple store held in memory.
///
/// Clones share the same underlying graph.
#[derive(Clone, Default)]
pub struct MemoryTripleStore {
    triples: Arc<RwLock<BTreeSet<Triple>>>,
    latency_ms: u64,
    unavailable: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryTripleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every round trip by the given number of milliseconds.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Make every subsequent call fail with `StoreUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of write round trips performed so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Total number of stored triples.
    pub async fn len(&self) -> usize {
        self.triples.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.triples.read().await.is_empty()
    }

    /// Snapshot of every stored triple.
    pub async fn dump(&self) -> Vec<Triple> {
        self.triples.read().await.iter().cloned().collect()
    }

    async fn round_trip(&self) -> Result<()> {
        if self.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TripleStore for MemoryTripleStore {
    async fn find_triples(
        &self,
        pattern: &TriplePattern,
        limit: Option<usize>,
    ) -> Result<Vec<Triple>> {
        self.round_trip().await?;
        let triples = self.triples.read().await;
        let found: Vec<Triple> = triples
            .iter()
            .filter(|t| pattern.matches(t))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        trace!(count = found.len(), "memory find_triples");
        Ok(found)
    }

    async fn ask(&self, pattern: &TriplePattern) -> Result<bool> {
        self.round_trip().await?;
        Ok(self.triples.read().await.iter().any(|t| pattern.matches(t)))
    }

    async fn insert_triples(&self, triples: &[Triple]) -> Result<()> {
        self.round_trip().await?;
        self.record_write();
        self.triples.write().await.extend(triples.iter().cloned());
        Ok(())
    }

    async fn delete_triples(&self, triples: &[Triple]) -> Result<()> {
        self.round_trip().await?;
        self.record_write();
        let mut stored = self.triples.write().await;
        for triple in triples {
            stored.remove(triple);
        }
        Ok(())
    }

    async fn delete_subject(&self, subject: &Uri) -> Result<()> {
        self.round_trip().await?;
        self.record_write();
        self.triples
            .write()
            .await
            .retain(|t| &t.subject != subject);
        Ok(())
    }

    async fn replace_subject(&self, subject: &Uri, triples: &[Triple]) -> Result<()> {
        self.round_trip().await?;
        self.record_write();
        let mut stored = self.triples.write().await;
        stored.retain(|t| &t.subject != subject);
        stored.extend(triples.iter().cloned());
        Ok(())
    }
}

// =============================================================================
// USER STORE
// =============================================================================

/// User store keyed by API key.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.api_key.clone(), user);
    }

    /// Build a store from a list of users.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let map = users
            .into_iter()
            .map(|u| (u.api_key.clone(), u))
            .collect();
        Self {
            users: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn by_api_key(&self, api_key: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(api_key).cloned())
    }
}
