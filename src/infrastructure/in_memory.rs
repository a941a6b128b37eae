use crate::domain::event::LedgerEvent;
use crate::domain::ledger::Ledger;
use crate::domain::ports::{EventSink, LedgerStore};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory home for the ledger.
///
/// Uses `Arc<RwLock<Option<Ledger>>>` so clones share the same slot.
/// Ideal for testing or one-shot runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    ledger: Arc<RwLock<Option<Ledger>>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn load(&self) -> Result<Option<Ledger>> {
        let ledger = self.ledger.read().await;
        Ok(ledger.clone())
    }

    async fn save(&self, ledger: &Ledger) -> Result<()> {
        let mut slot = self.ledger.write().await;
        *slot = Some(ledger.clone());
        Ok(())
    }
}

/// An append-only in-memory event log.
#[derive(Default, Clone)]
pub struct InMemoryEventLog {
    events: Arc<RwLock<Vec<LedgerEvent>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventSink for InMemoryEventLog {
    async fn publish(&self, event: LedgerEvent) -> Result<()> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn events(&self) -> Result<Vec<LedgerEvent>> {
        Ok(self.events.read().await.clone())
    }
}
