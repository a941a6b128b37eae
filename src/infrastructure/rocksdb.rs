use crate::domain::event::LedgerEvent;
use crate::domain::ledger::Ledger;
use crate::domain::ports::{EventSink, LedgerStore};
use crate::error::{Result, SplitterError};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Column Family holding the serialized ledger.
pub const CF_LEDGER: &str = "ledger";
/// Column Family holding the event log, keyed by sequence number.
pub const CF_EVENTS: &str = "events";

const LEDGER_KEY: &[u8] = b"state";

/// A persistent store implementation using RocksDB.
///
/// Keeps the ledger and its event log in separate Column Families. The ledger
/// is a single JSON document; events are appended under big-endian sequence
/// numbers so iteration returns them in publication order.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    next_event: Arc<AtomicU64>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("ledger" and "events") exist
    /// and resumes event numbering after the last stored event.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_ledger = ColumnFamilyDescriptor::new(CF_LEDGER, Options::default());
        let cf_events = ColumnFamilyDescriptor::new(CF_EVENTS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_ledger, cf_events])?;

        let next_event = {
            let cf = column_family(&db, CF_EVENTS)?;
            match db.iterator_cf(cf, IteratorMode::End).next() {
                Some(item) => {
                    let (key, _) = item?;
                    sequence_of(&key)? + 1
                }
                None => 0,
            }
        };

        Ok(Self {
            db: Arc::new(db),
            next_event: Arc::new(AtomicU64::new(next_event)),
        })
    }
}

fn column_family<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(name).ok_or_else(|| {
        SplitterError::InternalError(Box::new(std::io::Error::other(format!(
            "{name} column family not found"
        ))))
    })
}

fn sequence_of(key: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = key.try_into().map_err(|_| {
        SplitterError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "malformed event key",
        )))
    })?;
    Ok(u64::from_be_bytes(bytes))
}

fn decode_error(e: serde_json::Error) -> SplitterError {
    SplitterError::InternalError(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("Deserialization error: {}", e),
    )))
}

fn encode_error(e: serde_json::Error) -> SplitterError {
    SplitterError::InternalError(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("Serialization error: {}", e),
    )))
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn load(&self) -> Result<Option<Ledger>> {
        let cf = column_family(&self.db, CF_LEDGER)?;
        let Some(bytes) = self.db.get_cf(cf, LEDGER_KEY)? else {
            return Ok(None);
        };

        let ledger: Ledger = serde_json::from_slice(&bytes).map_err(decode_error)?;
        ledger.verify()?;
        Ok(Some(ledger))
    }

    async fn save(&self, ledger: &Ledger) -> Result<()> {
        let cf = column_family(&self.db, CF_LEDGER)?;
        let value = serde_json::to_vec(ledger).map_err(encode_error)?;
        self.db.put_cf(cf, LEDGER_KEY, value)?;
        Ok(())
    }
}

#[async_trait]
impl EventSink for RocksDBStore {
    async fn publish(&self, event: LedgerEvent) -> Result<()> {
        let cf = column_family(&self.db, CF_EVENTS)?;
        let value = serde_json::to_vec(&event).map_err(encode_error)?;
        let sequence = self.next_event.fetch_add(1, Ordering::SeqCst);
        self.db.put_cf(cf, sequence.to_be_bytes(), value)?;
        Ok(())
    }

    async fn events(&self) -> Result<Vec<LedgerEvent>> {
        let cf = column_family(&self.db, CF_EVENTS)?;

        let mut events = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            events.push(serde_json::from_slice(&value).map_err(decode_error)?);
        }
        Ok(events)
    }
}
