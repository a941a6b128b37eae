use super::amount::Amount;
use super::event::LedgerEvent;
use super::identity::Identity;
use super::ledger::Ledger;
use crate::error::Result;
use async_trait::async_trait;
use thiserror::Error;

/// Durable home of the ledger between operations.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn load(&self) -> Result<Option<Ledger>>;
    async fn save(&self, ledger: &Ledger) -> Result<()>;
}

/// Destination for the records emitted by committed operations.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: LedgerEvent) -> Result<()>;
    async fn events(&self) -> Result<Vec<LedgerEvent>>;
}

/// Reason reported by a [`ValueTransfer`] that could not move funds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransferRejected(pub String);

/// Position in a [`ValueTransfer`]'s history that later transfers can be
/// rolled back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Savepoint(pub usize);

/// The native value-transfer primitive.
///
/// An implementation attempts to move `amount` to `to` and reports whether it
/// succeeded. It receives the live ledger so that a recipient may call back
/// into it before the transfer returns; such calls are strictly nested.
///
/// Transfers are provisional until the operation that made them succeeds. A
/// failing operation hands back the [`Savepoint`] it took on entry, and every
/// transfer made since, nested ones included, must be undone.
pub trait ValueTransfer {
    fn transfer(
        &mut self,
        ledger: &mut Ledger,
        to: Identity,
        amount: Amount,
    ) -> std::result::Result<(), TransferRejected>;

    fn savepoint(&mut self) -> Savepoint;

    fn rollback(&mut self, savepoint: Savepoint);
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type EventSinkBox = Box<dyn EventSink>;
pub type ValueTransferBox = Box<dyn ValueTransfer + Send>;
