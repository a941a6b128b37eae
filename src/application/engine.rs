use crate::domain::amount::Amount;
use crate::domain::identity::Identity;
use crate::domain::ledger::Ledger;
use crate::domain::operation::{Operation, OperationKind};
use crate::domain::ports::{EventSinkBox, LedgerStoreBox, ValueTransferBox};
use crate::error::Result;
use tokio::sync::Mutex;

/// The entry point for driving a ledger.
///
/// `LedgerService` owns the storage, event sink and transfer backends. Each
/// operation takes the service lock, loads the ledger, applies the operation,
/// commits the resulting state and forwards the emitted events, so operations
/// never interleave. Recipient callbacks made through the transfer port run
/// nested inside the operation that triggered them.
pub struct LedgerService {
    store: LedgerStoreBox,
    sink: EventSinkBox,
    /// Guards whole operations, not only the transfer backend it wraps.
    lock: Mutex<ValueTransferBox>,
}

impl LedgerService {
    /// Creates a new `LedgerService` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - Where the ledger is loaded from and committed to.
    /// * `sink` - Receives the events of every committed operation.
    /// * `transfer` - Moves released funds to recipients.
    pub fn new(store: LedgerStoreBox, sink: EventSinkBox, transfer: ValueTransferBox) -> Self {
        Self {
            store,
            sink,
            lock: Mutex::new(transfer),
        }
    }

    /// Applies one scripted operation.
    pub async fn process_operation(&self, operation: Operation) -> Result<()> {
        match operation.op {
            OperationKind::Init => self.init(operation.caller).await,
            OperationKind::Deposit => {
                self.deposit(operation.caller, operation.amount()?).await
            }
            OperationKind::AddPayee => {
                self.add_payee(operation.caller, operation.payee()?, operation.weight()?)
                    .await
            }
            OperationKind::RemovePayee => {
                self.remove_payee(operation.caller, operation.payee()?)
                    .await
            }
            OperationKind::Release => self.release(operation.payee()?).await.map(|_| ()),
            OperationKind::ReleaseAll => self.release_all(operation.caller).await.map(|_| ()),
        }
    }

    pub async fn init(&self, caller: Identity) -> Result<()> {
        self.execute("init", |ledger, _| ledger.init(caller)).await
    }

    pub async fn deposit(&self, sender: Identity, amount: Amount) -> Result<()> {
        self.execute("deposit", |ledger, _| ledger.receive(sender, amount))
            .await
    }

    pub async fn add_payee(&self, caller: Identity, payee: Identity, weight: u64) -> Result<()> {
        self.execute("add_payee", |ledger, _| {
            ledger.add_payee(caller, payee, weight)
        })
        .await
    }

    pub async fn remove_payee(&self, caller: Identity, payee: Identity) -> Result<()> {
        self.execute("remove_payee", |ledger, _| {
            ledger.remove_payee(caller, payee)
        })
        .await
    }

    pub async fn release(&self, payee: Identity) -> Result<Amount> {
        self.execute("release", |ledger, transfer| {
            ledger.release(transfer.as_mut(), payee)
        })
        .await
    }

    pub async fn release_all(&self, caller: Identity) -> Result<Vec<(Identity, Amount)>> {
        self.execute("release_all", |ledger, transfer| {
            ledger.release_all(caller, transfer.as_mut())
        })
        .await
    }

    pub async fn releasable(&self, payee: Identity) -> Result<Amount> {
        self.snapshot().await?.releasable(payee)
    }

    pub async fn payee_count(&self) -> Result<usize> {
        Ok(self.snapshot().await?.payee_count())
    }

    pub async fn payee_at(&self, index: usize) -> Result<Identity> {
        self.snapshot().await?.payee_at(index)
    }

    /// A copy of the committed ledger.
    pub async fn snapshot(&self) -> Result<Ledger> {
        let _guard = self.lock.lock().await;
        Ok(self.store.load().await?.unwrap_or_default())
    }

    /// Consumes the service and returns the final ledger state.
    pub async fn into_ledger(self) -> Result<Ledger> {
        Ok(self.store.load().await?.unwrap_or_default())
    }

    /// Runs `apply` against the committed ledger under the service lock.
    ///
    /// Only a successful operation is saved and has its events published; a
    /// failed one leaves the stored ledger as it was.
    async fn execute<T>(
        &self,
        name: &'static str,
        apply: impl FnOnce(&mut Ledger, &mut ValueTransferBox) -> Result<T>,
    ) -> Result<T> {
        let mut transfer = self.lock.lock().await;
        let mut ledger = self.store.load().await?.unwrap_or_default();

        let value = match apply(&mut ledger, &mut *transfer) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(operation = name, error = %e, "operation rejected");
                return Err(e);
            }
        };

        let events = ledger.take_events();
        self.store.save(&ledger).await?;
        tracing::debug!(operation = name, events = events.len(), "ledger committed");
        for event in events {
            tracing::info!(operation = name, %event, "ledger event");
            self.sink.publish(event).await?;
        }
        Ok(value)
    }
}
