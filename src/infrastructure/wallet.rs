use crate::domain::amount::Amount;
use crate::domain::identity::Identity;
use crate::domain::ledger::Ledger;
use crate::domain::ports::{Savepoint, TransferRejected, ValueTransfer};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Accounts {
    balances: HashMap<Identity, Amount>,
    rejecting: HashSet<Identity>,
    transfers: Vec<(Identity, Amount)>,
}

/// A stand-in for the native value-transfer primitive.
///
/// Credits recipients in memory and keeps a log of every transfer. Recipients
/// registered through [`InMemoryWallet::reject`] refuse incoming funds, which
/// is how a failing payout is simulated. Rolling back to a savepoint debits
/// the recipients of every later transfer again. Clones share the same
/// accounts.
#[derive(Default, Clone)]
pub struct InMemoryWallet {
    inner: Arc<Mutex<Accounts>>,
}

impl InMemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every future transfer to `recipient` fail.
    pub fn reject(&self, recipient: Identity) {
        self.lock().rejecting.insert(recipient);
    }

    pub fn accept(&self, recipient: Identity) {
        self.lock().rejecting.remove(&recipient);
    }

    pub fn balance_of(&self, recipient: Identity) -> Amount {
        self.lock()
            .balances
            .get(&recipient)
            .copied()
            .unwrap_or_default()
    }

    /// Successful transfers in the order they happened.
    pub fn transfers(&self) -> Vec<(Identity, Amount)> {
        self.lock().transfers.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Accounts> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ValueTransfer for InMemoryWallet {
    fn transfer(
        &mut self,
        _ledger: &mut Ledger,
        to: Identity,
        amount: Amount,
    ) -> Result<(), TransferRejected> {
        let mut accounts = self.lock();
        if accounts.rejecting.contains(&to) {
            return Err(TransferRejected(format!("recipient {to} refuses payments")));
        }
        let balance = accounts.balances.entry(to).or_default();
        *balance = balance
            .checked_add(amount, "recipient balance")
            .map_err(|e| TransferRejected(e.to_string()))?;
        accounts.transfers.push((to, amount));
        Ok(())
    }

    fn savepoint(&mut self) -> Savepoint {
        Savepoint(self.lock().transfers.len())
    }

    fn rollback(&mut self, savepoint: Savepoint) {
        let mut accounts = self.lock();
        let from = savepoint.0.min(accounts.transfers.len());
        let undone: Vec<_> = accounts.transfers.drain(from..).collect();
        for (to, amount) in undone {
            if let Some(balance) = accounts.balances.get_mut(&to) {
                *balance = balance.saturating_sub(amount);
            }
        }
    }
}
