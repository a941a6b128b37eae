use super::amount::Amount;
use super::event::LedgerEvent;
use super::identity::Identity;
use super::ownership::Ownership;
use super::payee::{PayeeAccount, Registry};
use crate::error::{Result, SplitterError, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The complete state of a fund-splitting pool.
///
/// `Ledger` is the single source of truth for ownership, the payee registry,
/// per-payee accounting and the pool balance. Every mutating method either
/// applies all of its changes or returns an error having changed nothing.
///
/// Events produced by successful operations are buffered and handed to the
/// caller through [`Ledger::take_events`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub(super) ownership: Ownership,
    pub(super) registry: Registry,
    /// Every identity that has ever held shares, active or not.
    pub(super) accounts: BTreeMap<Identity, PayeeAccount>,
    pub(super) total_weight: u64,
    pub(super) total_released: Amount,
    pub(super) balance: Amount,
    #[serde(skip)]
    pub(super) pending: Vec<LedgerEvent>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims ownership for `caller`. Only the first call succeeds.
    pub fn init(&mut self, caller: Identity) -> Result<()> {
        self.ownership.claim(caller)?;
        self.pending.push(LedgerEvent::OwnerInit { owner: caller });
        Ok(())
    }

    /// Records an inbound transfer into the pool.
    pub fn receive(&mut self, sender: Identity, amount: Amount) -> Result<()> {
        self.balance = self.balance.checked_add(amount, "pool balance")?;
        self.pending.push(LedgerEvent::PaymentReceived { sender, amount });
        Ok(())
    }

    pub fn owner(&self) -> Option<Identity> {
        self.ownership.owner()
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn total_released(&self) -> Amount {
        self.total_released
    }

    /// Lifetime inflow: whatever is still pooled plus everything paid out.
    pub fn total_received(&self) -> Result<Amount> {
        Ok(self
            .balance
            .checked_add(self.total_released, "total received")?)
    }

    /// Current shares of `payee`, zero for unknown and removed identities.
    pub fn weight_of(&self, payee: Identity) -> u64 {
        self.accounts.get(&payee).map_or(0, |a| a.weight)
    }

    /// Cumulative amount paid to `payee`, retained after removal.
    pub fn released_to(&self, payee: Identity) -> Amount {
        self.accounts
            .get(&payee)
            .map_or(Amount::ZERO, |a| a.released)
    }

    pub fn account(&self, payee: Identity) -> Option<&PayeeAccount> {
        self.accounts.get(&payee)
    }

    /// Active and former payees, ordered by identity.
    pub fn accounts(&self) -> impl Iterator<Item = &PayeeAccount> {
        self.accounts.values()
    }

    pub fn payee_count(&self) -> usize {
        self.registry.len()
    }

    pub fn payee_at(&self, index: usize) -> Result<Identity> {
        self.registry.get(index).ok_or_else(|| {
            ValidationError::IndexOutOfRange {
                index,
                count: self.registry.len(),
            }
            .into()
        })
    }

    /// Snapshot of the active registry in its current (unstable) order.
    pub fn payees(&self) -> Vec<Identity> {
        self.registry.as_slice().to_vec()
    }

    /// Drains the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Checks the structural invariants that every completed operation must
    /// preserve: weight totals, registry membership and released totals.
    /// Used by tests and when loading state from storage.
    pub fn verify(&self) -> Result<()> {
        let mut weight_sum: u64 = 0;
        for payee in self.registry.as_slice() {
            let weight = self.weight_of(*payee);
            if weight == 0 {
                return Err(corrupt(format!("registered payee {payee} has no shares")));
            }
            weight_sum = weight_sum
                .checked_add(weight)
                .ok_or_else(|| corrupt("weight sum overflows".to_string()))?;
        }
        if weight_sum != self.total_weight {
            return Err(corrupt(format!(
                "total weight {} does not match registry sum {weight_sum}",
                self.total_weight
            )));
        }

        let mut released_sum = Amount::ZERO;
        for account in self.accounts.values() {
            if account.is_active() != self.registry.contains(account.payee) {
                return Err(corrupt(format!(
                    "payee {} weight and registry membership disagree",
                    account.payee
                )));
            }
            released_sum = released_sum.checked_add(account.released, "released sum")?;
        }
        if released_sum != self.total_released {
            return Err(corrupt(format!(
                "total released {} does not match per-payee sum {released_sum}",
                self.total_released
            )));
        }

        Ok(())
    }
}

fn corrupt(message: String) -> SplitterError {
    SplitterError::InternalError(message.into())
}
