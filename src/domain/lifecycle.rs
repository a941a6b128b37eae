//! Owner-only mutation of the payee set.

use super::event::LedgerEvent;
use super::identity::Identity;
use super::ledger::Ledger;
use super::payee::PayeeAccount;
use crate::error::{AccountingError, Result, ValidationError};

impl Ledger {
    /// Registers `payee` with `weight` shares.
    ///
    /// A previously removed identity may be added again; its historical
    /// `released` amount keeps counting against the new entitlement.
    pub fn add_payee(&mut self, caller: Identity, payee: Identity, weight: u64) -> Result<()> {
        self.ownership.ensure_owner(caller)?;
        if payee.is_null() {
            return Err(ValidationError::InvalidIdentity.into());
        }
        if weight == 0 {
            return Err(ValidationError::ZeroWeight(payee).into());
        }
        if self.weight_of(payee) > 0 {
            return Err(ValidationError::DuplicatePayee(payee).into());
        }
        let total_weight = self
            .total_weight
            .checked_add(weight)
            .ok_or(AccountingError::ArithmeticOverflow("total weight"))?;

        self.registry.insert(payee);
        let account = self
            .accounts
            .entry(payee)
            .or_insert_with(|| PayeeAccount::new(payee));
        account.weight = weight;
        self.total_weight = total_weight;
        self.pending.push(LedgerEvent::PayeeAdded { payee, weight });
        Ok(())
    }

    /// Deregisters `payee`.
    ///
    /// The payee's unclaimed entitlement is forfeited: the shrinking
    /// denominator raises every remaining payee's share on the next read.
    pub fn remove_payee(&mut self, caller: Identity, payee: Identity) -> Result<()> {
        self.ownership.ensure_owner(caller)?;
        let Some(account) = self.accounts.get_mut(&payee).filter(|a| a.is_active()) else {
            return Err(ValidationError::UnknownPayee(payee).into());
        };

        self.total_weight -= account.weight;
        account.weight = 0;
        self.registry.remove(payee);
        self.pending.push(LedgerEvent::PayeeRemoved { payee });
        Ok(())
    }
}
