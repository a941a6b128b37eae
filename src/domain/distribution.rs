//! Entitlement computation and the pull-based withdrawal protocol.
//!
//! A payee's entitlement is `floor(total_received * weight / total_weight)`,
//! evaluated against the live weight table every time it is read. `release`
//! books the payout (released amounts and pool balance) before it hands
//! control to the transfer port, so a recipient that calls back into the
//! ledger from inside the transfer already sees nothing left to claim.
//!
//! Both withdrawal operations are all-or-nothing. They checkpoint the ledger
//! and take a transfer savepoint on entry; on any failure the ledger is
//! restored, pending events included, and the transfers are rolled back. This
//! discards whatever a recipient callback did through the ledger as well.

use super::amount::Amount;
use super::event::LedgerEvent;
use super::identity::Identity;
use super::ledger::Ledger;
use super::ports::ValueTransfer;
use crate::error::{AccountingError, Result, SplitterError, TransferError};

impl Ledger {
    /// Amount currently withdrawable by `payee`.
    pub fn releasable(&self, payee: Identity) -> Result<Amount> {
        let weight = self.weight_of(payee);
        if weight == 0 {
            return Err(AccountingError::NoShares(payee).into());
        }
        let entitlement =
            self.total_received()?
                .pro_rata(weight, self.total_weight, "entitlement")?;
        Ok(entitlement.saturating_sub(self.released_to(payee)))
    }

    /// Pays `payee` everything it is currently owed through `transfer`.
    ///
    /// Callable by anyone; the funds always go to `payee`.
    pub fn release(&mut self, transfer: &mut dyn ValueTransfer, payee: Identity) -> Result<Amount> {
        let payment = self.releasable(payee)?;
        if payment.is_zero() {
            return Err(AccountingError::NothingDue(payee).into());
        }

        let checkpoint = self.clone();
        let savepoint = transfer.savepoint();
        if let Err(e) = self.pay_out(transfer, payee, payment) {
            *self = checkpoint;
            transfer.rollback(savepoint);
            return Err(e);
        }
        Ok(payment)
    }

    /// Owner-only: releases to every active payee that is owed something.
    ///
    /// The registry is snapshotted up front, so payees added or removed by a
    /// recipient callback neither extend nor shorten the walk; a snapshot entry
    /// that no longer holds shares is skipped. Any failing release aborts the
    /// whole batch: payouts already made in it are undone along with it.
    pub fn release_all(
        &mut self,
        caller: Identity,
        transfer: &mut dyn ValueTransfer,
    ) -> Result<Vec<(Identity, Amount)>> {
        self.ownership.ensure_owner(caller)?;

        let checkpoint = self.clone();
        let savepoint = transfer.savepoint();
        let outcome = self.release_snapshot(transfer);
        if outcome.is_err() {
            *self = checkpoint;
            transfer.rollback(savepoint);
        }
        outcome
    }

    fn release_snapshot(
        &mut self,
        transfer: &mut dyn ValueTransfer,
    ) -> Result<Vec<(Identity, Amount)>> {
        let snapshot = self.payees();
        let mut paid = Vec::with_capacity(snapshot.len());
        for payee in snapshot {
            let due = match self.releasable(payee) {
                Ok(due) => due,
                Err(SplitterError::Accounting(AccountingError::NoShares(_))) => continue,
                Err(e) => return Err(e),
            };
            if due.is_zero() {
                continue;
            }
            paid.push((payee, self.release(transfer, payee)?));
        }
        Ok(paid)
    }

    fn pay_out(
        &mut self,
        transfer: &mut dyn ValueTransfer,
        payee: Identity,
        payment: Amount,
    ) -> Result<()> {
        self.book_payout(payee, payment)?;
        transfer
            .transfer(self, payee, payment)
            .map_err(|rejected| TransferError::TransferFailed {
                to: payee,
                amount: payment,
                reason: rejected.0,
            })?;
        self.pending.push(LedgerEvent::PaymentReleased {
            recipient: payee,
            amount: payment,
        });
        Ok(())
    }

    /// Moves `payment` out of the pool and onto `payee`'s record. All values
    /// are computed before any is written.
    fn book_payout(&mut self, payee: Identity, payment: Amount) -> Result<()> {
        let balance = self.balance.checked_sub(payment, "pool balance").map_err(|_| {
            TransferError::TransferFailed {
                to: payee,
                amount: payment,
                reason: format!("pool holds only {}", self.balance),
            }
        })?;
        let total_released = self
            .total_released
            .checked_add(payment, "total released")?;
        let account = self
            .accounts
            .get_mut(&payee)
            .ok_or(AccountingError::NoShares(payee))?;
        let released = account.released.checked_add(payment, "released")?;

        account.released = released;
        self.total_released = total_released;
        self.balance = balance;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{Savepoint, TransferRejected};
    use crate::error::{AuthorizationError, ValidationError};

    const OWNER: Identity = Identity(1);
    const ALICE: Identity = Identity(10);
    const BOB: Identity = Identity(11);
    const CAROL: Identity = Identity(12);
    const DONOR: Identity = Identity(99);

    /// Records every transfer and rejects the identities it is told to.
    #[derive(Default)]
    struct Recorder {
        sent: Vec<(Identity, Amount)>,
        reject: Vec<Identity>,
    }

    impl ValueTransfer for Recorder {
        fn transfer(
            &mut self,
            _ledger: &mut Ledger,
            to: Identity,
            amount: Amount,
        ) -> std::result::Result<(), TransferRejected> {
            if self.reject.contains(&to) {
                return Err(TransferRejected("recipient refused".to_string()));
            }
            self.sent.push((to, amount));
            Ok(())
        }

        fn savepoint(&mut self) -> Savepoint {
            Savepoint(self.sent.len())
        }

        fn rollback(&mut self, savepoint: Savepoint) {
            self.sent.truncate(savepoint.0);
        }
    }

    fn ledger_with(payees: &[(Identity, u64)]) -> Ledger {
        let mut ledger = Ledger::new();
        ledger.init(OWNER).unwrap();
        for (payee, weight) in payees {
            ledger.add_payee(OWNER, *payee, *weight).unwrap();
        }
        ledger.take_events();
        ledger
    }

    #[test]
    fn test_sole_payee_without_deposits() {
        let ledger = ledger_with(&[(ALICE, 7)]);
        assert_eq!(ledger.releasable(ALICE).unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_sole_payee_receives_whole_deposit() {
        let mut ledger = ledger_with(&[(ALICE, 7)]);
        ledger.receive(DONOR, Amount::new(123)).unwrap();
        assert_eq!(ledger.releasable(ALICE).unwrap(), Amount::new(123));
    }

    #[test]
    fn test_releasable_requires_shares() {
        let ledger = ledger_with(&[(ALICE, 1)]);
        assert!(matches!(
            ledger.releasable(BOB),
            Err(SplitterError::Accounting(AccountingError::NoShares(id))) if id == BOB
        ));
    }

    #[test]
    fn test_release_nothing_due_changes_nothing() {
        let mut ledger = ledger_with(&[(ALICE, 1)]);
        let before = ledger.clone();
        let mut wallet = Recorder::default();

        assert!(matches!(
            ledger.release(&mut wallet, ALICE),
            Err(SplitterError::Accounting(AccountingError::NothingDue(_)))
        ));
        assert_eq!(ledger, before);
        assert!(wallet.sent.is_empty());
    }

    #[test]
    fn test_release_splits_pro_rata() {
        let mut ledger = ledger_with(&[(ALICE, 1), (BOB, 1)]);
        ledger.receive(DONOR, Amount::new(100)).unwrap();
        ledger.take_events();
        let mut wallet = Recorder::default();

        assert_eq!(ledger.releasable(ALICE).unwrap(), Amount::new(50));
        assert_eq!(ledger.releasable(BOB).unwrap(), Amount::new(50));

        let paid = ledger.release(&mut wallet, ALICE).unwrap();
        assert_eq!(paid, Amount::new(50));
        assert_eq!(wallet.sent, vec![(ALICE, Amount::new(50))]);
        assert_eq!(ledger.released_to(ALICE), Amount::new(50));
        assert_eq!(ledger.total_released(), Amount::new(50));
        assert_eq!(ledger.balance(), Amount::new(50));
        assert_eq!(ledger.releasable(ALICE).unwrap(), Amount::ZERO);
        assert_eq!(ledger.releasable(BOB).unwrap(), Amount::new(50));
        assert_eq!(
            ledger.take_events(),
            vec![LedgerEvent::PaymentReleased {
                recipient: ALICE,
                amount: Amount::new(50)
            }]
        );
        assert!(ledger.verify().is_ok());
    }

    #[test]
    fn test_rejected_transfer_is_fully_undone() {
        let mut ledger = ledger_with(&[(ALICE, 1), (BOB, 3)]);
        ledger.receive(DONOR, Amount::new(40)).unwrap();
        ledger.take_events();
        let before = ledger.clone();
        let mut wallet = Recorder {
            reject: vec![BOB],
            ..Default::default()
        };

        let err = ledger.release(&mut wallet, BOB).unwrap_err();
        assert!(matches!(
            err,
            SplitterError::Transfer(TransferError::TransferFailed { to, amount, .. })
                if to == BOB && amount == Amount::new(30)
        ));
        assert_eq!(ledger, before);
        assert_eq!(ledger.releasable(BOB).unwrap(), Amount::new(30));
    }

    #[test]
    fn test_removal_forfeits_share_to_remaining_payees() {
        let mut ledger = ledger_with(&[(ALICE, 1), (BOB, 1)]);
        let mut wallet = Recorder::default();
        ledger.receive(DONOR, Amount::new(100)).unwrap();
        ledger.release(&mut wallet, ALICE).unwrap();

        ledger.remove_payee(OWNER, ALICE).unwrap();
        assert_eq!(ledger.total_weight(), 1);
        ledger.receive(DONOR, Amount::new(10)).unwrap();

        // Balance 60 plus 50 released: BOB alone is now entitled to all 110.
        let expected = ledger
            .total_received()
            .unwrap()
            .saturating_sub(ledger.released_to(BOB));
        assert_eq!(expected, Amount::new(110));
        assert_eq!(ledger.releasable(BOB).unwrap(), expected);

        assert!(matches!(
            ledger.release(&mut wallet, ALICE),
            Err(SplitterError::Accounting(AccountingError::NoShares(_)))
        ));
        assert!(ledger.verify().is_ok());
    }

    #[test]
    fn test_release_beyond_pool_balance_fails_cleanly() {
        let mut ledger = ledger_with(&[(ALICE, 1), (BOB, 1)]);
        let mut wallet = Recorder::default();
        ledger.receive(DONOR, Amount::new(100)).unwrap();
        ledger.release(&mut wallet, ALICE).unwrap();
        ledger.remove_payee(OWNER, ALICE).unwrap();

        // BOB is owed 100 but only 50 is left in the pool.
        let before = ledger.clone();
        assert!(matches!(
            ledger.release(&mut wallet, BOB),
            Err(SplitterError::Transfer(TransferError::TransferFailed { .. }))
        ));
        assert_eq!(ledger, before);
        assert_eq!(wallet.sent.len(), 1);
    }

    #[test]
    fn test_floor_rounding_leaves_dust() {
        let mut ledger = ledger_with(&[(ALICE, 1), (BOB, 1), (CAROL, 1)]);
        let mut wallet = Recorder::default();
        ledger.receive(DONOR, Amount::new(100)).unwrap();

        for payee in [ALICE, BOB, CAROL] {
            assert_eq!(ledger.release(&mut wallet, payee).unwrap(), Amount::new(33));
        }

        assert_eq!(ledger.total_released(), Amount::new(99));
        assert!(ledger.total_released() < ledger.total_received().unwrap());
        assert_eq!(ledger.balance(), Amount::new(1));
        for payee in [ALICE, BOB, CAROL] {
            assert_eq!(ledger.releasable(payee).unwrap(), Amount::ZERO);
        }
    }

    #[test]
    fn test_release_all_pays_every_due_payee() {
        let mut ledger = ledger_with(&[(ALICE, 1), (BOB, 2), (CAROL, 1)]);
        let mut wallet = Recorder::default();
        ledger.receive(DONOR, Amount::new(40)).unwrap();
        ledger.release(&mut wallet, BOB).unwrap();
        ledger.receive(DONOR, Amount::new(4)).unwrap();

        let paid = ledger.release_all(OWNER, &mut wallet).unwrap();
        assert_eq!(
            paid,
            vec![
                (ALICE, Amount::new(11)),
                (BOB, Amount::new(2)),
                (CAROL, Amount::new(11)),
            ]
        );
        assert_eq!(ledger.balance(), Amount::ZERO);
        assert!(ledger.verify().is_ok());
    }

    #[test]
    fn test_release_all_requires_owner() {
        let mut ledger = ledger_with(&[(ALICE, 1)]);
        let mut wallet = Recorder::default();
        assert!(matches!(
            ledger.release_all(ALICE, &mut wallet),
            Err(SplitterError::Authorization(AuthorizationError::NotOwner(_)))
        ));
    }

    #[test]
    fn test_release_all_failure_aborts_whole_batch() {
        let mut ledger = ledger_with(&[(ALICE, 1), (BOB, 1), (CAROL, 1)]);
        ledger.receive(DONOR, Amount::new(30)).unwrap();
        ledger.take_events();
        let before = ledger.clone();
        let mut wallet = Recorder {
            reject: vec![BOB],
            ..Default::default()
        };

        assert!(matches!(
            ledger.release_all(OWNER, &mut wallet),
            Err(SplitterError::Transfer(TransferError::TransferFailed { to, .. })) if to == BOB
        ));
        // ALICE was paid before BOB failed; that payout is taken back too.
        assert!(wallet.sent.is_empty());
        assert_eq!(ledger, before);
        assert!(ledger.take_events().is_empty());
        assert_eq!(ledger.releasable(ALICE).unwrap(), Amount::new(10));
    }

    #[test]
    fn test_release_all_keeps_earlier_transfers_of_caller() {
        let mut ledger = ledger_with(&[(ALICE, 1), (BOB, 1)]);
        ledger.receive(DONOR, Amount::new(20)).unwrap();
        let mut wallet = Recorder::default();
        ledger.release(&mut wallet, ALICE).unwrap();

        wallet.reject.push(BOB);
        assert!(ledger.release_all(OWNER, &mut wallet).is_err());

        // Only the batch is rolled back, not what happened before it.
        assert_eq!(wallet.sent, vec![(ALICE, Amount::new(10))]);
        assert_eq!(ledger.released_to(ALICE), Amount::new(10));
    }

    #[test]
    fn test_payee_at_enumerates_active_set() {
        let mut ledger = ledger_with(&[(ALICE, 1), (BOB, 1), (CAROL, 1)]);
        ledger.remove_payee(OWNER, BOB).unwrap();

        let mut listed: Vec<Identity> = (0..ledger.payee_count())
            .map(|i| ledger.payee_at(i).unwrap())
            .collect();
        listed.sort();
        assert_eq!(listed, vec![ALICE, CAROL]);
        assert!(matches!(
            ledger.payee_at(2),
            Err(SplitterError::Validation(ValidationError::IndexOutOfRange { .. }))
        ));
    }
}
