#![allow(dead_code)]

use payshare::domain::amount::Amount;
use payshare::domain::identity::Identity;
use payshare::domain::ledger::Ledger;
use payshare::domain::ports::{Savepoint, TransferRejected, ValueTransfer};
use std::io::Write;
use tempfile::NamedTempFile;

pub const OWNER: Identity = Identity(1);
pub const ALICE: Identity = Identity(10);
pub const BOB: Identity = Identity(11);
pub const CAROL: Identity = Identity(12);
pub const DONOR: Identity = Identity(50);

/// Writes an operation script with the standard header.
pub fn script(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, caller, payee, value").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}

/// A ledger owned by `OWNER` with the given payees and no pending events.
pub fn ledger_with(payees: &[(Identity, u64)]) -> Ledger {
    let mut ledger = Ledger::new();
    ledger.init(OWNER).unwrap();
    for (payee, weight) in payees {
        ledger.add_payee(OWNER, *payee, *weight).unwrap();
    }
    ledger.take_events();
    ledger
}

/// Accepts every transfer and remembers the ones that were not rolled back.
#[derive(Default)]
pub struct RecordingTransfer {
    pub sent: Vec<(Identity, Amount)>,
}

impl ValueTransfer for RecordingTransfer {
    fn transfer(
        &mut self,
        _ledger: &mut Ledger,
        to: Identity,
        amount: Amount,
    ) -> Result<(), TransferRejected> {
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
