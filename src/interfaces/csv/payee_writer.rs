use crate::domain::amount::Amount;
use crate::domain::identity::Identity;
use crate::domain::ledger::Ledger;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// One line of the payee report.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct PayeeRow {
    pub payee: Identity,
    pub weight: u64,
    pub released: Amount,
    /// Zero for payees that no longer hold shares.
    pub releasable: Amount,
    pub active: bool,
}

impl PayeeRow {
    /// Rows for every identity that ever held shares, ordered by identity.
    pub fn from_ledger(ledger: &Ledger) -> Result<Vec<Self>> {
        ledger
            .accounts()
            .map(|account| {
                let releasable = if account.is_active() {
                    ledger.releasable(account.payee)?
                } else {
                    Amount::ZERO
                };
                Ok(Self {
                    payee: account.payee,
                    weight: account.weight,
                    released: account.released,
                    releasable,
                    active: account.is_active(),
                })
            })
            .collect()
    }
}

/// Writes the payee report as CSV.
pub struct PayeeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PayeeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_ledger(&mut self, ledger: &Ledger) -> Result<()> {
        self.write_rows(PayeeRow::from_ledger(ledger)?)
    }

    pub fn write_rows(&mut self, rows: impl IntoIterator<Item = PayeeRow>) -> Result<()> {
        let mut wrote_any = false;
        for row in rows {
            self.writer.serialize(row)?;
            wrote_any = true;
        }
        if !wrote_any {
            self.writer
                .write_record(["payee", "weight", "released", "releasable", "active"])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
