use super::amount::Amount;
use super::identity::Identity;
use crate::error::ValidationError;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Init,
    Deposit,
    AddPayee,
    RemovePayee,
    Release,
    ReleaseAll,
}

/// One scripted call against the ledger.
///
/// `value` is the deposited amount for `deposit` and the weight for
/// `add_payee`; other operations ignore it.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
pub struct Operation {
    pub op: OperationKind,
    pub caller: Identity,
    pub payee: Option<Identity>,
    pub value: Option<u64>,
}

impl Operation {
    pub fn payee(&self) -> Result<Identity, ValidationError> {
        self.payee.ok_or_else(|| self.missing("payee"))
    }

    pub fn weight(&self) -> Result<u64, ValidationError> {
        self.value.ok_or_else(|| self.missing("weight"))
    }

    pub fn amount(&self) -> Result<Amount, ValidationError> {
        self.value
            .map(Amount::from)
            .ok_or_else(|| self.missing("amount"))
    }

    fn missing(&self, field: &str) -> ValidationError {
        ValidationError::MalformedOperation(format!("{:?} requires a {field}", self.op))
    }
}
