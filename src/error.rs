use crate::domain::amount::Amount;
use crate::domain::identity::Identity;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("caller {0} is not the owner")]
    NotOwner(Identity),
    #[error("ownership already claimed by {0}")]
    AlreadyInitialized(Identity),
    #[error("ownership has not been claimed yet")]
    NotInitialized,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the null identity cannot be a payee")]
    InvalidIdentity,
    #[error("payee {0} must be added with a positive weight")]
    ZeroWeight(Identity),
    #[error("payee {0} is already registered")]
    DuplicatePayee(Identity),
    #[error("payee {0} is not registered")]
    UnknownPayee(Identity),
    #[error("index {index} out of range for {count} payees")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("malformed operation: {0}")]
    MalformedOperation(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountingError {
    #[error("{0} holds no shares")]
    NoShares(Identity),
    #[error("{0} is not due any payment")]
    NothingDue(Identity),
    #[error("arithmetic overflow while computing {0}")]
    ArithmeticOverflow(&'static str),
    #[error("division by zero while computing {0}")]
    DivisionByZero(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("transfer of {amount} to {to} failed: {reason}")]
    TransferFailed {
        to: Identity,
        amount: Amount,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum SplitterError {
    #[error("authorization error: {0}")]
    Authorization(#[from] AuthorizationError),
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("accounting error: {0}")]
    Accounting(#[from] AccountingError),
    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDBError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl SplitterError {
    /// True for failures raised by the ledger rules rather than by storage or I/O.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            SplitterError::Authorization(_)
                | SplitterError::Validation(_)
                | SplitterError::Accounting(_)
                | SplitterError::Transfer(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SplitterError>;
