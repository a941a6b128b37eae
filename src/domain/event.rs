use super::amount::Amount;
use super::identity::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Log records emitted by successful ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    OwnerInit { owner: Identity },
    PayeeAdded { payee: Identity, weight: u64 },
    PayeeRemoved { payee: Identity },
    PaymentReceived { sender: Identity, amount: Amount },
    PaymentReleased { recipient: Identity, amount: Amount },
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerEvent::OwnerInit { owner } => write!(f, "OwnerInit({owner})"),
            LedgerEvent::PayeeAdded { payee, weight } => {
                write!(f, "PayeeAdded({payee}, {weight})")
            }
            LedgerEvent::PayeeRemoved { payee } => write!(f, "PayeeRemoved({payee})"),
            LedgerEvent::PaymentReceived { sender, amount } => {
                write!(f, "PaymentReceived({sender}, {amount})")
            }
            LedgerEvent::PaymentReleased { recipient, amount } => {
                write!(f, "PaymentReleased({recipient}, {amount})")
            }
        }
    }
}
