use super::identity::Identity;
use crate::error::AuthorizationError;
use serde::{Deserialize, Serialize};

/// Single-owner guard. Claimed once by the first caller, never transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ownership {
    #[default]
    Uninitialized,
    Initialized(Identity),
}

impl Ownership {
    pub fn owner(&self) -> Option<Identity> {
        match self {
            Ownership::Uninitialized => None,
            Ownership::Initialized(owner) => Some(*owner),
        }
    }

    /// Claims ownership for `caller` if nobody has yet.
    pub fn claim(&mut self, caller: Identity) -> Result<(), AuthorizationError> {
        match self {
            Ownership::Initialized(owner) => Err(AuthorizationError::AlreadyInitialized(*owner)),
            Ownership::Uninitialized => {
                *self = Ownership::Initialized(caller);
                Ok(())
            }
        }
    }

    pub fn ensure_owner(&self, caller: Identity) -> Result<(), AuthorizationError> {
        match self {
            Ownership::Uninitialized => Err(AuthorizationError::NotInitialized),
            Ownership::Initialized(owner) if *owner == caller => Ok(()),
            Ownership::Initialized(_) => Err(AuthorizationError::NotOwner(caller)),
        }
    }
}
