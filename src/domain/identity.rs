use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque principal: a depositor, a payee, or the owner.
///
/// `Identity::NULL` (zero) is reserved and can never hold shares.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Identity(pub u32);

impl Identity {
    pub const NULL: Self = Self(0);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Identity {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
