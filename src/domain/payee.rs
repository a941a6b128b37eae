use super::amount::Amount;
use super::identity::Identity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Accounting record for an identity that has held shares at some point.
///
/// The record outlives removal: `weight` drops to zero but `released` is kept
/// as a permanent audit of what was paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayeeAccount {
    pub payee: Identity,
    /// Current shares. Zero once removed.
    pub weight: u64,
    /// Cumulative amount ever paid to this payee.
    pub released: Amount,
}

impl PayeeAccount {
    pub fn new(payee: Identity) -> Self {
        Self {
            payee,
            weight: 0,
            released: Amount::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        self.weight > 0
    }
}

/// The set of active payees.
///
/// Positions are tracked alongside the list so removal is a constant-time
/// swap with the last entry. Order carries no meaning and changes on removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Identity>", into = "Vec<Identity>")]
pub struct Registry {
    members: Vec<Identity>,
    positions: HashMap<Identity, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, payee: Identity) -> bool {
        self.positions.contains_key(&payee)
    }

    pub fn get(&self, index: usize) -> Option<Identity> {
        self.members.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Identity] {
        &self.members
    }

    /// Returns false if `payee` was already present.
    pub fn insert(&mut self, payee: Identity) -> bool {
        if self.contains(payee) {
            return false;
        }
        self.positions.insert(payee, self.members.len());
        self.members.push(payee);
        true
    }

    /// Swap-with-last-and-shrink. Returns false if `payee` was absent.
    pub fn remove(&mut self, payee: Identity) -> bool {
        let Some(index) = self.positions.remove(&payee) else {
            return false;
        };
        self.members.swap_remove(index);
        if let Some(moved) = self.members.get(index) {
            self.positions.insert(*moved, index);
        }
        true
    }
}

impl From<Vec<Identity>> for Registry {
    fn from(members: Vec<Identity>) -> Self {
        let mut registry = Registry::new();
        for payee in members {
            registry.insert(payee);
        }
        registry
    }
}

impl From<Registry> for Vec<Identity> {
    fn from(registry: Registry) -> Self {
        registry.members
    }
}
