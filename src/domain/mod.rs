//! Domain layer: the ledger, its invariants, and the ports it talks through.
//!
//! Everything here is synchronous and free of I/O. The `Ledger` methods are
//! spread over submodules by concern: deposit intake and queries in `ledger`,
//! payee-set mutation in `lifecycle`, entitlement and withdrawal in
//! `distribution`.

pub mod amount;
pub mod distribution;
pub mod event;
pub mod identity;
pub mod ledger;
pub mod lifecycle;
pub mod operation;
pub mod ownership;
pub mod payee;
pub mod ports;
