//! Application layer containing the ledger orchestration.
//!
//! This module defines the `LedgerService` which acts as the primary entry point
//! for driving a ledger. It serialises operations behind a `tokio` mutex and
//! wires the domain to its storage, event and transfer ports.

pub mod engine;
