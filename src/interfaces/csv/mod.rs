//! CSV adapters: operation scripts in, payee reports out.

pub mod operation_reader;
pub mod payee_writer;
