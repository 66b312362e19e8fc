//! Base types and error handling.
//!
//! - [`StoreError`](storeerror::StoreError): the single error type surfaced by
//!   the cookie store, the key-value backends and the cookie model.

pub mod storeerror;

#[cfg(test)]
mod tests;
