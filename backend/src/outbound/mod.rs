//! Outbound adapters implementing the driven domain ports.
//!
//! - **memory**: the in-process pet record store.
//! - **identity**: remote and local identity providers.
//!
//! Adapters translate between domain types and their transport or storage
//! representation. They contain no business rules.

pub mod identity;
pub mod memory;
