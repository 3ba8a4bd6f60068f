//! Identity provider adapters.
//!
//! [`RemoteIdentityProvider`] talks to a hosted GoTrue-compatible service;
//! [`LocalIdentityProvider`] is the single-account demo variant that keeps
//! its session in a local file.

mod local;
mod remote;
mod remote_dto;

pub use local::{DEMO_ACCESS_TOKEN, DEMO_EMAIL, DEMO_PASSWORD, LocalIdentityProvider};
pub use remote::RemoteIdentityProvider;
