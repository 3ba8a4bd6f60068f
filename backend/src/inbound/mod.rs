//! Inbound adapters translating HTTP requests into domain calls.
//!
//! Framework details stay here; handlers only see ports via
//! [`http::state::HttpState`].

pub mod http;
