//! # Study-room transport
//!
//! The network boundary of the form engine: a small [`Transport`] contract
//! (`get` / `post` / `patch` returning `{status, data}`), a `reqwest`-backed
//! [`HttpTransport`], and typed wrappers for the endpoints the signup and
//! recruit-post forms call.

pub mod api;
mod client;
mod config;
mod error;

pub use client::*;
pub use config::*;
pub use error::*;
