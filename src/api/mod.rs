//! HTTP access to the roster backend, split across logical submodules.
//!
//! `client` owns the three endpoints and `error` the failure taxonomy. Callers
//! only need `RosterClient` and `ApiError`.

mod client;
mod error;

pub use client::RosterClient;
pub use error::ApiError;
