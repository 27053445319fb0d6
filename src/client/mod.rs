//! API Client Module
//!
//! The search core only talks to the remote API through [`ApiClient`].
//! [`ElsevierClient`] is the reqwest-backed implementation used by the CLI.

pub mod elsevier;
pub mod provider;

pub use elsevier::ElsevierClient;
pub use provider::ApiClient;
