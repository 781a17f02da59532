//! Configuration backend adapters for the credit quote core.

#![deny(unsafe_code)]

pub mod backend;
pub mod client;

pub use backend::ConfigBackendClient;
pub use client::{ConfigBackendConfig, ResilientClient};
