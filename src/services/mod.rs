//! Asynchronous services and external integrations
//!
//! This module contains all code that deals with the index server
//! connection and process-level setup.

pub mod rpc;
#[cfg(feature = "cli")]
pub mod tracing_setup;
