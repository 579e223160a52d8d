//! Proxy module for loading and probing proxy endpoints
//!
//! This module provides functionality for:
//! - Loading proxy lists from `address,type` files
//! - Probing proxy liveness and latency with bounded concurrency
//! - Delivering outcomes as a completed batch or an incremental stream

pub mod checker;
pub mod loader;
pub mod models;

pub use checker::{CheckerConfig, ProxyChecker};
pub use loader::ProxyLoader;
pub use models::{ErrorKind, ProbeOutcome, ProbeStatus, ProxyEndpoint, ProxyType};
