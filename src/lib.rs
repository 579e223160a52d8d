//! Proxy Probe - Concurrent Proxy Liveness Checker
//!
//! Probes a list of proxy endpoints through an external echo service with
//! bounded concurrency, measuring round-trip latency and reporting which
//! proxies are functional.

pub mod proxy;
pub mod report;
pub mod tui;

pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
