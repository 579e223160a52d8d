//! Proxy probe data models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Proxy protocol type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProxyType {
    #[default]
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyType {
    /// Uppercase label for report lines
    pub fn label(&self) -> &'static str {
        match self {
            ProxyType::Http => "HTTP",
            ProxyType::Https => "HTTPS",
            ProxyType::Socks4 => "SOCKS4",
            ProxyType::Socks5 => "SOCKS5",
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyType::Http => write!(f, "http"),
            ProxyType::Https => write!(f, "https"),
            ProxyType::Socks4 => write!(f, "socks4"),
            ProxyType::Socks5 => write!(f, "socks5"),
        }
    }
}

impl FromStr for ProxyType {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(ProxyType::Http),
            "https" => Ok(ProxyType::Https),
            "socks4" => Ok(ProxyType::Socks4),
            "socks5" => Ok(ProxyType::Socks5),
            _ => Err(ErrorKind::Config(format!("unknown proxy type: {}", s))),
        }
    }
}

/// A candidate proxy endpoint to probe
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: u16,
    pub proxy_type: ProxyType,
}

impl ProxyEndpoint {
    pub fn new(host: String, port: u16, proxy_type: ProxyType) -> Self {
        Self {
            host,
            port,
            proxy_type,
        }
    }

    /// The endpoint address in HOST:PORT format
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The endpoint as a proxy URL, e.g. `socks5://1.2.3.4:1080`
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.proxy_type, self.host, self.port)
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

/// Why a probe failed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ErrorKind {
    #[error("timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("invalid proxy configuration: {0}")]
    Config(String),
    #[error("{0}")]
    Unclassified(String),
}

impl From<reqwest::Error> for ErrorKind {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else if err.is_builder() {
            ErrorKind::Config(err.to_string())
        } else {
            ErrorKind::Unclassified(err.to_string())
        }
    }
}

/// Outcome status of one probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProbeStatus {
    Working,
    Failed(ErrorKind),
}

/// One completed probe: the endpoint, whether it worked, and how fast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub endpoint: ProxyEndpoint,
    pub status: ProbeStatus,
    pub latency: Option<Duration>,
}

impl ProbeOutcome {
    pub fn working(endpoint: ProxyEndpoint, latency: Duration) -> Self {
        Self {
            endpoint,
            status: ProbeStatus::Working,
            latency: Some(round_to_hundredths(latency)),
        }
    }

    pub fn failed(endpoint: ProxyEndpoint, cause: ErrorKind) -> Self {
        Self {
            endpoint,
            status: ProbeStatus::Failed(cause),
            latency: None,
        }
    }

    pub fn is_working(&self) -> bool {
        matches!(self.status, ProbeStatus::Working)
    }

    /// Latency in seconds, if the probe succeeded
    pub fn latency_secs(&self) -> Option<f64> {
        self.latency.map(|d| d.as_secs_f64())
    }

    /// One human-readable line: type, address, status, latency if working
    pub fn summary(&self) -> String {
        match self.latency_secs() {
            Some(secs) => format!(
                "[✔] {} {} - Working (Ping: {:.2}s)",
                self.endpoint.proxy_type.label(),
                self.endpoint.address(),
                secs
            ),
            None => format!(
                "[✖] {} {} - Failed",
                self.endpoint.proxy_type.label(),
                self.endpoint.address()
            ),
        }
    }
}

/// Round a duration to hundredths of a second
pub(crate) fn round_to_hundredths(d: Duration) -> Duration {
    Duration::from_millis(((d.as_millis() as f64 / 10.0).round() as u64) * 10)
}
