//! Probe engine: single-endpoint probes and the bounded-concurrency dispatcher

use crate::proxy::models::{ErrorKind, ProbeOutcome, ProxyEndpoint, ProxyType};
use futures::stream::{self, StreamExt};
use reqwest::{Client, Proxy as ReqwestProxy, StatusCode};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};

/// Default timeout for a single probe in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default number of concurrent probes
const DEFAULT_CONCURRENCY: usize = 10;

/// Default echo endpoint to probe through the proxy
const DEFAULT_TEST_URL: &str = "http://httpbin.org/ip";

/// Configuration for the probe engine
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each probe
    pub timeout: Duration,
    /// Number of concurrent probes
    pub concurrency: usize,
    /// Echo URL to request through each proxy
    pub test_url: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            test_url: DEFAULT_TEST_URL.to_string(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_test_url(mut self, url: String) -> Self {
        self.test_url = url;
        self
    }
}

/// Probe engine for validating proxy endpoints
#[derive(Debug, Clone)]
pub struct ProxyChecker {
    config: CheckerConfig,
}

impl ProxyChecker {
    /// Create a new probe engine with default configuration
    pub fn new() -> Self {
        Self {
            config: CheckerConfig::default(),
        }
    }

    /// Create a new probe engine with custom configuration
    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    /// Probe a single endpoint
    ///
    /// Never fails: every error path is folded into a `ProbeOutcome`.
    pub async fn check_proxy(&self, endpoint: &ProxyEndpoint) -> ProbeOutcome {
        let start = Instant::now();

        let client = match self.build_client(endpoint) {
            Ok(client) => client,
            Err(e) => {
                return ProbeOutcome::failed(endpoint.clone(), ErrorKind::Config(e.to_string()))
            }
        };

        let url = self.test_url_for(endpoint.proxy_type);
        let outcome = match tokio::time::timeout(self.config.timeout, client.get(url).send()).await
        {
            Ok(Ok(response)) if response.status() == StatusCode::OK => {
                ProbeOutcome::working(endpoint.clone(), start.elapsed())
            }
            Ok(Ok(response)) => ProbeOutcome::failed(
                endpoint.clone(),
                ErrorKind::Protocol(format!("unexpected status {}", response.status())),
            ),
            Ok(Err(e)) => ProbeOutcome::failed(endpoint.clone(), ErrorKind::from(e)),
            Err(_) => ProbeOutcome::failed(endpoint.clone(), ErrorKind::Timeout),
        };

        log::debug!("{}", outcome.summary());
        outcome
    }

    /// Probe endpoints concurrently and collect the completed batch
    ///
    /// Outcomes are in completion order, one per input endpoint.
    pub async fn check_proxies(&self, endpoints: Vec<ProxyEndpoint>) -> Vec<ProbeOutcome> {
        let checker = self.clone();
        dispatch_all(endpoints, self.config.concurrency, move |endpoint| {
            let checker = checker.clone();
            async move { checker.check_proxy(&endpoint).await }
        })
        .await
    }

    /// Probe endpoints concurrently, delivering each outcome as it completes
    ///
    /// The channel closes once every endpoint has been probed, so consumers
    /// can treat disconnection as batch completion.
    pub fn check_proxies_stream(
        &self,
        endpoints: Vec<ProxyEndpoint>,
    ) -> mpsc::UnboundedReceiver<ProbeOutcome> {
        let checker = self.clone();
        dispatch_stream(endpoints, self.config.concurrency, move |endpoint| {
            let checker = checker.clone();
            async move { checker.check_proxy(&endpoint).await }
        })
    }

    /// Probe endpoints and separate outcomes into working and failed
    pub async fn check_and_separate(
        &self,
        endpoints: Vec<ProxyEndpoint>,
    ) -> (Vec<ProbeOutcome>, Vec<ProbeOutcome>) {
        let outcomes = self.check_proxies(endpoints).await;

        outcomes.into_iter().partition(|o| o.is_working())
    }

    /// Build a reqwest client routed through the endpoint
    ///
    /// Proxy routing is always a per-client setting, including SOCKS, so
    /// concurrent probes never share proxy configuration.
    fn build_client(&self, endpoint: &ProxyEndpoint) -> reqwest::Result<Client> {
        let proxy = ReqwestProxy::all(endpoint.url())?;

        Client::builder()
            .proxy(proxy)
            .timeout(self.config.timeout)
            .build()
    }

    /// Echo URL for a proxy type: https scheme for https proxies, plain otherwise
    fn test_url_for(&self, proxy_type: ProxyType) -> String {
        if proxy_type == ProxyType::Https && self.config.test_url.starts_with("http://") {
            self.config.test_url.replacen("http://", "https://", 1)
        } else {
            self.config.test_url.clone()
        }
    }
}

impl Default for ProxyChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Run probes with at most `concurrency` in flight, collecting every outcome
///
/// Generic over the probe function so the dispatch policy can be exercised
/// without network I/O.
async fn dispatch_all<F, Fut>(
    endpoints: Vec<ProxyEndpoint>,
    concurrency: usize,
    probe: F,
) -> Vec<ProbeOutcome>
where
    F: Fn(ProxyEndpoint) -> Fut,
    Fut: Future<Output = ProbeOutcome>,
{
    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    stream::iter(endpoints)
        .map(|endpoint| {
            let sem = Arc::clone(&semaphore);
            let fut = probe(endpoint);
            async move {
                // Semaphore acquire only fails if the semaphore is closed,
                // which won't happen here since we own the Arc and keep it
                // alive for the duration of the batch.
                let _permit = sem.acquire().await.expect("Semaphore closed unexpectedly");
                fut.await
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await
}

/// Run probes with at most `concurrency` in flight, pushing each outcome as
/// it completes
///
/// A dropped receiver stops delivery; in-flight probes still run to
/// completion.
fn dispatch_stream<F, Fut>(
    endpoints: Vec<ProxyEndpoint>,
    concurrency: usize,
    probe: F,
) -> mpsc::UnboundedReceiver<ProbeOutcome>
where
    F: Fn(ProxyEndpoint) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProbeOutcome> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let concurrency = concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(concurrency));

        let mut outcomes = stream::iter(endpoints)
            .map(|endpoint| {
                let sem = Arc::clone(&semaphore);
                let fut = probe(endpoint);
                async move {
                    let _permit = sem.acquire().await.expect("Semaphore closed unexpectedly");
                    fut.await
                }
            })
            .buffer_unordered(concurrency);

        while let Some(outcome) = outcomes.next().await {
            if tx.send(outcome).is_err() {
                break;
            }
        }
    });

    rx
}
