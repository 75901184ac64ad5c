//! Metered request channel
//!
//! Wraps any [`RequestChannel`] and records how many requests and
//! notifications go through it, per method. An optional delay can be added to
//! every request to simulate a slow index server. Tests use it to assert that
//! an operation did or did not reach the wire.

use super::channel::{ChannelError, RequestChannel, SharedChannel};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Counters for traffic through a [`MeteredChannel`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMetrics {
    /// Number of requests per method
    pub requests: HashMap<String, usize>,
    /// Number of notifications sent
    pub notifications: usize,
    /// Number of requests that resolved with an error
    pub failures: usize,
    /// Total time spent in artificial delays
    pub total_delay_time: Duration,
}

impl ChannelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Requests sent for one method
    pub fn calls(&self, method: &str) -> usize {
        self.requests.get(method).copied().unwrap_or(0)
    }

    /// Total number of requests across all methods
    pub fn total_requests(&self) -> usize {
        self.requests.values().sum()
    }
}

pub struct MeteredChannel {
    inner: SharedChannel,
    delay: Duration,
    metrics: Arc<Mutex<ChannelMetrics>>,
}

impl MeteredChannel {
    pub fn new(inner: SharedChannel) -> Self {
        Self::with_delay(inner, Duration::ZERO)
    }

    pub fn with_delay(inner: SharedChannel, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            metrics: Arc::new(Mutex::new(ChannelMetrics::new())),
        }
    }

    /// Snapshot of the current counters
    pub async fn metrics(&self) -> ChannelMetrics {
        self.metrics.lock().await.clone()
    }

    pub async fn reset_metrics(&self) {
        self.metrics.lock().await.reset();
    }

    async fn add_delay(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
            self.metrics.lock().await.total_delay_time += self.delay;
        }
    }
}

#[async_trait]
impl RequestChannel for MeteredChannel {
    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ChannelError> {
        *self
            .metrics
            .lock()
            .await
            .requests
            .entry(method.to_string())
            .or_insert(0) += 1;
        self.add_delay().await;

        let result = self.inner.send_request(method, params).await;
        if result.is_err() {
            self.metrics.lock().await.failures += 1;
        }
        result
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), ChannelError> {
        self.metrics.lock().await.notifications += 1;
        self.inner.send_notification(method, params).await
    }
}
