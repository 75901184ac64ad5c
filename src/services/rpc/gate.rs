use super::channel::{ChannelError, SharedChannel};
use crate::fs::VfsError;
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Performs the one-time connect step that yields a request channel
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish the connection (and any handshake) to the index server
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached or the handshake fails.
    async fn connect(&self) -> Result<SharedChannel, ChannelError>;
}

/// Lifecycle of a readiness gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Uninitialized,
    Pending,
    Ready,
    Failed,
}

type Outcome = Option<Result<SharedChannel, ChannelError>>;

/// Memoized connection readiness
///
/// The first call to [`ReadinessGate::ready`] starts the connector on its own
/// task; every caller, concurrent or later, waits on and then observes that
/// same outcome. Dropping a waiting caller does not cancel the connect.
/// Once resolved the outcome never changes: a failed connect is permanent for
/// the gate.
pub struct ReadinessGate {
    connector: Arc<dyn Connector>,
    outcome: Arc<watch::Sender<Outcome>>,
    started: AtomicBool,
}

impl fmt::Debug for ReadinessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessGate")
            .field("connector", &"<dyn Connector>")
            .field("state", &self.state())
            .finish()
    }
}

impl ReadinessGate {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            connector,
            outcome: Arc::new(outcome),
            started: AtomicBool::new(false),
        }
    }

    /// Wait until the channel is available and return it.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn ready(&self) -> Result<SharedChannel, VfsError> {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.spawn_connect();
        }

        let mut outcome = self.outcome.subscribe();
        let resolved = outcome.wait_for(Option::is_some).await.map_err(|_| {
            VfsError::ConnectionUnavailable("connect task ended without a result".to_string())
        })?;

        match &*resolved {
            Some(Ok(channel)) => Ok(Arc::clone(channel)),
            Some(Err(err)) => Err(VfsError::ConnectionUnavailable(err.to_string())),
            None => Err(VfsError::ConnectionUnavailable(
                "connect task ended without a result".to_string(),
            )),
        }
    }

    pub fn state(&self) -> GateState {
        match &*self.outcome.borrow() {
            Some(Ok(_)) => GateState::Ready,
            Some(Err(_)) => GateState::Failed,
            None if self.started.load(Ordering::SeqCst) => GateState::Pending,
            None => GateState::Uninitialized,
        }
    }

    fn spawn_connect(&self) {
        let connector = Arc::clone(&self.connector);
        let outcome = Arc::clone(&self.outcome);

        tokio::spawn(async move {
            tracing::debug!("Connecting to index server");
            // Inner task so a panicking connector still resolves the gate
            let result = match tokio::spawn(async move { connector.connect().await }).await {
                Ok(result) => result,
                Err(e) => Err(ChannelError::Io(format!("connect task failed: {e}"))),
            };
            match &result {
                Ok(_) => tracing::info!("Index server connection ready"),
                Err(e) => tracing::warn!("Index server connection failed: {}", e),
            }
            outcome.send_replace(Some(result));
        });
    }
}

/// Connector for a channel that is already established
#[derive(Clone)]
pub struct ReadyConnector {
    channel: SharedChannel,
}

impl ReadyConnector {
    pub fn new(channel: SharedChannel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl Connector for ReadyConnector {
    async fn connect(&self) -> Result<SharedChannel, ChannelError> {
        Ok(Arc::clone(&self.channel))
    }
}
