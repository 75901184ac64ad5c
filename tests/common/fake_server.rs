// Fake index server speaking Content-Length framed JSON-RPC over TCP

use super::mock_index::MockIndex;
use async_trait::async_trait;
use lsif_fs::services::rpc::transport::{read_message, write_message};
use lsif_fs::services::rpc::{ChannelError, RequestChannel};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Channel whose connection is already gone
pub struct ClosedChannel;

#[async_trait]
impl RequestChannel for ClosedChannel {
    async fn send_request(&self, _method: &str, _params: Value) -> Result<Value, ChannelError> {
        Err(ChannelError::Closed)
    }

    async fn send_notification(&self, _method: &str, _params: Value) -> Result<(), ChannelError> {
        Err(ChannelError::Closed)
    }
}

/// Serves one client connection from a [`MockIndex`]
///
/// Answers `initialize` like an LSP server and records every method it
/// receives, requests and notifications alike, in arrival order.
pub struct FakeIndexServer {
    pub address: String,
    received: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl FakeIndexServer {
    pub async fn spawn(index: MockIndex) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&received);
        let task = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            let mut read = BufReader::new(read);

            while let Ok(Some(message)) = read_message(&mut read).await {
                let method = message["method"].as_str().unwrap_or_default().to_string();
                log.lock().unwrap().push(method.clone());

                let Some(id) = message.get("id").cloned() else {
                    continue;
                };
                let reply = match method.as_str() {
                    "initialize" => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "result": {
                            "capabilities": {},
                            "serverInfo": {"name": "fake-index", "version": "0.0.1"}
                        }
                    }),
                    _ => match index.send_request(&method, message["params"].clone()).await {
                        Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
                        Err(ChannelError::Rpc { code, message }) => json!({
                            "jsonrpc": "2.0",
                            "id": id,
                            "error": {"code": code, "message": message}
                        }),
                        Err(e) => panic!("mock index failed: {e}"),
                    },
                };
                if write_message(&mut write, &reply).await.is_err() {
                    break;
                }
            }
        });

        Self {
            address,
            received,
            task,
        }
    }

    /// Methods received so far, in order
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

impl Drop for FakeIndexServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
