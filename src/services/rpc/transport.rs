//! JSON-RPC request channel over a byte stream
//!
//! Messages use the LSP base-protocol framing: a `Content-Length` header,
//! a blank line, then the JSON body. One background task reads responses and
//! routes them to the waiting caller by request id.

use super::channel::{ChannelError, RequestChannel};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

/// JSON-RPC error code for unsupported server-to-client requests
const METHOD_NOT_FOUND: i64 = -32601;

/// Largest message body accepted from the server
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Type alias for the map of requests waiting on a response
type PendingRequests = Arc<StdMutex<PendingMap>>;

type PendingMap = HashMap<i64, oneshot::Sender<Result<Value, ChannelError>>>;

fn lock_pending(pending: &PendingRequests) -> MutexGuard<'_, PendingMap> {
    // The map stays consistent even if a holder panicked
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Removes a request from the pending map if its caller goes away first
struct PendingEntry<'a> {
    pending: &'a PendingRequests,
    id: i64,
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        lock_pending(self.pending).remove(&self.id);
    }
}

/// Read one framed message. Returns `Ok(None)` on a clean end of stream.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<Value>, ChannelError>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            if saw_header {
                return Err(ChannelError::Protocol(
                    "unexpected end of stream in headers".to_string(),
                ));
            }
            return Ok(None);
        }

        let header = line.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            if saw_header {
                break;
            }
            // Tolerate stray blank lines between messages
            continue;
        }
        saw_header = true;

        if let Some((name, value)) = header.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                let length = value.trim().parse::<usize>().map_err(|e| {
                    ChannelError::Protocol(format!("invalid Content-Length '{}': {e}", value.trim()))
                })?;
                content_length = Some(length);
            }
        }
    }

    let length = content_length
        .ok_or_else(|| ChannelError::Protocol("missing Content-Length header".to_string()))?;
    if length > MAX_MESSAGE_SIZE {
        return Err(ChannelError::Protocol(format!(
            "message of {length} bytes exceeds the {MAX_MESSAGE_SIZE} byte limit"
        )));
    }

    let mut body = Vec::with_capacity(length);
    (&mut *reader).take(length as u64).read_to_end(&mut body).await?;
    if body.len() < length {
        return Err(ChannelError::Protocol(format!(
            "unexpected end of stream after {} of {length} body bytes",
            body.len()
        )));
    }

    Ok(Some(serde_json::from_slice(&body)?))
}

/// Write one framed message and flush it.
pub async fn write_message<W>(writer: &mut W, message: &Value) -> Result<(), ChannelError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let body = serde_json::to_vec(message)?;
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Request channel speaking JSON-RPC 2.0 over any async byte stream
pub struct JsonRpcChannel {
    writer: Arc<Mutex<BoxedWriter>>,
    next_id: AtomicI64,
    pending: PendingRequests,
    closed: Arc<AtomicBool>,
    reader_task: JoinHandle<()>,
}

impl fmt::Debug for JsonRpcChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpcChannel")
            .field("next_id", &self.next_id.load(Ordering::SeqCst))
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

impl JsonRpcChannel {
    /// Start a channel over the given read and write halves.
    ///
    /// Must be called from within a tokio runtime: the reader runs as a
    /// spawned task for the lifetime of the channel.
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let writer: Arc<Mutex<BoxedWriter>> = Arc::new(Mutex::new(Box::new(writer)));
        let pending: PendingRequests = Arc::new(StdMutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let reader_task = tokio::spawn(read_loop(
            BufReader::new(reader),
            Arc::clone(&writer),
            Arc::clone(&pending),
            Arc::clone(&closed),
        ));

        Self {
            writer,
            next_id: AtomicI64::new(1),
            pending,
            closed,
            reader_task,
        }
    }

    /// Open a TCP connection to `address` and start a channel on it.
    pub async fn connect(address: &str) -> Result<Self, ChannelError> {
        tracing::debug!("Opening TCP connection to {}", address);
        let stream = TcpStream::connect(address).await?;
        stream.set_nodelay(true)?;
        let (read, write) = stream.into_split();
        Ok(Self::new(read, write))
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for JsonRpcChannel {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

#[async_trait]
impl RequestChannel for JsonRpcChannel {
    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ChannelError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();

        {
            // Checked under the lock so a closing reader cannot miss this entry
            let mut pending = lock_pending(&self.pending);
            if self.closed.load(Ordering::SeqCst) {
                return Err(ChannelError::Closed);
            }
            pending.insert(id, tx);
        }
        let _entry = PendingEntry {
            pending: &self.pending,
            id,
        };

        let message = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        tracing::trace!("-> request {} {}", id, method);

        {
            let mut writer = self.writer.lock().await;
            write_message(&mut *writer, &message).await?;
        }

        rx.await.unwrap_or(Err(ChannelError::Closed))
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), ChannelError> {
        if self.is_closed() {
            return Err(ChannelError::Closed);
        }
        let message = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        tracing::trace!("-> notification {}", method);
        let mut writer = self.writer.lock().await;
        write_message(&mut *writer, &message).await
    }
}

async fn read_loop<R>(
    mut reader: BufReader<R>,
    writer: Arc<Mutex<BoxedWriter>>,
    pending: PendingRequests,
    closed: Arc<AtomicBool>,
) where
    R: AsyncRead + Unpin,
{
    loop {
        match read_message(&mut reader).await {
            Ok(Some(message)) => dispatch_incoming(message, &writer, &pending).await,
            Ok(None) => {
                tracing::debug!("Index server closed the connection");
                break;
            }
            Err(e) => {
                tracing::warn!("Failed to read from index server: {}", e);
                break;
            }
        }
    }

    let mut pending = lock_pending(&pending);
    closed.store(true, Ordering::SeqCst);
    for (_, sender) in pending.drain() {
        let _ = sender.send(Err(ChannelError::Closed));
    }
}

async fn dispatch_incoming(
    message: Value,
    writer: &Arc<Mutex<BoxedWriter>>,
    pending: &PendingRequests,
) {
    let method = message.get("method").and_then(Value::as_str);
    let id = message.get("id").cloned();

    match (method, id) {
        // Response to one of our requests
        (None, Some(id)) => {
            let Some(id) = id.as_i64() else {
                tracing::warn!("Ignoring response with non-integer id {}", id);
                return;
            };
            let Some(sender) = lock_pending(pending).remove(&id) else {
                tracing::warn!("Ignoring response to unknown request {}", id);
                return;
            };
            tracing::trace!("<- response {}", id);
            let _ = sender.send(response_outcome(&message));
        }
        // Server-to-client request: nothing here is supported
        (Some(method), Some(id)) => {
            tracing::debug!("Rejecting server request {}", method);
            let reply = json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {
                    "code": METHOD_NOT_FOUND,
                    "message": format!("Method not found: {method}"),
                },
            });
            let mut writer = writer.lock().await;
            if let Err(e) = write_message(&mut *writer, &reply).await {
                tracing::warn!("Failed to reject server request {}: {}", method, e);
            }
        }
        (Some(method), None) => {
            tracing::debug!("Ignoring notification {}", method);
        }
        (None, None) => {
            tracing::warn!("Ignoring malformed message: {}", message);
        }
    }
}

fn response_outcome(message: &Value) -> Result<Value, ChannelError> {
    if let Some(error) = message.get("error") {
        return Err(ChannelError::Rpc {
            code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }
    Ok(message.get("result").cloned().unwrap_or(Value::Null))
}
