//! Index server RPC layer
//!
//! - `channel`: the [`RequestChannel`] capability and its error type
//! - `gate`: one-time, memoized connection readiness
//! - `uri`: host URI <-> wire string translation
//! - `requests`: typed `statFile` / `readFile` / `readDirectory` dispatch
//! - `transport`: JSON-RPC over `Content-Length` framed byte streams
//! - `connector`: TCP connect plus LSP initialization
//! - `metered`: request counting decorator

pub mod channel;
pub mod connector;
pub mod gate;
pub mod metered;
pub mod requests;
pub mod transport;
pub mod uri;

pub use channel::{ChannelError, RequestChannel, SharedChannel};
pub use connector::TcpConnector;
pub use gate::{Connector, GateState, ReadinessGate, ReadyConnector};
pub use metered::{ChannelMetrics, MeteredChannel};
pub use requests::Dispatcher;
pub use transport::JsonRpcChannel;
pub use uri::{RemoteUri, LSIF_SCHEME};
