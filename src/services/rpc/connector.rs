use super::channel::{ChannelError, RequestChannel, SharedChannel};
use super::gate::Connector;
use super::transport::JsonRpcChannel;
use crate::config::ServerConfig;
use async_trait::async_trait;
use lsp_types::notification::{Initialized, Notification};
use lsp_types::request::{Initialize, Request};
use lsp_types::{ClientInfo, InitializeParams, InitializeResult, InitializedParams};
use std::sync::Arc;

/// Connects to the index server over TCP
///
/// The index server is an LSP server, so unless disabled the connector
/// performs the `initialize` / `initialized` exchange before handing out the
/// channel.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    config: ServerConfig,
}

impl TcpConnector {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> Result<SharedChannel, ChannelError> {
        let channel = JsonRpcChannel::connect(&self.config.address).await?;
        if self.config.handshake {
            handshake(&channel, &self.config.client_name).await?;
        }
        Ok(Arc::new(channel))
    }
}

/// Perform the LSP initialization exchange on a fresh channel.
pub async fn handshake(
    channel: &dyn RequestChannel,
    client_name: &str,
) -> Result<InitializeResult, ChannelError> {
    let params = InitializeParams {
        process_id: Some(std::process::id()),
        client_info: Some(ClientInfo {
            name: client_name.to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
        ..Default::default()
    };

    let response = channel
        .send_request(Initialize::METHOD, serde_json::to_value(params)?)
        .await?;
    let result: InitializeResult = serde_json::from_value(response)?;
    if let Some(info) = &result.server_info {
        tracing::info!(
            "Initialized with {} {}",
            info.name,
            info.version.as_deref().unwrap_or("")
        );
    }

    channel
        .send_notification(Initialized::METHOD, serde_json::to_value(InitializedParams {})?)
        .await?;

    Ok(result)
}
