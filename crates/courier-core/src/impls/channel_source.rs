//! Channel-backed inbound source.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{GatewayError, RawMessage};
use crate::ports::InboundSource;

/// Producer side: clone it freely and push raw messages in.
///
/// Dropping every handle signals end-of-stream to the gateway, which then
/// drains and stops. That is the natural way to end a demo or test run.
#[derive(Clone)]
pub struct SourceHandle {
    tx: mpsc::Sender<RawMessage>,
}

impl SourceHandle {
    pub async fn push(&self, raw: RawMessage) -> Result<(), GatewayError> {
        self.tx
            .send(raw)
            .await
            .map_err(|_| GatewayError::SourceClosed)
    }
}

/// Consumer side handed to [`Gateway::run`].
///
/// [`Gateway::run`]: crate::app::Gateway::run
pub struct ChannelSource {
    rx: mpsc::Receiver<RawMessage>,
}

/// Build a connected handle/source pair with the given buffer capacity.
pub fn channel_source(capacity: usize) -> (SourceHandle, ChannelSource) {
    let (tx, rx) = mpsc::channel(capacity);
    (SourceHandle { tx }, ChannelSource { rx })
}

#[async_trait]
impl InboundSource for ChannelSource {
    async fn next(&mut self) -> Option<RawMessage> {
        self.rx.recv().await
    }
}
