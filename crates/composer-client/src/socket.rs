//! Progress stream transport
//!
//! Best-effort: if the socket cannot connect the workflow keeps running on
//! HTTP responses alone.

use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use composer_core::{ComposerResult, ProgressChannel};

use crate::config::ClientConfig;

/// Background task forwarding progress frames into a [`ProgressChannel`]
#[derive(Debug)]
pub struct ProgressSocket {
    url: Url,
    handle: JoinHandle<()>,
}

impl ProgressSocket {
    /// Connect to the backend's progress stream in the background
    pub fn spawn(config: &ClientConfig, channel: ProgressChannel) -> ComposerResult<Self> {
        let url = config.progress_url()?;
        Ok(Self::spawn_at(url, channel))
    }

    pub fn spawn_at(url: Url, channel: ProgressChannel) -> Self {
        let task_url = url.clone();
        let handle = tokio::spawn(async move {
            run(task_url, channel).await;
        });
        Self { url, handle }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether the socket task has ended (connection failed or closed)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the socket task to end
    pub async fn join(&mut self) {
        if let Err(e) = (&mut self.handle).await {
            if !e.is_cancelled() {
                warn!("Progress socket task panicked: {}", e);
            }
        }
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ProgressSocket {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Read frames until the stream closes and dispatch each text frame
async fn run(url: Url, channel: ProgressChannel) {
    let (mut stream, _) = match connect_async(url.as_str()).await {
        Ok(connected) => connected,
        Err(e) => {
            warn!(%url, "Progress socket connection failed, continuing without live progress: {}", e);
            return;
        }
    };
    info!(%url, "Progress socket connected");

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => {
                channel.dispatch_frame(&text);
            }
            Ok(Message::Close(frame)) => {
                debug!("Progress socket closed: {:?}", frame);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Progress socket error: {}", e);
                break;
            }
        }
    }
}
