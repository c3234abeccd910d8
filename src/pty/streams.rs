//! PTY Streams
//!
//! Provides an async transport over PTY I/O by bridging blocking
//! PTY master reads/writes to async code using channels.

use crate::error::{Error, Result};
use crate::expect::Transport;
use portable_pty::{Child, ChildKiller};
use std::sync::mpsc::Sender as StdSender;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

/// PTY I/O streams wrapper
pub struct PtyStreams {
    /// Receiver for output bytes from the PTY (stdout/stderr)
    output_rx: UnboundedReceiver<Vec<u8>>,
    /// Sender for input bytes to the PTY (stdin)
    input_tx: StdSender<Vec<u8>>,
    /// Spawned client, killed on drop if still alive
    child: Option<Box<dyn Child + Send + Sync>>,
    stats: StreamStats,
}

impl PtyStreams {
    /// Create new PTY streams from channels
    pub fn from_channels(
        output_rx: UnboundedReceiver<Vec<u8>>,
        input_tx: StdSender<Vec<u8>>,
    ) -> Self {
        Self {
            output_rx,
            input_tx,
            child: None,
            stats: StreamStats::default(),
        }
    }

    /// Attach the child process so it is reaped together with the streams
    pub fn with_child(mut self, child: Box<dyn Child + Send + Sync>) -> Self {
        self.child = Some(child);
        self
    }

    /// OS process id of the attached client, if any
    pub fn process_id(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.process_id())
    }

    /// Transfer statistics so far
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }
}

#[async_trait::async_trait]
impl Transport for PtyStreams {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.input_tx
            .send(data.to_vec())
            .map_err(|e| Error::transport(format!("PTY writer gone: {}", e)))?;
        self.stats.bytes_written += data.len() as u64;
        self.stats.write_operations += 1;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        let chunk = self.output_rx.recv().await;
        if let Some(bytes) = &chunk {
            self.stats.bytes_read += bytes.len() as u64;
            self.stats.read_operations += 1;
        }
        Ok(chunk)
    }
}

impl Drop for PtyStreams {
    fn drop(&mut self) {
        debug!(
            "PTY streams closing ({} bytes read, {} bytes written)",
            self.stats.bytes_read, self.stats.bytes_written
        );
        if let Some(child) = self.child.as_mut() {
            if let Ok(None) = child.try_wait() {
                if let Err(e) = child.kill() {
                    warn!("Failed to kill PTY client: {}", e);
                }
            }
        }
    }
}

/// Stream statistics for monitoring
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    /// Total bytes read
    pub bytes_read: u64,
    /// Total bytes written
    pub bytes_written: u64,
    /// Number of read operations
    pub read_operations: u64,
    /// Number of write operations
    pub write_operations: u64,
}
