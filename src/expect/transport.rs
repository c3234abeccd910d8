//! Byte transport consumed by the expecter

use crate::error::Result;

/// Bidirectional byte stream behind an interactive session.
///
/// `recv` yields `Ok(None)` once the remote side has closed; after that
/// the transport is not polled again.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Write raw bytes to the remote side
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Wait for the next chunk of output
    async fn recv(&mut self) -> Result<Option<Vec<u8>>>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        (**self).send(data).await
    }

    async fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        (**self).recv().await
    }
}
