//! Negotiation service seam
//!
//! The client hands a [`MessageContext`] to an [`MslControl`] and gets back a
//! [`PendingChannel`] immediately. The channel resolves once the remote
//! answered, the request timed out, or it was aborted.
//!
//! ## Результат
//! - `Ok(Some(channel))`: the remote answered with a payload or an error header
//! - `Ok(None)`: the service was cancelled or produced nothing
//! - `Err(_)`: transport, protocol or timeout failure, passed through as is

use crate::context::ClientMslContext;
use crate::msg::{ErrorHeader, MessageContext};
use crate::utils::error::{MslError, Result};
use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Negotiation service used by the client.
pub trait MslControl: Send + Sync {
    /// Submit a request. Must not block; the work runs on the returned
    /// channel's task.
    ///
    /// # Errors
    ///
    /// `IllegalState` if the request cannot be scheduled, e.g. outside a
    /// tokio runtime.
    fn request(
        &self,
        ctx: Arc<ClientMslContext>,
        msg_ctx: MessageContext,
        remote: &str,
        timeout: Duration,
    ) -> Result<PendingChannel>;
}

/// Response stream of one request.
pub struct MessageInputStream {
    error_header: Option<ErrorHeader>,
    payload: Box<dyn AsyncRead + Send + Unpin>,
}

impl MessageInputStream {
    pub fn new(payload: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            error_header: None,
            payload: Box::new(payload),
        }
    }

    pub fn from_parts(
        error_header: Option<ErrorHeader>,
        payload: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        Self {
            error_header,
            payload: Box::new(payload),
        }
    }

    /// Stream carrying an error header and no payload.
    pub fn with_error_header(header: ErrorHeader) -> Self {
        Self {
            error_header: Some(header),
            payload: Box::new(tokio::io::empty()),
        }
    }

    pub fn error_header(&self) -> Option<&ErrorHeader> {
        self.error_header.as_ref()
    }

    pub fn take_error_header(&mut self) -> Option<ErrorHeader> {
        self.error_header.take()
    }
}

impl AsyncRead for MessageInputStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.payload).poll_read(cx, buf)
    }
}

impl fmt::Debug for MessageInputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageInputStream")
            .field("error_header", &self.error_header)
            .finish_non_exhaustive()
    }
}

/// Established channel to the remote entity.
#[derive(Debug)]
pub struct MslChannel {
    pub input: MessageInputStream,
}

impl MslChannel {
    pub fn new(input: MessageInputStream) -> Self {
        Self { input }
    }
}

/// Handle to an in-flight request running on a tokio task.
pub struct PendingChannel {
    handle: JoinHandle<Result<Option<MslChannel>>>,
}

impl PendingChannel {
    /// Run `fut` on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// `IllegalState` when called outside a tokio runtime.
    pub fn spawn<F>(fut: F) -> Result<Self>
    where
        F: Future<Output = Result<Option<MslChannel>>> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|e| {
            MslError::IllegalState(format!("No tokio runtime to run the request on: {}", e))
        })?;
        Ok(Self {
            handle: runtime.spawn(fut),
        })
    }

    /// Run `fut`, failing with `MslError::Timeout` once `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Same as [`spawn`](Self::spawn).
    pub fn spawn_with_timeout<F>(fut: F, timeout: Duration) -> Result<Self>
    where
        F: Future<Output = Result<Option<MslChannel>>> + Send + 'static,
    {
        Self::spawn(async move {
            match tokio::time::timeout(timeout, fut).await {
                Ok(result) => result,
                Err(_) => Err(MslError::Timeout(timeout_millis(timeout))),
            }
        })
    }

    /// Cancel the request. Awaiting afterwards yields `Interrupted`.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn timeout_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

impl Future for PendingChannel {
    type Output = Result<Option<MslChannel>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) if e.is_cancelled() => Poll::Ready(Err(MslError::Interrupted(
                "Request was cancelled".to_string(),
            ))),
            Poll::Ready(Err(e)) => Poll::Ready(Err(MslError::TransportFailure(format!(
                "Request task failed: {}",
                e
            )))),
        }
    }
}

impl fmt::Debug for PendingChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingChannel")
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::ResponseCode;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_input_stream_reads_payload() {
        let mut input = MessageInputStream::new(&b"abc"[..]);
        assert!(input.error_header().is_none());

        let mut buf = Vec::new();
        input.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"abc");
    }

    #[tokio::test]
    async fn test_input_stream_error_header() {
        let header = ErrorHeader::new(1, ResponseCode::Fail);
        let mut input = MessageInputStream::with_error_header(header);
        assert_eq!(
            input.error_header().map(|h| h.error_code),
            Some(ResponseCode::Fail)
        );

        let mut buf = Vec::new();
        assert_eq!(input.read_to_end(&mut buf).await.unwrap(), 0);
        assert!(input.take_error_header().is_some());
        assert!(input.error_header().is_none());
    }

    #[tokio::test]
    async fn test_pending_channel_resolves() {
        let pending = PendingChannel::spawn(async { Ok::<_, MslError>(None) }).unwrap();
        assert!(pending.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pending_channel_passes_errors_through() {
        let pending = PendingChannel::spawn(async {
            Err::<Option<MslChannel>, _>(MslError::Protocol("entity revoked".to_string()))
        })
        .unwrap();
        assert!(matches!(pending.await, Err(MslError::Protocol(m)) if m == "entity revoked"));
    }

    #[tokio::test]
    async fn test_pending_channel_timeout() {
        let pending = PendingChannel::spawn_with_timeout(
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, MslError>(None)
            },
            Duration::from_millis(10),
        )
        .unwrap();
        assert!(matches!(pending.await, Err(MslError::Timeout(10))));
    }

    #[tokio::test]
    async fn test_pending_channel_abort() {
        let pending = PendingChannel::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, MslError>(None)
        })
        .unwrap();
        pending.abort();
        assert!(matches!(pending.await, Err(MslError::Interrupted(_))));
    }

    #[tokio::test]
    async fn test_pending_channel_panic() {
        let pending = PendingChannel::spawn(async {
            let broken = true;
            if broken {
                panic!("transport exploded");
            }
            Ok::<_, MslError>(None)
        })
        .unwrap();
        assert!(matches!(pending.await, Err(MslError::TransportFailure(_))));
    }

    #[test]
    fn test_spawn_outside_runtime() {
        let result = PendingChannel::spawn(async { Ok::<_, MslError>(None) });
        assert!(matches!(result, Err(MslError::IllegalState(_))));

        let result = PendingChannel::spawn_with_timeout(
            async { Ok::<_, MslError>(None) },
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(MslError::IllegalState(_))));
    }

    #[test]
    fn test_timeout_millis_saturates() {
        assert_eq!(timeout_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(timeout_millis(Duration::MAX), u64::MAX);
    }
}
