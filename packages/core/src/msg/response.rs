// Классификация ответа

use crate::control::MslChannel;
use crate::msg::ErrorHeader;
use crate::utils::error::Result;
use tokio::io::AsyncReadExt;

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Complete application payload
    Payload(Vec<u8>),
    /// The remote answered with an error header instead of a payload
    ProtocolError(ErrorHeader),
    /// The service produced no channel (e.g. it was cancelled)
    NoChannel,
}

impl Response {
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Response::Payload(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn error_header(&self) -> Option<&ErrorHeader> {
        match self {
            Response::ProtocolError(header) => Some(header),
            _ => None,
        }
    }

    pub fn is_no_channel(&self) -> bool {
        matches!(self, Response::NoChannel)
    }
}

/// Turn the result of a request into a [`Response`].
///
/// The payload stream is drained exactly once and only when no error header
/// is present. I/O errors while draining propagate.
pub async fn classify(channel: Option<MslChannel>) -> Result<Response> {
    let Some(mut channel) = channel else {
        return Ok(Response::NoChannel);
    };

    if let Some(header) = channel.input.take_error_header() {
        tracing::debug!(
            target: "msl::client",
            error_code = %header.error_code,
            message_id = header.message_id,
            "Remote returned error header"
        );
        return Ok(Response::ProtocolError(header));
    }

    let mut payload = Vec::new();
    channel.input.read_to_end(&mut payload).await?;
    Ok(Response::Payload(payload))
}
