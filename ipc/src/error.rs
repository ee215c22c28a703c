//! Transport error types.

use quarry_hostapi::HostError;

/// Top-level error type for the transport crate.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Socket connect, read or write failed (including deadlines).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protobuf encoding failed.
    #[error("encode error: {0}")]
    Encode(#[from] prost::EncodeError),

    /// A frame or a value inside it does not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Frame length exceeds the configured limit.
    #[error("frame of {size} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge { size: usize, limit: usize },

    /// The peer answered with something other than the expected reply.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The value has no wire representation.
    #[error("value cannot be sent over the wire: {0}")]
    Unsupported(&'static str),
}

impl IpcError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

impl From<prost::DecodeError> for IpcError {
    fn from(err: prost::DecodeError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<IpcError> for HostError {
    fn from(err: IpcError) -> Self {
        HostError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_host_error() {
        let err = IpcError::FrameTooLarge { size: 10, limit: 4 };
        let host: HostError = err.into();
        assert_eq!(
            host,
            HostError::Transport("frame of 10 bytes exceeds limit of 4 bytes".into())
        );
    }

    #[test]
    fn test_io_conversion() {
        let err: IpcError = std::io::Error::new(std::io::ErrorKind::TimedOut, "deadline").into();
        assert!(matches!(err, IpcError::Io(_)));
        assert!(err.to_string().contains("deadline"));
    }
}
