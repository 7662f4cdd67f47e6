use thiserror::Error;

/// Failures of the connection layer. These never escape to callers of
/// `start`/`send`; they are absorbed by the controller and reported
/// through the registered subscribers.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect: {reason}")]
    ConnectFailed { reason: String },

    #[error("connection closed")]
    ConnectionClosed,

    #[error("not connected")]
    NotConnected,
}
