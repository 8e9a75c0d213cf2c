//! VLM client error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to VLC.
///
/// After any of these the remote side may have executed the last command
/// fully, partially or not at all. The session that produced the error must
/// not be used again; the client drops it and requires a fresh `connect`.
#[derive(Debug, Error)]
pub enum VlmError {
  #[error("Connection error: {0}")]
  Connection(#[from] std::io::Error),

  #[error("No response from VLC within {0:?}")]
  Timeout(Duration),

  #[error("Operation cancelled")]
  Cancelled,

  #[error("Not connected")]
  NotConnected,

  #[error("Invalid config: {0}")]
  InvalidConfig(String),
}

impl VlmError {
  /// Connection error for a stream closed by VLC.
  pub(crate) fn closed() -> Self {
    VlmError::Connection(std::io::Error::new(
      std::io::ErrorKind::UnexpectedEof,
      "connection closed by VLC",
    ))
  }
}
