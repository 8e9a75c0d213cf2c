//! VLM telnet session: login handshake and the send / wait-for-prompt loop.
//!
//! Every exchange with VLC follows the same shape: write one command line,
//! then read until a prompt shows up in the accumulated input. The bytes up to
//! and including the prompt are the response; anything after it stays in the
//! buffer for the next exchange.

use std::sync::LazyLock;
use std::time::Duration;

use regex::bytes::{Captures, Regex};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use super::command::VlmCommand;
use super::error::VlmError;
use super::telnet::TelnetFilter;

// Unicode is off in the prompt patterns: `.` must match any byte, including
// Latin-1 file names and escaped telnet IAC.

/// Banner text (if any) followed by the password prompt.
pub static PASSWORD_PROMPT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s-u)\A(.*?)(?:\A|\n)Password: ").expect("Invalid password prompt regex")
});

/// Command response (if any) followed by the command prompt.
pub static NORMAL_PROMPT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s-u)\A(.*?)(?:\A|\n)> ").expect("Invalid normal prompt regex")
});

/// Whichever prompt comes first; group 2 holds the marker that matched.
pub static ANY_PROMPT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s-u)\A(.*?)(?:\A|\n)(Password: |> )").expect("Invalid any prompt regex")
});

const PASSWORD_MARKER: &str = "Password: ";

pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// Login state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
  Disconnected,
  AwaitingPassword,
  Authenticated,
}

/// Text consumed by one successful `wait_for_pattern`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
  text: String,
  groups: Vec<Option<String>>,
}

impl PatternMatch {
  fn from_captures(captures: &Captures<'_>) -> Self {
    let lossy = |m: regex::bytes::Match<'_>| String::from_utf8_lossy(m.as_bytes()).into_owned();
    Self {
      text: captures.get(0).map(lossy).unwrap_or_default(),
      groups: captures.iter().skip(1).map(|m| m.map(lossy)).collect(),
    }
  }

  /// Full matched text.
  pub fn text(&self) -> &str {
    &self.text
  }

  /// Capture group `index`; group 0 is the full match.
  pub fn group(&self, index: usize) -> Option<&str> {
    match index {
      0 => Some(&self.text),
      n => self.groups.get(n - 1).and_then(|g| g.as_deref()),
    }
  }

  pub fn into_text(self) -> String {
    self.text
  }
}

/// Zeroes the wrapped secret when dropped, however the owning future ends.
pub(crate) struct Wipe<'a>(pub(crate) &'a mut [u8]);

impl Drop for Wipe<'_> {
  fn drop(&mut self) {
    self.0.fill(0);
  }
}

/// One connection to the VLC telnet interface.
///
/// Only one command may be in flight at a time: responses carry no request
/// id, so the `&mut self` receivers are what keeps exchanges from
/// interleaving.
pub struct Session<S> {
  stream: S,
  buffer: Vec<u8>,
  telnet: TelnetFilter,
  state: SessionState,
  read_timeout: Option<Duration>,
  read_chunk_size: usize,
  cancel: CancellationToken,
}

impl<S> Session<S>
where
  S: AsyncRead + AsyncWrite + Unpin,
{
  /// Wrap a freshly opened stream. The server is expected to greet with the
  /// password prompt.
  pub fn new(stream: S) -> Self {
    Self {
      stream,
      buffer: Vec::new(),
      telnet: TelnetFilter::new(),
      state: SessionState::AwaitingPassword,
      read_timeout: None,
      read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
      cancel: CancellationToken::new(),
    }
  }

  /// Give up on any single wait after `timeout`. `None` waits forever.
  pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.read_timeout = timeout;
    self
  }

  pub fn with_read_chunk_size(mut self, size: usize) -> Self {
    self.read_chunk_size = size.max(1);
    self
  }

  /// Abort pending waits when `token` is cancelled.
  pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
    self.cancel = token;
    self
  }

  pub fn state(&self) -> SessionState {
    self.state
  }

  /// Received bytes not consumed by any match yet.
  pub fn buffered(&self) -> &[u8] {
    &self.buffer
  }

  /// Run the login handshake: password prompt, secret, then any prompt.
  ///
  /// The secret is zeroed before this returns, on success and on failure,
  /// and also when the future is dropped before completing.
  pub async fn authenticate(&mut self, password: &mut [u8]) -> Result<(), VlmError> {
    let mut secret = Wipe(password);

    self.wait_for_pattern(&PASSWORD_PROMPT).await?;
    self.send_password(&mut *secret.0).await?;

    let reply = self.wait_for_pattern(&ANY_PROMPT).await?;
    if reply.group(2) == Some(PASSWORD_MARKER) {
      log::warn!("VLC asked for the password again, it was probably rejected");
    }

    self.state = SessionState::Authenticated;
    Ok(())
  }

  /// Write `command` followed by exactly one line terminator.
  pub async fn send_command(&mut self, command: &str) -> Result<(), VlmError> {
    let line = command.trim_end_matches(|c| c == '\r' || c == '\n');

    let mut data = Vec::with_capacity(line.len() + 1);
    data.extend_from_slice(line.as_bytes());
    data.push(b'\n');

    self.stream.write_all(&data).await?;
    self.stream.flush().await?;
    log::trace!("Sent VLM command: {}", line);
    Ok(())
  }

  /// Write the secret byte by byte, zeroing each byte as it leaves, then a
  /// line terminator.
  pub async fn send_password(&mut self, password: &mut [u8]) -> Result<(), VlmError> {
    let secret = Wipe(password);

    for byte in secret.0.iter_mut() {
      let value = std::mem::replace(byte, 0);
      self.stream.write_all(&[value]).await?;
    }
    self.stream.write_all(b"\n").await?;
    self.stream.flush().await?;

    log::trace!("Sent password ({} bytes)", secret.0.len());
    Ok(())
  }

  /// Read until `pattern` matches the accumulated input, then discard the
  /// input through the end of the match.
  ///
  /// The search covers the whole buffer, so a pattern starting with `\A.*?`
  /// absorbs everything received before its marker. A pattern that can match
  /// the empty string returns immediately without consuming anything.
  pub async fn wait_for_pattern(&mut self, pattern: &Regex) -> Result<PatternMatch, VlmError> {
    let cancel = self.cancel.clone();
    let read_timeout = self.read_timeout;

    let result = tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(VlmError::Cancelled),
      result = async {
        match read_timeout {
          Some(limit) => match tokio::time::timeout(limit, self.read_until(pattern)).await {
            Ok(result) => result,
            Err(_) => Err(VlmError::Timeout(limit)),
          },
          None => self.read_until(pattern).await,
        }
      } => result,
    };

    if let Ok(found) = &result {
      log::trace!(
        "Received VLM response:\n----------------\n{}\n----------------",
        found.text()
      );
    }
    result
  }

  /// Send a command and wait for the next command prompt.
  pub async fn execute(&mut self, command: &VlmCommand) -> Result<PatternMatch, VlmError> {
    self.send_command(&command.to_string()).await?;
    self.wait_for_pattern(&NORMAL_PROMPT).await
  }

  /// Close the write side of the stream.
  pub async fn shutdown(&mut self) -> Result<(), VlmError> {
    self.state = SessionState::Disconnected;
    self.stream.shutdown().await?;
    Ok(())
  }

  async fn read_until(&mut self, pattern: &Regex) -> Result<PatternMatch, VlmError> {
    let mut chunk = vec![0u8; self.read_chunk_size];

    loop {
      if let Some(found) = self.take_match(pattern) {
        return Ok(found);
      }

      let n = self.stream.read(&mut chunk).await?;
      if n == 0 {
        return Err(VlmError::closed());
      }
      self.telnet.feed(&chunk[..n], &mut self.buffer);
    }
  }

  fn take_match(&mut self, pattern: &Regex) -> Option<PatternMatch> {
    let captures = pattern.captures(&self.buffer)?;
    let end = captures.get(0)?.end();
    let found = PatternMatch::from_captures(&captures);
    drop(captures);
    self.buffer.drain(..end);
    Some(found)
  }
}
