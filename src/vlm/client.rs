//! High-level VLM client with one method per VLM operation.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use super::command::VlmCommand;
use super::error::VlmError;
use super::model::{Input, Media, Output, VlmOption};
use super::session::{PatternMatch, Session, SessionState, Wipe};
use super::status::{self, MediaStatus};
use crate::config::ClientConfig;

/// Returned by `read_current_position` when no item is playing.
pub const NO_POSITION: f32 = -1.0;

/// Returned by `read_playlist_index` when no item is playing.
pub const NO_PLAYLIST_INDEX: i32 = -1;

/// VLM client over the VLC telnet interface.
///
/// Methods take `&mut self`: VLC answers commands in order without tagging
/// them, so a client serves one caller at a time. Wrap it in a
/// `tokio::sync::Mutex` to share it between tasks.
///
/// Any failed exchange drops the session, since VLC may or may not have acted
/// on the command. Later calls fail with `NotConnected` until `connect` is
/// called again.
pub struct VlmClient<S = TcpStream> {
  config: ClientConfig,
  session: Option<Session<S>>,
  cancel: CancellationToken,
}

impl VlmClient<TcpStream> {
  /// Prepare a client for `config.host:config.port` without connecting.
  ///
  /// The config is checked with `ClientConfig::validate` on every connect.
  pub fn new(config: ClientConfig) -> Self {
    Self::for_stream(config)
  }

  /// Open a TCP connection to VLC and log in.
  ///
  /// `password` is zeroed before this returns, whatever the outcome, and
  /// when the future is dropped early.
  pub async fn connect(&mut self, password: &mut [u8]) -> Result<(), VlmError> {
    let mut secret = Wipe(password);
    self.check_config()?;

    let connecting = TcpStream::connect((self.config.host.as_str(), self.config.port));

    let connected = match self.config.read_timeout() {
      Some(limit) => match tokio::time::timeout(limit, connecting).await {
        Ok(result) => result.map_err(VlmError::from),
        Err(_) => Err(VlmError::Timeout(limit)),
      },
      None => connecting.await.map_err(VlmError::from),
    };

    match connected {
      Ok(stream) => self.connect_stream(stream, &mut *secret.0).await,
      Err(e) => {
        log::warn!(
          "Failed to connect to {}:{}: {}",
          self.config.host,
          self.config.port,
          e
        );
        Err(e)
      }
    }
  }
}

impl<S> VlmClient<S>
where
  S: AsyncRead + AsyncWrite + Unpin,
{
  /// Prepare a client that will be handed its stream by `connect_stream`.
  ///
  /// The config is checked with `ClientConfig::validate` on every connect.
  pub fn for_stream(config: ClientConfig) -> Self {
    log::debug!("Created VLM client for {}:{}", config.host, config.port);
    Self {
      config,
      session: None,
      cancel: CancellationToken::new(),
    }
  }

  /// Configured VLC host.
  pub fn host(&self) -> &str {
    &self.config.host
  }

  /// Configured VLC telnet port.
  pub fn port(&self) -> u16 {
    self.config.port
  }

  /// Login state, `Disconnected` when there is no session.
  pub fn state(&self) -> SessionState {
    self
      .session
      .as_ref()
      .map(Session::state)
      .unwrap_or(SessionState::Disconnected)
  }

  /// Whether commands can be sent.
  pub fn is_connected(&self) -> bool {
    self.state() == SessionState::Authenticated
  }

  /// Token that aborts whatever wait is in progress when cancelled.
  ///
  /// Cancelling leaves the session unusable; the next `connect` installs a
  /// fresh token.
  pub fn cancel_token(&self) -> CancellationToken {
    self.cancel.clone()
  }

  /// Log in over an already opened stream.
  ///
  /// `password` is zeroed before this returns, whatever the outcome.
  pub async fn connect_stream(&mut self, stream: S, password: &mut [u8]) -> Result<(), VlmError> {
    let mut secret = Wipe(password);
    self.check_config()?;

    if self.session.take().is_some() {
      log::warn!("Replacing an open VLC session");
    }
    if self.cancel.is_cancelled() {
      self.cancel = CancellationToken::new();
    }

    let mut session = Session::new(stream)
      .with_read_timeout(self.config.read_timeout())
      .with_read_chunk_size(self.config.read_chunk_size)
      .with_cancel_token(self.cancel.clone());

    match session.authenticate(&mut *secret.0).await {
      Ok(()) => {
        log::info!(
          "Connected to VLC at {}:{}",
          self.config.host,
          self.config.port
        );
        self.session = Some(session);
        Ok(())
      }
      Err(e) => {
        log::warn!(
          "Login to VLC at {}:{} failed: {}",
          self.config.host,
          self.config.port,
          e
        );
        Err(e)
      }
    }
  }

  /// Close the connection. The session is released even when this fails.
  pub async fn disconnect(&mut self) -> Result<(), VlmError> {
    let Some(mut session) = self.session.take() else {
      log::warn!("No VLC session to close");
      return Ok(());
    };

    match session.shutdown().await {
      Ok(()) => {
        log::info!(
          "Disconnected from {}:{}",
          self.config.host,
          self.config.port
        );
        Ok(())
      }
      Err(e) => {
        log::warn!(
          "Error while disconnecting from {}:{}: {}",
          self.config.host,
          self.config.port,
          e
        );
        Err(e)
      }
    }
  }

  fn check_config(&self) -> Result<(), VlmError> {
    self.config.validate().map_err(|reason| {
      log::warn!("Refusing to connect with invalid config: {}", reason);
      VlmError::InvalidConfig(reason)
    })
  }

  /// Run one command and wait for the prompt that ends its response.
  async fn execute(&mut self, command: VlmCommand) -> Result<PatternMatch, VlmError> {
    let session = self.session.as_mut().ok_or(VlmError::NotConnected)?;

    match session.execute(&command).await {
      Ok(found) => Ok(found),
      Err(e) => {
        log::warn!(
          "VLM command on media {} failed, dropping session: {}",
          command.media_name(),
          e
        );
        self.session = None;
        Err(e)
      }
    }
  }

  /// Create a media, replacing any media with the same name.
  pub async fn create_media(&mut self, media: &Media) -> Result<(), VlmError> {
    let name = media.name();
    self.delete_media(name).await?;
    self
      .execute(VlmCommand::new_media(name, media.media_type(), media.is_enabled()))
      .await?;
    if let Some(output) = media.output() {
      self.setup_output(name, output).await?;
    }
    for option in media.options() {
      self.setup_option(name, option).await?;
    }
    log::debug!("Created new media {}", media);
    Ok(())
  }

  /// Delete a media. A playing media stops streaming immediately.
  pub async fn delete_media(&mut self, name: &str) -> Result<(), VlmError> {
    self.execute(VlmCommand::delete(name)).await?;
    log::debug!("Deleted media {}", name);
    Ok(())
  }

  /// Append an item to the media's playlist.
  pub async fn add_input(&mut self, name: &str, input: &Input) -> Result<(), VlmError> {
    self.execute(VlmCommand::setup_input(name, input)).await?;
    log::debug!("Added input {} to media {}", input, name);
    Ok(())
  }

  /// Remove every playlist item. A playing item plays to its end.
  pub async fn clear_inputs(&mut self, name: &str) -> Result<(), VlmError> {
    self.execute(VlmCommand::clear_inputs(name)).await?;
    log::debug!("Cleared inputs of media {}", name);
    Ok(())
  }

  /// Remove the playlist item at `index` (1-based).
  pub async fn remove_input(&mut self, name: &str, index: u32) -> Result<(), VlmError> {
    self.execute(VlmCommand::remove_input(name, index)).await?;
    log::debug!("Removed input {} of media {}", index, name);
    Ok(())
  }

  /// Set the stream output chain of the media.
  pub async fn setup_output(&mut self, name: &str, output: &Output) -> Result<(), VlmError> {
    self.execute(VlmCommand::setup_output(name, output)).await?;
    log::debug!("Set output of media {} to {}", name, output);
    Ok(())
  }

  /// Add a module option to the media.
  pub async fn setup_option(&mut self, name: &str, option: &VlmOption) -> Result<(), VlmError> {
    self.execute(VlmCommand::setup_option(name, option)).await?;
    log::debug!("Set option {} on media {}", option, name);
    Ok(())
  }

  /// Start playing. No effect when already playing.
  pub async fn play(&mut self, name: &str) -> Result<(), VlmError> {
    self.execute(VlmCommand::play(name)).await?;
    log::debug!("Media {} is now playing", name);
    Ok(())
  }

  /// Start playing the playlist item at `index` (1-based).
  pub async fn play_item(&mut self, name: &str, index: u32) -> Result<(), VlmError> {
    self.execute(VlmCommand::play_item(name, index)).await?;
    log::debug!("Media {} is now playing item {}", name, index);
    Ok(())
  }

  /// Seek the current item to a fraction of its length (0.0 to 1.0).
  pub async fn seek_percentage(&mut self, name: &str, position: f32) -> Result<(), VlmError> {
    self.execute(VlmCommand::seek_percentage(name, position)).await?;
    log::debug!(
      "Media {} seeked to relative position {:.2} %",
      name,
      position * 100.0
    );
    Ok(())
  }

  /// Seek the current item to an absolute offset from its start.
  pub async fn seek(&mut self, name: &str, position: Duration) -> Result<(), VlmError> {
    self.execute(VlmCommand::seek_time(name, position)).await?;
    log::debug!(
      "Media {} seeked to absolute position {} ms",
      name,
      position.as_millis()
    );
    Ok(())
  }

  /// Stop playing. The playlist stays in place.
  pub async fn stop(&mut self, name: &str) -> Result<(), VlmError> {
    self.execute(VlmCommand::stop(name)).await?;
    log::debug!("Stopped media {}", name);
    Ok(())
  }

  /// Restart the playlist when its last item ends.
  pub async fn set_loop(&mut self, name: &str) -> Result<(), VlmError> {
    self.execute(VlmCommand::set_loop(name)).await?;
    log::debug!("Media {} is now looping", name);
    Ok(())
  }

  /// Stop at the end of the playlist.
  pub async fn unloop(&mut self, name: &str) -> Result<(), VlmError> {
    self.execute(VlmCommand::unloop(name)).await?;
    log::debug!("Media {} is not looping anymore", name);
    Ok(())
  }

  /// Flip the loop state and return the new one.
  pub async fn toggle_loop(&mut self, name: &str) -> Result<bool, VlmError> {
    if self.read_loop_state(name).await? {
      self.unloop(name).await?;
      Ok(false)
    } else {
      self.set_loop(name).await?;
      Ok(true)
    }
  }

  /// Raw `show` response, prompt included.
  pub async fn show(&mut self, name: &str) -> Result<String, VlmError> {
    Ok(self.execute(VlmCommand::show(name)).await?.into_text())
  }

  /// Every field the client understands, from a single `show`.
  pub async fn read_status(&mut self, name: &str) -> Result<MediaStatus, VlmError> {
    let status = MediaStatus::parse(&self.show(name).await?);
    log::debug!("Status of media {} is {:?}", name, status);
    Ok(status)
  }

  /// Whether the media loops. `false` when the state can't be read.
  pub async fn read_loop_state(&mut self, name: &str) -> Result<bool, VlmError> {
    let looping = status::parse_loop_state(&self.show(name).await?);
    log::debug!("Loop state of media {} is {}", name, looping);
    Ok(looping)
  }

  /// Items queued on the media. Empty when they can't be read.
  pub async fn read_playlist_items(&mut self, name: &str) -> Result<Vec<Input>, VlmError> {
    let inputs = status::parse_inputs(&self.show(name).await?);
    log::debug!("Inputs of media {} are {:?}", name, inputs);
    Ok(inputs)
  }

  /// Relative position in the current item, 0.0 at the start and 1.0 at the
  /// end. `NO_POSITION` when the media is stopped.
  pub async fn read_current_position(&mut self, name: &str) -> Result<f32, VlmError> {
    let position = status::parse_position(&self.show(name).await?).unwrap_or(NO_POSITION);
    log::debug!("Position of current item on media {} is {}", name, position);
    Ok(position)
  }

  /// Length of the current item. `None` when the media is stopped.
  pub async fn read_current_length(&mut self, name: &str) -> Result<Option<Duration>, VlmError> {
    let length = status::parse_length(&self.show(name).await?);
    log::debug!("Length of current item on media {} is {:?}", name, length);
    Ok(length)
  }

  /// 1-based index of the current item. `NO_PLAYLIST_INDEX` when stopped.
  pub async fn read_playlist_index(&mut self, name: &str) -> Result<i32, VlmError> {
    let index = status::parse_playlist_index(&self.show(name).await?)
      .and_then(|index| i32::try_from(index).ok())
      .unwrap_or(NO_PLAYLIST_INDEX);
    log::debug!("Media {} is currently playing item at index {}", name, index);
    Ok(index)
  }
}
