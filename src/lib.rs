//! Client for the VLM (VideoLAN Manager) telnet interface of VLC.
//!
//! ```no_run
//! use vlm_client::{ClientConfig, Input, Media, MediaType, VlmClient};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = VlmClient::new(ClientConfig::default());
//! client.connect(&mut b"admin".to_vec()).await?;
//!
//! let media = Media::new("channel1", MediaType::Broadcast)?;
//! client.create_media(&media).await?;
//! client.add_input("channel1", &Input::new("/films/film1.avi")).await?;
//! client.play("channel1").await?;
//!
//! let status = client.read_status("channel1").await?;
//! println!("position: {:?}", status.position);
//!
//! client.disconnect().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod vlm;

pub use config::{ClientConfig, ConfigError};
pub use vlm::{
  Input, Media, MediaStatus, MediaType, Output, SessionState, VlmClient, VlmCommand, VlmError,
  VlmOption,
};
