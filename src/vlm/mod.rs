//! VLM module - controls a running VLC media player through its telnet
//! interface.
//!
//! Architecture:
//! - `telnet.rs` - Strips telnet negotiation bytes from the incoming stream
//! - `session.rs` - Prompt-delimited request/response exchange and login
//! - `command.rs` - VLM command lines
//! - `status.rs` - Parser for the `show` status dump
//! - `model.rs` - Media, input, output and option values
//! - `client.rs` - High-level VLM client with command methods

mod client;
mod command;
mod error;
mod model;
mod session;
mod status;
mod telnet;

pub use client::{VlmClient, NO_PLAYLIST_INDEX, NO_POSITION};
pub use command::VlmCommand;
pub use error::VlmError;
pub use model::{
  Input, Media, MediaType, ModelError, Module, Output, OutputBuilder, Property, VlmOption,
};
pub use session::{
  PatternMatch, Session, SessionState, ANY_PROMPT, DEFAULT_READ_CHUNK_SIZE, NORMAL_PROMPT,
  PASSWORD_PROMPT,
};
pub use status::{
  parse_inputs, parse_length, parse_loop_state, parse_playlist_index, parse_position, MediaStatus,
};
pub use telnet::TelnetFilter;
