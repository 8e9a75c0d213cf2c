//! VLM command lines.
//!
//! Reference: https://wiki.videolan.org/Documentation:Modules/vlm/

use std::fmt;
use std::time::Duration;

use super::model::{Input, MediaType, Output, VlmOption};

/// One VLM command, rendered to its wire text by `Display`.
#[derive(Debug, Clone, PartialEq)]
pub enum VlmCommand {
  New {
    name: String,
    media_type: MediaType,
    enabled: bool,
  },
  Delete {
    name: String,
  },
  SetupInput {
    name: String,
    input: Input,
  },
  /// `inputdel all`
  ClearInputs {
    name: String,
  },
  /// Remove the playlist item at a 1-based index.
  RemoveInput {
    name: String,
    index: u32,
  },
  SetupOutput {
    name: String,
    output: Output,
  },
  SetupOption {
    name: String,
    option: VlmOption,
  },
  Play {
    name: String,
    index: Option<u32>,
  },
  /// Seek to a fraction of the current item, 0.0 to 1.0.
  SeekPercentage {
    name: String,
    position: f32,
  },
  /// Seek to an absolute offset from the start of the current item.
  SeekTime {
    name: String,
    position: Duration,
  },
  Stop {
    name: String,
  },
  Show {
    name: String,
  },
  Loop {
    name: String,
  },
  Unloop {
    name: String,
  },
}

impl VlmCommand {
  pub fn new_media(name: &str, media_type: MediaType, enabled: bool) -> Self {
    Self::New {
      name: name.to_string(),
      media_type,
      enabled,
    }
  }

  pub fn delete(name: &str) -> Self {
    Self::Delete {
      name: name.to_string(),
    }
  }

  pub fn setup_input(name: &str, input: &Input) -> Self {
    Self::SetupInput {
      name: name.to_string(),
      input: input.clone(),
    }
  }

  pub fn clear_inputs(name: &str) -> Self {
    Self::ClearInputs {
      name: name.to_string(),
    }
  }

  pub fn remove_input(name: &str, index: u32) -> Self {
    Self::RemoveInput {
      name: name.to_string(),
      index,
    }
  }

  pub fn setup_output(name: &str, output: &Output) -> Self {
    Self::SetupOutput {
      name: name.to_string(),
      output: output.clone(),
    }
  }

  pub fn setup_option(name: &str, option: &VlmOption) -> Self {
    Self::SetupOption {
      name: name.to_string(),
      option: option.clone(),
    }
  }

  pub fn play(name: &str) -> Self {
    Self::Play {
      name: name.to_string(),
      index: None,
    }
  }

  pub fn play_item(name: &str, index: u32) -> Self {
    Self::Play {
      name: name.to_string(),
      index: Some(index),
    }
  }

  pub fn seek_percentage(name: &str, position: f32) -> Self {
    Self::SeekPercentage {
      name: name.to_string(),
      position,
    }
  }

  pub fn seek_time(name: &str, position: Duration) -> Self {
    Self::SeekTime {
      name: name.to_string(),
      position,
    }
  }

  pub fn stop(name: &str) -> Self {
    Self::Stop {
      name: name.to_string(),
    }
  }

  pub fn show(name: &str) -> Self {
    Self::Show {
      name: name.to_string(),
    }
  }

  pub fn set_loop(name: &str) -> Self {
    Self::Loop {
      name: name.to_string(),
    }
  }

  pub fn unloop(name: &str) -> Self {
    Self::Unloop {
      name: name.to_string(),
    }
  }

  /// Name of the media the command targets.
  pub fn media_name(&self) -> &str {
    match self {
      Self::New { name, .. }
      | Self::Delete { name }
      | Self::SetupInput { name, .. }
      | Self::ClearInputs { name }
      | Self::RemoveInput { name, .. }
      | Self::SetupOutput { name, .. }
      | Self::SetupOption { name, .. }
      | Self::Play { name, .. }
      | Self::SeekPercentage { name, .. }
      | Self::SeekTime { name, .. }
      | Self::Stop { name }
      | Self::Show { name }
      | Self::Loop { name }
      | Self::Unloop { name } => name,
    }
  }
}

impl fmt::Display for VlmCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::New {
        name,
        media_type,
        enabled,
      } => {
        let state = if *enabled { "enabled" } else { "disabled" };
        write!(f, "new {} {} {}", name, media_type, state)
      }
      Self::Delete { name } => write!(f, "del {}", name),
      Self::SetupInput { name, input } => write!(f, "setup {} input {}", name, input),
      Self::ClearInputs { name } => write!(f, "setup {} inputdel all", name),
      Self::RemoveInput { name, index } => write!(f, "setup {} inputdeln {}", name, index),
      Self::SetupOutput { name, output } => write!(f, "setup {} output {}", name, output),
      Self::SetupOption { name, option } => write!(f, "setup {} option {}", name, option),
      Self::Play { name, index: None } => write!(f, "control {} play", name),
      Self::Play {
        name,
        index: Some(index),
      } => write!(f, "control {} play {}", name, index),
      // VLM parses the fraction with the C `%f` conventions
      Self::SeekPercentage { name, position } => {
        write!(f, "control {} seek {:.6}", name, position)
      }
      Self::SeekTime { name, position } => {
        write!(f, "control {} seek {}ms", name, position.as_millis())
      }
      Self::Stop { name } => write!(f, "control {} stop", name),
      Self::Show { name } => write!(f, "show {}", name),
      Self::Loop { name } => write!(f, "loop {}", name),
      Self::Unloop { name } => write!(f, "unloop {}", name),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const MEDIA: &str = "channel42";

  #[test]
  fn test_delete_is_del_plus_name() {
    for name in ["channel42", "a", "tv_1", "radio-classic"] {
      assert_eq!(VlmCommand::delete(name).to_string(), format!("del {}", name));
    }
  }

  #[test]
  fn test_new_media() {
    assert_eq!(
      VlmCommand::new_media(MEDIA, MediaType::Broadcast, true).to_string(),
      "new channel42 broadcast enabled"
    );
    assert_eq!(
      VlmCommand::new_media(MEDIA, MediaType::Vod, false).to_string(),
      "new channel42 vod disabled"
    );
    assert_eq!(
      VlmCommand::new_media(MEDIA, MediaType::Schedule, true).to_string(),
      "new channel42 schedule enabled"
    );
  }

  #[test]
  fn test_setup_commands() {
    let input = Input::new("/home/myself/films/film1.avi");
    assert_eq!(
      VlmCommand::setup_input(MEDIA, &input).to_string(),
      "setup channel42 input /home/myself/films/film1.avi"
    );
    assert_eq!(
      VlmCommand::clear_inputs(MEDIA).to_string(),
      "setup channel42 inputdel all"
    );
    assert_eq!(
      VlmCommand::remove_input(MEDIA, 2).to_string(),
      "setup channel42 inputdeln 2"
    );

    let output = Output::builder()
      .module("gather")
      .module("std")
      .property("access", "http")
      .property("mux", "ps")
      .property("dst", ":8080")
      .build();
    assert_eq!(
      VlmCommand::setup_output(MEDIA, &output).to_string(),
      "setup channel42 output #gather:std{access=http,mux=ps,dst=:8080}"
    );

    assert_eq!(
      VlmCommand::setup_option(MEDIA, &VlmOption::with_value("sout-display-delay", "150"))
        .to_string(),
      "setup channel42 option sout-display-delay=150"
    );
    assert_eq!(
      VlmCommand::setup_option(MEDIA, &VlmOption::flag("sout-keep")).to_string(),
      "setup channel42 option sout-keep"
    );
  }

  #[test]
  fn test_control_commands() {
    assert_eq!(VlmCommand::play(MEDIA).to_string(), "control channel42 play");
    assert_eq!(VlmCommand::play_item(MEDIA, 1).to_string(), "control channel42 play 1");
    assert_eq!(VlmCommand::stop(MEDIA).to_string(), "control channel42 stop");
    assert_eq!(
      VlmCommand::seek_percentage(MEDIA, 0.42).to_string(),
      "control channel42 seek 0.420000"
    );
    assert_eq!(
      VlmCommand::seek_time(MEDIA, Duration::from_millis(42_000_000)).to_string(),
      "control channel42 seek 42000000ms"
    );
  }

  #[test]
  fn test_show_and_loop() {
    assert_eq!(VlmCommand::show(MEDIA).to_string(), "show channel42");
    assert_eq!(VlmCommand::set_loop(MEDIA).to_string(), "loop channel42");
    assert_eq!(VlmCommand::unloop(MEDIA).to_string(), "unloop channel42");
  }

  #[test]
  fn test_media_name() {
    assert_eq!(VlmCommand::remove_input(MEDIA, 3).media_name(), MEDIA);
    assert_eq!(VlmCommand::show("other").media_name(), "other");
  }
}
