//! Parser for the `show <media>` status dump.
//!
//! The dump is indentation-structured, four spaces per level:
//!
//! ```text
//! show
//!     channel1
//!         type : broadcast
//!         enabled : yes
//!         loop : yes
//!         inputs
//!             1 : /home/myself/films/film1.avi
//!         output : #std{access=http,mux=ps,dst=:8080}
//!         options
//!             sout-keep
//!         instances
//!             instance
//!                 name : default
//!                 state : playing
//!                 position : 0.021375
//!                 length : 669000000
//!                 playlistindex : 1
//! >
//! ```
//!
//! Only the fields the client uses are extracted. A field that is missing
//! (stopped media, unknown media, error reply) is reported as absent, never
//! as an error.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;

use super::model::Input;

static LOOP_FIELD: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?m)^ {8}loop : (yes|no)$").expect("Invalid loop regex"));

static INPUTS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?m)^ {8}inputs\n((?: {12}\d+ : .*\n?)*)").expect("Invalid inputs regex")
});

static INPUT_LINE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?m)^ {12}\d+ : (.*)$").expect("Invalid input line regex"));

static INSTANCE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?m)^ {12}instance\n((?: {16}.*\n?)*)").expect("Invalid instance regex")
});

static DEFAULT_INSTANCE_NAME: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?m)^ {16}name : default$").expect("Invalid instance name regex")
});

static POSITION_FIELD: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?m)^ {16}position : (\d+\.\d+)$").expect("Invalid position regex")
});

static LENGTH_FIELD: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?m)^ {16}length : (\d+)$").expect("Invalid length regex"));

static PLAYLIST_INDEX_FIELD: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?m)^ {16}playlistindex : (\d+)$").expect("Invalid playlist index regex")
});

/// Fields of one media read from a single status dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStatus {
  pub looping: bool,
  pub inputs: Vec<Input>,
  /// Relative position in the current item, 0.0 to 1.0.
  pub position: Option<f32>,
  pub length: Option<Duration>,
  /// 1-based index of the item being played.
  pub playlist_index: Option<u32>,
}

impl MediaStatus {
  pub fn parse(dump: &str) -> Self {
    let dump = normalize(dump);
    let instance = default_instance(&dump);

    Self {
      looping: loop_state(&dump),
      inputs: inputs(&dump),
      position: instance.and_then(position),
      length: instance.and_then(length),
      playlist_index: instance.and_then(playlist_index),
    }
  }

  /// Whether the media currently has a running default instance.
  pub fn is_playing(&self) -> bool {
    self.position.is_some() || self.playlist_index.is_some()
  }
}

/// `loop : yes` in the media block; `false` when absent.
pub fn parse_loop_state(dump: &str) -> bool {
  loop_state(&normalize(dump))
}

/// Inputs listed under `inputs`, in listed order; empty when absent.
pub fn parse_inputs(dump: &str) -> Vec<Input> {
  inputs(&normalize(dump))
}

/// `position` of the default instance.
pub fn parse_position(dump: &str) -> Option<f32> {
  default_instance(&normalize(dump)).and_then(position)
}

/// `length` of the default instance, in milliseconds.
pub fn parse_length(dump: &str) -> Option<Duration> {
  default_instance(&normalize(dump)).and_then(length)
}

/// `playlistindex` of the default instance.
pub fn parse_playlist_index(dump: &str) -> Option<u32> {
  default_instance(&normalize(dump)).and_then(playlist_index)
}

fn normalize(dump: &str) -> String {
  dump.replace("\r\n", "\n")
}

fn loop_state(dump: &str) -> bool {
  LOOP_FIELD
    .captures(dump)
    .is_some_and(|caps| &caps[1] == "yes")
}

fn inputs(dump: &str) -> Vec<Input> {
  let Some(block) = INPUTS_BLOCK.captures(dump).and_then(|caps| caps.get(1)) else {
    return Vec::new();
  };

  INPUT_LINE
    .captures_iter(block.as_str())
    .map(|caps| Input::new(&caps[1]))
    .collect()
}

/// Body of the instance named `default`, if the media has one.
fn default_instance(dump: &str) -> Option<&str> {
  INSTANCE_BLOCK
    .captures_iter(dump)
    .filter_map(|caps| caps.get(1))
    .map(|body| body.as_str())
    .find(|body| DEFAULT_INSTANCE_NAME.is_match(body))
}

fn position(instance: &str) -> Option<f32> {
  POSITION_FIELD.captures(instance)?[1].parse().ok()
}

fn length(instance: &str) -> Option<Duration> {
  let millis: u64 = LENGTH_FIELD.captures(instance)?[1].parse().ok()?;
  Some(Duration::from_millis(millis))
}

fn playlist_index(instance: &str) -> Option<u32> {
  PLAYLIST_INDEX_FIELD.captures(instance)?[1].parse().ok()
}
