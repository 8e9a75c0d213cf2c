//! VLM value types: media descriptors, inputs, options and output chains.
//!
//! All types render to the exact text VLM expects through `Display`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected value in the model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
  #[error("Invalid media name: {0:?}")]
  InvalidName(String),
}

/// Kind of VLM media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
  Broadcast,
  Vod,
  Schedule,
}

impl MediaType {
  /// Keyword used by the `new` command.
  pub fn as_str(&self) -> &'static str {
    match self {
      MediaType::Broadcast => "broadcast",
      MediaType::Vod => "vod",
      MediaType::Schedule => "schedule",
    }
  }
}

impl fmt::Display for MediaType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A named VLM media (broadcast, VOD or schedule).
///
/// Two medias are the same media when their names match, whatever the rest of
/// their configuration says.
#[derive(Debug, Clone, Serialize)]
pub struct Media {
  name: String,
  media_type: MediaType,
  enabled: bool,
  output: Option<Output>,
  options: Vec<VlmOption>,
}

impl Media {
  /// Create an enabled media without output or options.
  ///
  /// The name ends up as a single token on the command line, so it must be
  /// non-empty and free of whitespace.
  pub fn new(name: impl Into<String>, media_type: MediaType) -> Result<Self, ModelError> {
    let name = name.into();
    if name.is_empty() || name.chars().any(char::is_whitespace) {
      return Err(ModelError::InvalidName(name));
    }

    Ok(Self {
      name,
      media_type,
      enabled: true,
      output: None,
      options: Vec::new(),
    })
  }

  /// Disabled medias accept setup but ignore `control` commands.
  pub fn with_enabled(mut self, enabled: bool) -> Self {
    self.enabled = enabled;
    self
  }

  /// Stream output chain set right after creation.
  pub fn with_output(mut self, output: Output) -> Self {
    self.output = Some(output);
    self
  }

  /// Append an option; options are sent in the order added.
  pub fn with_option(mut self, option: VlmOption) -> Self {
    self.options.push(option);
    self
  }

  /// Name identifying the media on the server.
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn media_type(&self) -> MediaType {
    self.media_type
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  /// Output chain, `None` when VLC's default applies.
  pub fn output(&self) -> Option<&Output> {
    self.output.as_ref()
  }

  pub fn options(&self) -> &[VlmOption] {
    &self.options
  }
}

impl PartialEq for Media {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name
  }
}

impl Eq for Media {}

impl Hash for Media {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.name.hash(state);
  }
}

impl fmt::Display for Media {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "[name={}, type={}, enabled={}, output=",
      self.name, self.media_type, self.enabled
    )?;
    match &self.output {
      Some(output) => write!(f, "{}]", output),
      None => f.write_str("none]"),
    }
  }
}

/// One playable item in a media's playlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Input {
  path: String,
}

impl Input {
  pub fn new(path: impl Into<String>) -> Self {
    Self { path: path.into() }
  }

  /// File path or MRL as sent to VLC.
  pub fn path(&self) -> &str {
    &self.path
  }

  /// The input as a filesystem path (meaningless for network MRLs).
  pub fn as_path(&self) -> &Path {
    Path::new(&self.path)
  }
}

impl fmt::Display for Input {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.path)
  }
}

impl From<&str> for Input {
  fn from(path: &str) -> Self {
    Self::new(path)
  }
}

/// Module option attached to a media (`sout-keep`, `sout-display-delay=150`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VlmOption {
  name: String,
  #[serde(default)]
  value: Option<String>,
}

impl VlmOption {
  /// A flag option without value.
  pub fn flag(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      value: None,
    }
  }

  /// An option rendered as `name=value`.
  pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      value: Some(value.into()),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Value, `None` for a flag.
  pub fn value(&self) -> Option<&str> {
    self.value.as_deref()
  }
}

impl fmt::Display for VlmOption {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.value {
      Some(value) => write!(f, "{}={}", self.name, value),
      None => f.write_str(&self.name),
    }
  }
}

/// `key=value` pair inside an output module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
  pub name: String,
  pub value: String,
}

impl Property {
  pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      value: value.into(),
    }
  }
}

impl fmt::Display for Property {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}={}", self.name, self.value)
  }
}

/// One stream output module, e.g. `std{access=http,mux=ps}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Module {
  pub name: String,
  #[serde(default)]
  pub properties: Vec<Property>,
}

impl Module {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      properties: Vec::new(),
    }
  }

  /// Append a `name=value` property.
  pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.properties.push(Property::new(name, value));
    self
  }
}

impl fmt::Display for Module {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)?;
    if self.properties.is_empty() {
      return Ok(());
    }

    f.write_str("{")?;
    for (i, property) in self.properties.iter().enumerate() {
      if i > 0 {
        f.write_str(",")?;
      }
      write!(f, "{}", property)?;
    }
    f.write_str("}")
  }
}

/// Stream output chain, rendered as `#mod1{...}:mod2{...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Output {
  modules: Vec<Module>,
}

impl Output {
  pub fn new(modules: Vec<Module>) -> Self {
    Self { modules }
  }

  /// Start an empty chain; see `OutputBuilder`.
  pub fn builder() -> OutputBuilder {
    OutputBuilder::default()
  }

  /// Modules in chain order.
  pub fn modules(&self) -> &[Module] {
    &self.modules
  }
}

impl fmt::Display for Output {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("#")?;
    for (i, module) in self.modules.iter().enumerate() {
      if i > 0 {
        f.write_str(":")?;
      }
      write!(f, "{}", module)?;
    }
    Ok(())
  }
}

/// Fluent builder where `property` applies to the most recent `module`.
#[derive(Debug, Default)]
pub struct OutputBuilder {
  modules: Vec<Module>,
}

impl OutputBuilder {
  /// Append a module to the chain.
  pub fn module(mut self, name: impl Into<String>) -> Self {
    self.modules.push(Module::new(name));
    self
  }

  /// Add a property to the last module; ignored (with a warning) before any
  /// module.
  pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    let property = Property::new(name, value);
    match self.modules.last_mut() {
      Some(module) => module.properties.push(property),
      None => log::warn!("Output property {} set before any module, ignored", property),
    }
    self
  }

  pub fn build(self) -> Output {
    Output::new(self.modules)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  fn http_output() -> Output {
    Output::builder()
      .module("gather")
      .module("std")
      .property("access", "http")
      .property("mux", "ps")
      .property("dst", ":8080")
      .build()
  }

  #[test]
  fn test_media_identity_is_name_only() {
    let a = Media::new("channel42", MediaType::Broadcast).unwrap();
    let b = Media::new("channel42", MediaType::Vod)
      .unwrap()
      .with_enabled(false)
      .with_output(http_output());
    assert_eq!(a, b);

    let mut set = HashSet::new();
    set.insert(a);
    assert!(!set.insert(b));
    assert!(set.insert(Media::new("channel43", MediaType::Broadcast).unwrap()));
  }

  #[test]
  fn test_media_rejects_invalid_names() {
    assert_eq!(
      Media::new("", MediaType::Vod),
      Err(ModelError::InvalidName(String::new()))
    );
    assert!(Media::new("two words", MediaType::Vod).is_err());
  }

  #[test]
  fn test_output_rendering() {
    assert_eq!(
      http_output().to_string(),
      "#gather:std{access=http,mux=ps,dst=:8080}"
    );
    assert_eq!(Output::default().to_string(), "#");
  }

  #[test]
  fn test_builder_ignores_property_without_module() {
    let output = Output::builder().property("access", "http").module("display").build();
    assert_eq!(output.to_string(), "#display");
  }

  #[test]
  fn test_option_rendering_and_equality() {
    assert_eq!(VlmOption::flag("sout-keep").to_string(), "sout-keep");
    assert_eq!(
      VlmOption::with_value("sout-display-delay", "150").to_string(),
      "sout-display-delay=150"
    );
    assert_ne!(
      VlmOption::flag("sout-display-delay"),
      VlmOption::with_value("sout-display-delay", "150")
    );
  }

  #[test]
  fn test_input_identity_is_path() {
    assert_eq!(Input::new("/a/film.avi"), Input::from("/a/film.avi"));
    assert_eq!(Input::new("/a/film.avi").as_path(), Path::new("/a/film.avi"));
  }

  #[test]
  fn test_media_serializes_type_lowercase() {
    let media = Media::new("tv", MediaType::Schedule).unwrap();
    let json = serde_json::to_value(&media).unwrap();
    assert_eq!(json["media_type"], "schedule");
    assert_eq!(json["options"], serde_json::json!([]));
  }
}
