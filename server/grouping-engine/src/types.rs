//! Core types for the grouping engine (JSON contracts + leaf values).

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::component::ComponentRecord;
use crate::error::GroupingError;
use crate::fingerprint::Fingerprint;
use crate::interface::Interface;

// ---------------------------------------------------------------------------
// Primitive leaf values
// ---------------------------------------------------------------------------

/// A primitive leaf of a component tree or hash bit-list.
///
/// Variant order matters for untagged deserialization: booleans and integers
/// must be tried before floats and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
}

impl Primitive {
  /// Build a string leaf from arbitrary bytes; invalid UTF-8 becomes U+FFFD.
  pub fn from_utf8_lossy(bytes: &[u8]) -> Self {
    Self::Str(String::from_utf8_lossy(bytes).into_owned())
  }

  /// Byte form fed to the digest.
  pub fn to_bytes(&self) -> Cow<'_, [u8]> {
    match self {
      Self::Str(s) => Cow::Borrowed(s.as_bytes()),
      other => Cow::Owned(other.to_string().into_bytes()),
    }
  }
}

impl fmt::Display for Primitive {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Bool(b) => write!(f, "{}", b),
      Self::Int(i) => write!(f, "{}", i),
      // Debug keeps the fractional part of whole floats ("1.0", not "1").
      Self::Float(x) => write!(f, "{:?}", x),
      Self::Str(s) => f.write_str(s),
    }
  }
}

impl From<&str> for Primitive {
  fn from(s: &str) -> Self {
    Self::Str(s.to_string())
  }
}

impl From<String> for Primitive {
  fn from(s: String) -> Self {
    Self::Str(s)
  }
}

impl From<i64> for Primitive {
  fn from(i: i64) -> Self {
    Self::Int(i)
  }
}

impl From<f64> for Primitive {
  fn from(x: f64) -> Self {
    Self::Float(x)
  }
}

impl From<bool> for Primitive {
  fn from(b: bool) -> Self {
    Self::Bool(b)
  }
}

/// Only scalars are valid leaves; null, arrays and objects are rejected.
impl TryFrom<serde_json::Value> for Primitive {
  type Error = GroupingError;

  fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
    use serde_json::Value;
    match value {
      Value::Bool(b) => Ok(Self::Bool(b)),
      Value::Number(n) => match n.as_i64() {
        Some(i) => Ok(Self::Int(i)),
        None => n
          .as_f64()
          .map(Self::Float)
          .ok_or_else(|| GroupingError::validation("value", "number out of range")),
      },
      Value::String(s) => Ok(Self::Str(s)),
      Value::Null => Err(GroupingError::validation("value", "null is not a primitive")),
      Value::Array(_) | Value::Object(_) => Err(GroupingError::validation(
        "value",
        "nested values are not primitives",
      )),
    }
  }
}

/// One concrete hash input: an ordered sequence of primitives.
pub type BitList = Vec<Primitive>;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the caller sends)
// ---------------------------------------------------------------------------

/// One inbound event line from stdin. Unknown fields are silently ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEvent {
  #[serde(default)]
  pub platform: Option<String>,
  #[serde(default)]
  pub checksum: Option<String>,
  /// Raw JSON so mixed strings/numbers can be validated per element.
  #[serde(default)]
  pub fingerprint: Option<Vec<serde_json::Value>>,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub exception: Option<InboundException>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundException {
  #[serde(default, rename = "type")]
  pub ty: Option<String>,
  #[serde(default)]
  pub value: Option<String>,
  #[serde(default)]
  pub stacktrace: Vec<InboundFrame>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundFrame {
  #[serde(default)]
  pub file: Option<String>,
  #[serde(default)]
  pub function: Option<String>,
  #[serde(default)]
  pub line: Option<u32>,
  #[serde(default)]
  pub in_app: Option<bool>,
}

// ---------------------------------------------------------------------------
// Internal normalized types
// ---------------------------------------------------------------------------

/// Normalized frame (path-normalized, line stripped for grouping).
#[derive(Debug, Clone)]
pub struct Frame {
  pub file: String,
  pub function: String,
  pub in_app: bool,
}

/// Canonical internal event after normalization + validation.
///
/// Interfaces are kept in the order the hash provider consults them.
pub struct Event {
  pub platform: String,
  /// Non-empty when present.
  pub checksum: Option<String>,
  /// Non-empty when present.
  pub fingerprint: Option<Fingerprint>,
  pub interfaces: Vec<Box<dyn Interface>>,
}

impl fmt::Debug for Event {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let names: Vec<&str> = self.interfaces.iter().map(|i| i.name()).collect();
    f.debug_struct("Event")
      .field("platform", &self.platform)
      .field("checksum", &self.checksum)
      .field("fingerprint", &self.fingerprint)
      .field("interfaces", &names)
      .finish()
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

/// Grouping result for one event.
#[derive(Debug, Clone, Serialize)]
pub struct HashOutput {
  /// Ordered grouping hash candidates; never empty.
  pub hashes: Vec<String>,
  /// Serialized component trees, only when explain is enabled.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub components: Option<Vec<ComponentRecord>>,
}

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
