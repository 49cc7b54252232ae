//! Fingerprint templates and their expansion into hash bit-lists.

use crate::interface::get_hashes_for_event;
use crate::types::{BitList, Event, Primitive};

/// One parsed fingerprint element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FingerprintBit {
  /// Splice in the event's default hash values here.
  Default,
  Literal(String),
}

impl FingerprintBit {
  /// Classify a raw element; any whitespace inside the braces is accepted,
  /// whitespace outside them makes the element a literal.
  pub fn parse(raw: &str) -> Self {
    let inner = raw
      .strip_prefix("{{")
      .and_then(|s| s.strip_suffix("}}"))
      .map(str::trim);
    match inner {
      Some("default") => Self::Default,
      _ => Self::Literal(raw.to_string()),
    }
  }
}

/// An ordered fingerprint template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(pub Vec<FingerprintBit>);

impl Fingerprint {
  pub fn parse<S: AsRef<str>>(bits: &[S]) -> Self {
    Self(bits.iter().map(|b| FingerprintBit::parse(b.as_ref())).collect())
  }

  /// `[{{ default }}]`, used when an event carries no fingerprint.
  pub fn default_only() -> Self {
    Self(vec![FingerprintBit::Default])
  }

  pub fn has_default(&self) -> bool {
    self.0.contains(&FingerprintBit::Default)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Expand a fingerprint into one bit-list per default hash candidate.
///
/// Interfaces are only consulted when the fingerprint has a placeholder;
/// a purely literal fingerprint always yields exactly one bit-list.
pub fn get_hashes_from_fingerprint(event: &Event, fingerprint: &Fingerprint) -> Vec<BitList> {
  let defaults = if fingerprint.has_default() {
    Some(get_hashes_for_event(event))
  } else {
    None
  };
  expand(fingerprint, defaults.as_deref())
}

fn expand(fingerprint: &Fingerprint, defaults: Option<&[BitList]>) -> Vec<BitList> {
  let count = defaults.map_or(1, <[BitList]>::len);
  (0..count)
    .map(|idx| {
      let mut result = Vec::new();
      for bit in &fingerprint.0 {
        match bit {
          FingerprintBit::Default => {
            if let Some(candidate) = defaults.and_then(|d| d.get(idx)) {
              result.extend(candidate.iter().cloned());
            }
          }
          FingerprintBit::Literal(s) => result.push(Primitive::Str(s.clone())),
        }
      }
      result
    })
    .collect()
}
