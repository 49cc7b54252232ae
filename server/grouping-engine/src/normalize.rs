//! Normalize inbound events into canonical internal Event models.

use crate::config::Config;
use crate::error::GroupingError;
use crate::fingerprint::Fingerprint;
use crate::interface::{ExceptionInterface, Interface, MessageInterface};
use crate::types::*;

/// Platform used when the event does not name one.
pub const DEFAULT_PLATFORM: &str = "other";

/// Parse and normalize an InboundEvent into a canonical Event.
///
/// Missing or empty optional fields are defaulted; only malformed
/// fingerprint elements are rejected.
pub fn normalize(raw: &InboundEvent, config: &Config) -> Result<Event, GroupingError> {
  let platform = raw
    .platform
    .as_deref()
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .unwrap_or(DEFAULT_PLATFORM)
    .to_ascii_lowercase();

  let checksum = raw.checksum.clone().filter(|c| !c.is_empty());

  // Fingerprint elements may be strings, numbers or booleans.
  let fingerprint = match &raw.fingerprint {
    Some(bits) if !bits.is_empty() => {
      let bits = bits
        .iter()
        .map(|b| {
          Primitive::try_from(b.clone())
            .map(|p| p.to_string())
            .map_err(|_| GroupingError::validation("fingerprint", "expected strings or numbers"))
        })
        .collect::<Result<Vec<_>, GroupingError>>()?;
      Some(Fingerprint::parse(&bits))
    }
    _ => None,
  };

  // Interface order is the order the default hash provider consults them.
  let mut interfaces: Vec<Box<dyn Interface>> = Vec::new();
  if let Some(exc) = &raw.exception {
    let frames: Vec<Frame> = exc
      .stacktrace
      .iter()
      .take(config.max_frames)
      .map(|f| Frame {
        file: f.file.as_deref().map(normalize_path).unwrap_or_default(),
        function: f.function.clone().unwrap_or_default(),
        in_app: f.in_app.unwrap_or(false),
      })
      .collect();
    interfaces.push(Box::new(ExceptionInterface {
      ty: exc.ty.clone().unwrap_or_default(),
      value: exc.value.clone().unwrap_or_default(),
      frames,
    }));
  }
  if let Some(message) = &raw.message {
    interfaces.push(Box::new(MessageInterface {
      message: message.clone(),
    }));
  }

  Ok(Event {
    platform,
    checksum,
    fingerprint,
    interfaces,
  })
}

/// Normalize a file path for stable comparison:
/// - backslash -> forward slash
/// - collapse repeated slashes
/// - strip leading ./
/// - lowercase
fn normalize_path(p: &str) -> String {
  let s = p.replace('\\', "/");
  let mut out = String::with_capacity(s.len());
  let mut prev_slash = false;
  for ch in s.chars() {
    if ch == '/' {
      if !prev_slash {
        out.push('/');
      }
      prev_slash = true;
    } else {
      prev_slash = false;
      out.push(ch);
    }
  }
  let trimmed = out.strip_prefix("./").unwrap_or(&out);
  trimmed.to_ascii_lowercase()
}
