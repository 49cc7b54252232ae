//! Core engine: turns events into ordered grouping hash candidates.

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use crate::component::ComponentRecord;
use crate::config::Config;
use crate::error::GroupingError;
use crate::fingerprint::{get_hashes_from_fingerprint, Fingerprint};
use crate::hash::{hash_from_values, is_hash};
use crate::normalize;
use crate::types::*;

/// Calculate the grouping hashes for an event. Never empty.
///
/// A checksum overrides everything: a 32-char lowercase hex checksum is used
/// as-is, anything else is hashed and also kept raw as a second candidate.
/// Otherwise the fingerprint (default `[{{ default }}]`) is expanded and each
/// resulting bit-list is hashed.
pub fn calculate_event_hashes(event: &Event) -> Vec<String> {
  if let Some(checksum) = event.checksum.as_deref().filter(|c| !c.is_empty()) {
    if is_hash(checksum) {
      debug!(checksum, "using checksum as grouping hash");
      return vec![checksum.to_string()];
    }
    debug!(checksum, "hashing non-hash checksum");
    return vec![
      hash_from_values(&[Primitive::Str(checksum.to_string())]),
      checksum.to_string(),
    ];
  }

  let fingerprint = match &event.fingerprint {
    Some(fp) if !fp.is_empty() => fp.clone(),
    _ => Fingerprint::default_only(),
  };

  let hashes: Vec<String> = get_hashes_from_fingerprint(event, &fingerprint)
    .iter()
    .map(|bits| hash_from_values(bits))
    .collect();
  debug!(candidates = hashes.len(), platform = %event.platform, "calculated grouping hashes");
  hashes
}

/// Serialized component trees of every interface, in provider order.
pub fn explain_components(event: &Event, skip_empty: bool) -> Vec<ComponentRecord> {
  event
    .interfaces
    .iter()
    .flat_map(|i| i.grouping_components(&event.platform))
    .map(|c| c.as_dict(skip_empty))
    .collect()
}

/// The grouping engine. Holds configuration only; events are independent.
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  /// Process a single inbound event.
  pub fn process(&self, raw: &InboundEvent) -> Result<HashOutput, GroupingError> {
    let event = normalize::normalize(raw, &self.config)?;
    let hashes = calculate_event_hashes(&event);
    let components = if self.config.explain {
      Some(explain_components(&event, self.config.skip_empty))
    } else {
      None
    };
    Ok(HashOutput { hashes, components })
  }

  /// Process one JSON line into either a result or a structured error.
  pub fn process_line(&self, line: &str) -> Result<HashOutput, ErrorOutput> {
    let raw: InboundEvent = serde_json::from_str(line).map_err(|e| {
      warn!("rejected input line: {}", e);
      ErrorOutput::new(format!("json parse: {}", e))
    })?;
    self.process(&raw).map_err(|e| {
      warn!("rejected event: {}", e);
      match e {
        GroupingError::Validation { field, reason } => ErrorOutput::new(reason).with_field(field),
        other => ErrorOutput::new(other.to_string()),
      }
    })
  }

  /// Process newline-delimited events, writing one JSON line per non-blank
  /// input line. Invalid UTF-8 is replaced with U+FFFD rather than failing.
  /// Output is flushed before returning, including on read errors.
  pub fn process_lines<R: BufRead, W: Write>(&self, mut input: R, out: &mut W) -> io::Result<()> {
    let mut buf = Vec::new();
    let result = loop {
      buf.clear();
      match input.read_until(b'\n', &mut buf) {
        Ok(0) => break Ok(()),
        Ok(_) => {}
        Err(e) => break Err(e),
      }

      let line = String::from_utf8_lossy(&buf);
      let trimmed = line.trim();
      if trimmed.is_empty() {
        continue;
      }

      let written = match self.process_line(trimmed) {
        Ok(output) => emit(out, &output),
        Err(err) => emit(out, &err),
      };
      if let Err(e) = written {
        break Err(e);
      }
    };
    out.flush()?;
    result
  }
}

fn emit<W: Write, T: serde::Serialize>(out: &mut W, value: &T) -> io::Result<()> {
  serde_json::to_writer(&mut *out, value)?;
  writeln!(out)
}
