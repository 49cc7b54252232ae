//! Engine configuration with sane defaults.

/// Tunables for interface hashing and diagnostics output.
#[derive(Debug, Clone)]
pub struct Config {
  /// Max stack frames to include in the exception component tree.
  pub max_frames: usize,
  /// Attach serialized component trees to each output line.
  pub explain: bool,
  /// Drop nested components with no values from the serialized trees.
  pub skip_empty: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      max_frames: 50,
      explain: false,
      skip_empty: true,
    }
  }
}
