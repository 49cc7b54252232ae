//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is an InboundEvent. Output lines are either:
//! - A HashOutput with the event's grouping hashes
//! - An ErrorOutput (when input validation fails)
//!
//! Invalid UTF-8 in a line is replaced with U+FFFD rather than aborting.

use clap::Parser;
use grouping_engine::{Config, Engine};
use std::io;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "grouping-engine")]
#[command(about = "Compute grouping hashes for JSON-lines events on stdin")]
struct Cli {
  /// Max stack frames per exception used for grouping.
  #[arg(long)]
  max_frames: Option<usize>,

  /// Include serialized component trees in each output line.
  #[arg(long)]
  explain: bool,

  /// Keep empty nested components in explained trees.
  #[arg(long)]
  keep_empty: bool,
}

impl Cli {
  fn config(&self) -> Config {
    let defaults = Config::default();
    Config {
      max_frames: self.max_frames.unwrap_or(defaults.max_frames),
      explain: self.explain,
      skip_empty: !self.keep_empty,
    }
  }
}

fn main() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  fmt().with_env_filter(filter).with_writer(io::stderr).init();

  let cli = Cli::parse();
  let engine = Engine::new(cli.config());

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  // Output for lines read so far is flushed even when reading fails.
  if let Err(e) = engine.process_lines(stdin.lock(), &mut out) {
    error!("io error: {}", e);
    std::process::exit(1);
  }
}
