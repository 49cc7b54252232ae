//! PushLog Grouping Engine — deterministic grouping hashes for error events.
//!
//! Builds grouping component trees from an event's interfaces, expands the
//! event's fingerprint (or the `{{ default }}` fingerprint) against them, and
//! hashes the results into ordered candidates. A client checksum overrides
//! the whole process.
//!
//! No DB, no network; every call is pure and independent.

pub mod component;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod hash;
pub mod interface;
pub mod normalize;
pub mod types;

pub use component::{ComponentRecord, ComponentValue, GroupingComponent};
pub use config::Config;
pub use engine::{calculate_event_hashes, Engine};
pub use error::GroupingError;
pub use fingerprint::Fingerprint;
pub use hash::hash_from_values;
pub use interface::Interface;
pub use types::{Event, HashOutput, InboundEvent, Primitive};
