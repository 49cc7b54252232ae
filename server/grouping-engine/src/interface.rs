//! Event interfaces and the default hash provider.
//!
//! Each interface builds grouping component trees from its slice of the
//! event. The provider asks interfaces in order and uses the first one that
//! produces any hash candidates.

use tracing::trace;

use crate::component::{ComponentValue, GroupingComponent};
use crate::types::{BitList, Event, Frame};

pub trait Interface: Send + Sync {
  /// Stable interface name ("exception", "message", ...).
  fn name(&self) -> &str;

  /// Component trees, one per grouping variant, most specific first.
  fn grouping_components(&self, platform: &str) -> Vec<GroupingComponent>;

  /// Hash candidates: the flattened values of every contributing tree.
  fn compute_hashes(&self, platform: &str) -> Vec<BitList> {
    self
      .grouping_components(platform)
      .iter()
      .filter(|c| c.contributes())
      .map(GroupingComponent::flatten_values)
      .collect()
  }
}

/// Default hash candidates for an event.
///
/// Falls back to a single empty bit-list when no interface produces anything,
/// so "{{ default }}" splices in nothing.
pub fn get_hashes_for_event(event: &Event) -> Vec<BitList> {
  for interface in &event.interfaces {
    let result = interface.compute_hashes(&event.platform);
    trace!(
      interface = interface.name(),
      candidates = result.len(),
      "computed interface hashes"
    );
    if !result.is_empty() {
      return result;
    }
  }
  vec![Vec::new()]
}

// ---------------------------------------------------------------------------
// Exception
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ExceptionInterface {
  pub ty: String,
  pub value: String,
  pub frames: Vec<Frame>,
}

impl ExceptionInterface {
  fn component_for<'a, I>(&self, frames: I) -> GroupingComponent
  where
    I: IntoIterator<Item = &'a Frame>,
  {
    let stacktrace = GroupingComponent::with_values(
      "stacktrace",
      frames
        .into_iter()
        .map(|f| ComponentValue::from(frame_component(f)))
        .collect(),
    );

    let ty = GroupingComponent::with_values("type", non_empty(&self.ty));

    // A usable stack trace is more stable than the message text.
    let value = if stacktrace.contributes() {
      GroupingComponent::new(
        "value",
        Some("ignored because stacktrace takes precedence".into()),
        Some(false),
        non_empty(&self.value),
      )
    } else {
      GroupingComponent::with_values("value", non_empty(&self.value))
    };

    GroupingComponent::with_values("exception", vec![ty.into(), value.into(), stacktrace.into()])
  }
}

impl Interface for ExceptionInterface {
  fn name(&self) -> &str {
    "exception"
  }

  fn grouping_components(&self, _platform: &str) -> Vec<GroupingComponent> {
    let in_app = self.frames.iter().filter(|f| f.in_app).count();
    let mut variants = Vec::with_capacity(2);
    if in_app > 0 && in_app < self.frames.len() {
      variants.push(self.component_for(self.frames.iter().filter(|f| f.in_app)));
    }
    variants.push(self.component_for(&self.frames));
    variants
  }
}

fn frame_component(frame: &Frame) -> GroupingComponent {
  let mut values: Vec<ComponentValue> = Vec::new();
  if !frame.file.is_empty() {
    values.push(GroupingComponent::with_values("filename", non_empty(&frame.file)).into());
  }
  if !frame.function.is_empty() {
    values.push(GroupingComponent::with_values("function", non_empty(&frame.function)).into());
  }
  GroupingComponent::with_values("frame", values)
}

fn non_empty(s: &str) -> Vec<ComponentValue> {
  if s.is_empty() {
    Vec::new()
  } else {
    vec![s.into()]
  }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MessageInterface {
  pub message: String,
}

impl Interface for MessageInterface {
  fn name(&self) -> &str {
    "message"
  }

  fn grouping_components(&self, _platform: &str) -> Vec<GroupingComponent> {
    vec![GroupingComponent::with_values("message", non_empty(&self.message))]
  }
}
