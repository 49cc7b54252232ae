//! Grouping component trees.
//!
//! A component is a recursive structure that interfaces build bottom-up and
//! that is flattened into a list of primitives to hash. Each node decides
//! whether its subtree contributes to the grouping hash.

use serde::Serialize;

use crate::hash::hash_from_values;
use crate::types::{BitList, Primitive};

/// Fixed id -> hint defaults, consulted when a component is built without a hint.
pub const DEFAULT_HINTS: &[(&str, &str)] = &[("!salt", "a static salt")];

/// Look up the default hint for a component id.
pub fn default_hint(id: &str) -> Option<&'static str> {
  DEFAULT_HINTS
    .iter()
    .find(|(key, _)| *key == id)
    .map(|(_, hint)| *hint)
}

/// A child of a component: either a nested component or a primitive leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
  Component(GroupingComponent),
  Primitive(Primitive),
}

impl From<GroupingComponent> for ComponentValue {
  fn from(c: GroupingComponent) -> Self {
    Self::Component(c)
  }
}

impl From<Primitive> for ComponentValue {
  fn from(p: Primitive) -> Self {
    Self::Primitive(p)
  }
}

impl From<&str> for ComponentValue {
  fn from(s: &str) -> Self {
    Self::Primitive(s.into())
  }
}

impl From<String> for ComponentValue {
  fn from(s: String) -> Self {
    Self::Primitive(s.into())
  }
}

/// A node contributes when any child is a primitive or a contributing component.
fn calculate_contributes(values: &[ComponentValue]) -> bool {
  values.iter().any(|v| match v {
    ComponentValue::Component(c) => c.contributes,
    ComponentValue::Primitive(_) => true,
  })
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupingComponent {
  id: String,
  hint: Option<String>,
  contributes: bool,
  values: Vec<ComponentValue>,
}

impl GroupingComponent {
  /// Build a component. A missing hint falls back to [`DEFAULT_HINTS`]; a
  /// missing `contributes` is inferred from `values`.
  pub fn new(
    id: impl Into<String>,
    hint: Option<String>,
    contributes: Option<bool>,
    values: Vec<ComponentValue>,
  ) -> Self {
    let id = id.into();
    let hint = hint.or_else(|| default_hint(&id).map(str::to_string));
    let contributes = contributes.unwrap_or_else(|| calculate_contributes(&values));
    Self {
      id,
      hint,
      contributes,
      values,
    }
  }

  /// Shorthand for a component with inferred hint and contribution.
  pub fn with_values(id: impl Into<String>, values: Vec<ComponentValue>) -> Self {
    Self::new(id, None, None, values)
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn hint(&self) -> Option<&str> {
    self.hint.as_deref()
  }

  pub fn contributes(&self) -> bool {
    self.contributes
  }

  pub fn values(&self) -> &[ComponentValue] {
    &self.values
  }

  /// First direct child component with the given id.
  pub fn get_subcomponent(&self, id: &str) -> Option<&GroupingComponent> {
    self.values.iter().find_map(|v| match v {
      ComponentValue::Component(c) if c.id == id => Some(c),
      _ => None,
    })
  }

  /// Mutable access to the first direct child component with the given id.
  ///
  /// Mutating a child does not refresh this node's cached `contributes`;
  /// only [`GroupingComponent::update`] with new values does.
  pub fn get_subcomponent_mut(&mut self, id: &str) -> Option<&mut GroupingComponent> {
    self.values.iter_mut().find_map(|v| match v {
      ComponentValue::Component(c) if c.id == id => Some(c),
      _ => None,
    })
  }

  /// Update in place. New `values` recompute `contributes` unless it is given
  /// explicitly; an explicit `contributes` always wins.
  pub fn update(
    &mut self,
    hint: Option<String>,
    contributes: Option<bool>,
    values: Option<Vec<ComponentValue>>,
  ) {
    if let Some(hint) = hint {
      self.hint = Some(hint);
    }
    let mut contributes = contributes;
    if let Some(values) = values {
      if contributes.is_none() {
        contributes = Some(calculate_contributes(&values));
      }
      self.values = values;
    }
    if let Some(contributes) = contributes {
      self.contributes = contributes;
    }
  }

  /// Depth-first primitives of all contributing subtrees, in order.
  pub fn flatten_values(&self) -> BitList {
    let mut rv = Vec::new();
    self.flatten_into(&mut rv);
    rv
  }

  fn flatten_into(&self, rv: &mut BitList) {
    if !self.contributes {
      return;
    }
    for value in &self.values {
      match value {
        ComponentValue::Component(c) => c.flatten_into(rv),
        ComponentValue::Primitive(p) => rv.push(p.clone()),
      }
    }
  }

  /// Hash of the flattened values, or `None` when this node does not contribute.
  pub fn get_hash(&self) -> Option<String> {
    if self.contributes {
      Some(hash_from_values(&self.flatten_values()))
    } else {
      None
    }
  }

  /// Convert the tree into a display record. With `skip_empty`, nested
  /// components without values are left out; primitives are always kept.
  pub fn as_dict(&self, skip_empty: bool) -> ComponentRecord {
    let values = self
      .values
      .iter()
      .filter_map(|v| match v {
        ComponentValue::Component(c) => {
          if skip_empty && c.values.is_empty() {
            None
          } else {
            Some(RecordValue::Component(c.as_dict(skip_empty)))
          }
        }
        ComponentValue::Primitive(p) => Some(RecordValue::Primitive(p.clone())),
      })
      .collect();

    ComponentRecord {
      id: self.id.clone(),
      contributes: self.contributes,
      hint: self.hint.clone(),
      values,
    }
  }
}

// ---------------------------------------------------------------------------
// Serialized form (diagnostics only)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentRecord {
  pub id: String,
  pub contributes: bool,
  pub hint: Option<String>,
  pub values: Vec<RecordValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordValue {
  Component(ComponentRecord),
  Primitive(Primitive),
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn leaf(id: &str, v: &str) -> GroupingComponent {
    GroupingComponent::with_values(id, vec![v.into()])
  }

  fn muted(id: &str, v: &str) -> GroupingComponent {
    GroupingComponent::new(id, None, Some(false), vec![v.into()])
  }

  #[test]
  fn contributes_inferred_from_children() {
    assert!(leaf("type", "TypeError").contributes());
    assert!(!GroupingComponent::with_values("empty", vec![]).contributes());

    let only_muted = GroupingComponent::with_values("parent", vec![muted("a", "x").into()]);
    assert!(!only_muted.contributes());

    let mixed = GroupingComponent::with_values(
      "parent",
      vec![muted("a", "x").into(), leaf("b", "y").into()],
    );
    assert!(mixed.contributes());
  }

  #[test]
  fn explicit_contributes_overrides_inference() {
    let c = GroupingComponent::new("c", None, Some(false), vec!["x".into()]);
    assert!(!c.contributes());
    let c = GroupingComponent::new("c", None, Some(true), vec![]);
    assert!(c.contributes());
  }

  #[test]
  fn hint_defaults_from_table() {
    let salt = GroupingComponent::with_values("!salt", vec!["s".into()]);
    assert_eq!(salt.hint(), Some("a static salt"));

    let own = GroupingComponent::new("!salt", Some("mine".into()), None, vec![]);
    assert_eq!(own.hint(), Some("mine"));

    assert_eq!(leaf("frame", "f").hint(), None);
  }

  #[test]
  fn get_subcomponent_returns_first_match() {
    let first = leaf("frame", "one");
    let second = leaf("frame", "two");
    let parent = GroupingComponent::with_values(
      "stacktrace",
      vec!["frame".into(), first.clone().into(), second.into()],
    );
    assert_eq!(parent.get_subcomponent("frame"), Some(&first));
    assert!(parent.get_subcomponent("missing").is_none());
  }

  #[test]
  fn update_recomputes_contributes_from_new_values() {
    let mut c = GroupingComponent::with_values("c", vec![]);
    assert!(!c.contributes());
    c.update(None, None, Some(vec!["x".into()]));
    assert!(c.contributes());
    c.update(None, None, Some(vec![muted("m", "y").into()]));
    assert!(!c.contributes());
  }

  #[test]
  fn update_explicit_contributes_wins_over_values() {
    let mut c = GroupingComponent::with_values("c", vec![]);
    c.update(None, Some(false), Some(vec!["x".into()]));
    assert!(!c.contributes());
    assert_eq!(c.values().len(), 1);

    c.update(Some("why".into()), Some(true), None);
    assert!(c.contributes());
    assert_eq!(c.hint(), Some("why"));
  }

  #[test]
  fn update_without_hint_keeps_existing() {
    let mut c = GroupingComponent::new("c", Some("keep".into()), None, vec![]);
    c.update(None, None, Some(vec!["x".into()]));
    assert_eq!(c.hint(), Some("keep"));
  }

  #[test]
  fn child_mutation_leaves_parent_contributes_stale() {
    let mut parent = GroupingComponent::with_values("parent", vec![leaf("child", "x").into()]);
    assert!(parent.contributes());

    parent
      .get_subcomponent_mut("child")
      .unwrap()
      .update(None, Some(false), None);

    // Parent still claims to contribute, but the child is skipped when flattening.
    assert!(parent.contributes());
    assert!(parent.flatten_values().is_empty());
    assert_eq!(parent.get_hash(), Some(hash_from_values(&[])));

    // Replacing values through update is what refreshes the flag.
    let values = parent.values().to_vec();
    parent.update(None, None, Some(values));
    assert!(!parent.contributes());
  }

  #[test]
  fn flatten_expands_components_in_place() {
    let tree = GroupingComponent::with_values(
      "exception",
      vec![
        leaf("type", "TypeError").into(),
        "sep".into(),
        muted("value", "ignored").into(),
        GroupingComponent::with_values(
          "stacktrace",
          vec![leaf("frame", "a.ts").into(), leaf("frame", "b.ts").into()],
        )
        .into(),
        Primitive::Int(3).into(),
      ],
    );
    assert_eq!(
      tree.flatten_values(),
      vec![
        Primitive::from("TypeError"),
        Primitive::from("sep"),
        Primitive::from("a.ts"),
        Primitive::from("b.ts"),
        Primitive::Int(3),
      ]
    );
  }

  #[test]
  fn non_contributing_root_ignores_contributing_children() {
    let tree = GroupingComponent::new("root", None, Some(false), vec![leaf("a", "x").into()]);
    assert!(tree.flatten_values().is_empty());
    assert_eq!(tree.get_hash(), None);
  }

  #[test]
  fn get_hash_matches_digest_of_flattened_values() {
    let tree = GroupingComponent::with_values("m", vec!["a".into(), "b".into()]);
    assert_eq!(tree.get_hash(), Some(hash_from_values(&["a".into(), "b".into()])));
  }

  #[test]
  fn as_dict_preserves_structure() {
    let tree = GroupingComponent::new(
      "exception",
      Some("top".into()),
      None,
      vec![
        "raw".into(),
        leaf("type", "TypeError").into(),
        GroupingComponent::with_values("stacktrace", vec![]).into(),
        Primitive::Bool(true).into(),
      ],
    );
    let json = serde_json::to_value(tree.as_dict(false)).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "id": "exception",
        "contributes": true,
        "hint": "top",
        "values": [
          "raw",
          {"id": "type", "contributes": true, "hint": null, "values": ["TypeError"]},
          {"id": "stacktrace", "contributes": false, "hint": null, "values": []},
          true
        ]
      })
    );
  }

  #[test]
  fn as_dict_skip_empty_drops_only_empty_components() {
    let tree = GroupingComponent::with_values(
      "exception",
      vec![
        "raw".into(),
        GroupingComponent::with_values("stacktrace", vec![]).into(),
        GroupingComponent::with_values(
          "outer",
          vec![GroupingComponent::with_values("inner", vec![]).into()],
        )
        .into(),
      ],
    );
    let record = tree.as_dict(true);
    assert_eq!(record.values.len(), 2);
    assert_eq!(record.values[0], RecordValue::Primitive("raw".into()));
    match &record.values[1] {
      RecordValue::Component(outer) => {
        assert_eq!(outer.id, "outer");
        assert!(outer.values.is_empty());
      }
      other => panic!("expected component, got {:?}", other),
    }
  }

  fn arb_component() -> impl Strategy<Value = GroupingComponent> {
    let leaf = (
      "[a-z]{1,4}",
      proptest::option::of(any::<bool>()),
      proptest::collection::vec("[a-z]{0,3}", 0..3),
    )
      .prop_map(|(id, contributes, vals)| {
        GroupingComponent::new(id, None, contributes, vals.into_iter().map(Into::into).collect())
      });
    leaf.prop_recursive(4, 32, 4, |inner| {
      (
        "[a-z]{1,4}",
        proptest::option::of(any::<bool>()),
        proptest::collection::vec(inner, 0..4),
      )
        .prop_map(|(id, contributes, children)| {
          GroupingComponent::new(
            id,
            None,
            contributes,
            children.into_iter().map(ComponentValue::from).collect(),
          )
        })
    })
  }

  proptest! {
    #[test]
    fn muted_root_always_flattens_empty(tree in arb_component()) {
      let mut tree = tree;
      tree.update(None, Some(false), None);
      prop_assert!(tree.flatten_values().is_empty());
      prop_assert_eq!(tree.get_hash(), None);
    }

    #[test]
    fn hash_present_iff_contributes(tree in arb_component()) {
      prop_assert_eq!(tree.get_hash().is_some(), tree.contributes());
    }
  }
}
