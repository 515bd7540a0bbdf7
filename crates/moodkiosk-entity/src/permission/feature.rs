//! Hierarchical feature namespace.
//!
//! A feature tree maps names to nodes; a node is either a [`Permission`]
//! leaf or a nested tree. Branch children keep their declaration order,
//! which is the order [`FeatureTree::viewable_paths`] reports.
//!
//! In serialized form a JSON object containing a `view` key is a leaf; any
//! other object is a branch.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::model::Permission;

/// A dot-delimited feature address such as `settings.updatePin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeaturePath {
    segments: Vec<String>,
}

impl FeaturePath {
    /// Parse a dotted path. Returns `None` for an empty string or any empty
    /// segment (`"settings."`, `".reports"`, `"a..b"`).
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self { segments })
    }

    /// The path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FeaturePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for FeaturePath {
    type Err = moodkiosk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            moodkiosk_core::AppError::validation(format!("Invalid feature path: '{s}'"))
        })
    }
}

/// One node of a feature tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureNode {
    /// Capability flags for this feature.
    Leaf(Permission),
    /// Nested features.
    Branch(FeatureTree),
}

/// Ordered mapping from feature name to node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureTree {
    entries: Vec<(String, FeatureNode)>,
}

impl FeatureTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a leaf.
    pub fn leaf(mut self, name: impl Into<String>, permission: Permission) -> Self {
        self.insert(name, FeatureNode::Leaf(permission));
        self
    }

    /// Builder: add a nested tree.
    pub fn branch(mut self, name: impl Into<String>, tree: FeatureTree) -> Self {
        self.insert(name, FeatureNode::Branch(tree));
        self
    }

    /// Insert a node. An existing name keeps its position and the previous
    /// node is returned.
    pub fn insert(&mut self, name: impl Into<String>, node: FeatureNode) -> Option<FeatureNode> {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, node)),
            None => {
                self.entries.push((name, node));
                None
            }
        }
    }

    /// Direct child by name.
    pub fn get(&self, name: &str) -> Option<&FeatureNode> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    /// Children in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FeatureNode)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walk the path segment by segment.
    ///
    /// Resolves only when every segment exists and the last one names a
    /// leaf. Stepping through a leaf or ending on a branch yields `None`.
    pub fn resolve(&self, path: &FeaturePath) -> Option<&Permission> {
        let (last, parents) = path.segments().split_last()?;

        let mut level = self;
        for segment in parents {
            match level.get(segment)? {
                FeatureNode::Branch(child) => level = child,
                FeatureNode::Leaf(_) => return None,
            }
        }

        match level.get(last)? {
            FeatureNode::Leaf(permission) => Some(permission),
            FeatureNode::Branch(_) => None,
        }
    }

    /// Parse and resolve a dotted path in one step.
    pub fn lookup(&self, feature: &str) -> Option<&Permission> {
        FeaturePath::parse(feature).and_then(|path| self.resolve(&path))
    }

    /// Every leaf with its dotted path, depth-first in declaration order.
    pub fn leaves(&self) -> Vec<(String, &Permission)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut Vec::new(), &mut out);
        out
    }

    /// Dotted paths of every leaf whose `view` flag is set.
    pub fn viewable_paths(&self) -> Vec<String> {
        self.leaves()
            .into_iter()
            .filter(|(_, permission)| permission.view)
            .map(|(path, _)| path)
            .collect()
    }

    fn collect_leaves<'a>(
        &'a self,
        prefix: &mut Vec<&'a str>,
        out: &mut Vec<(String, &'a Permission)>,
    ) {
        for (name, node) in &self.entries {
            prefix.push(name);
            match node {
                FeatureNode::Leaf(permission) => out.push((prefix.join("."), permission)),
                FeatureNode::Branch(child) => child.collect_leaves(prefix, out),
            }
            prefix.pop();
        }
    }

    fn from_json_map(map: Map<String, Value>) -> Result<Self, String> {
        let mut tree = Self::new();
        for (name, value) in map {
            if name.is_empty() || name.contains('.') {
                return Err(format!("invalid feature name '{name}'"));
            }
            let node = FeatureNode::from_json(value).map_err(|e| format!("{name}: {e}"))?;
            tree.insert(name, node);
        }
        Ok(tree)
    }
}

impl FeatureNode {
    fn from_json(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) if map.contains_key("view") => {
                serde_json::from_value(Value::Object(map))
                    .map(FeatureNode::Leaf)
                    .map_err(|e| e.to_string())
            }
            Value::Object(map) => FeatureTree::from_json_map(map).map(FeatureNode::Branch),
            other => Err(format!("expected an object, found {other}")),
        }
    }
}

impl Serialize for FeatureTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, node) in &self.entries {
            map.serialize_entry(name, node)?;
        }
        map.end()
    }
}

impl Serialize for FeatureNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Leaf(permission) => permission.serialize(serializer),
            Self::Branch(tree) => tree.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FeatureTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(map) if map.contains_key("view") => Err(de::Error::custom(
                "expected a feature tree, found a permission leaf",
            )),
            Value::Object(map) => Self::from_json_map(map).map_err(de::Error::custom),
            other => Err(de::Error::custom(format!(
                "expected a feature tree, found {other}"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for FeatureNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::from_json(Value::deserialize(deserializer)?).map_err(de::Error::custom)
    }
}
