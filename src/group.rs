use crate::error::StoreError;
use crate::node::Node;
use crate::printer;
use crate::value::{FromTyped, TypedValue};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    #[default]
    Strict,
    Lenient,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataGroup {
    groups: BTreeMap<String, DataGroup>,
    leaves: BTreeMap<String, TypedValue>,
}

impl DataGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.leaves.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&DataGroup> {
        self.groups.get(name)
    }

    pub fn child_mut(
        &mut self,
        name: &str,
        create_if_absent: bool,
    ) -> Result<&mut DataGroup, StoreError> {
        if !create_if_absent {
            return self
                .groups
                .get_mut(name)
                .ok_or_else(|| StoreError::MissingChild(name.to_string()));
        }

        if self.leaves.contains_key(name) {
            return Err(StoreError::NameConflict {
                name: name.to_string(),
                taken_by: "leaf",
            });
        }
        if !self.groups.contains_key(name) {
            log::debug!("creating group '{}'", name);
        }
        Ok(self.groups.entry(name.to_string()).or_default())
    }

    pub fn insert_child(
        &mut self,
        name: &str,
        group: DataGroup,
    ) -> Result<Option<DataGroup>, StoreError> {
        if self.leaves.contains_key(name) {
            return Err(StoreError::NameConflict {
                name: name.to_string(),
                taken_by: "leaf",
            });
        }
        Ok(self.groups.insert(name.to_string(), group))
    }

    pub fn remove_child(&mut self, name: &str) -> Option<DataGroup> {
        self.groups.remove(name)
    }

    pub fn path(&self, segments: &[&str]) -> Option<&DataGroup> {
        let mut group = self;
        for segment in segments {
            group = group.child(segment)?;
        }
        Some(group)
    }

    pub fn path_mut(
        &mut self,
        segments: &[&str],
        create_if_absent: bool,
    ) -> Result<&mut DataGroup, StoreError> {
        let mut group = self;
        for segment in segments {
            group = group.child_mut(segment, create_if_absent)?;
        }
        Ok(group)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &DataGroup)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn leaves(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.leaves.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn contains_child(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn contains_leaf(&self, name: &str) -> bool {
        self.leaves.contains_key(name)
    }

    pub fn leaf(&self, name: &str) -> Option<&TypedValue> {
        self.leaves.get(name)
    }

    /// `None` for a missing leaf and for a leaf of another type.
    pub fn get<T: FromTyped>(&self, name: &str) -> Option<T> {
        self.leaves.get(name).and_then(T::from_typed)
    }

    pub fn get_or<T: FromTyped>(&self, name: &str, default: T) -> T {
        self.get(name).unwrap_or(default)
    }

    pub fn set(&mut self, name: &str, value: impl Into<TypedValue>) -> Result<(), StoreError> {
        if self.groups.contains_key(name) {
            return Err(StoreError::NameConflict {
                name: name.to_string(),
                taken_by: "group",
            });
        }
        let value = value.into();
        if !value.is_finite() {
            return Err(StoreError::NonFiniteFloat(name.to_string()));
        }
        self.leaves.insert(name.to_string(), value);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<TypedValue> {
        self.leaves.remove(name)
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.leaves.clear();
    }

    /// Replaces this group's contents with a deep copy of `source`.
    pub fn copy_from(&mut self, source: &DataGroup) -> &mut Self {
        self.clear();
        for (name, child) in &source.groups {
            let mut copy = DataGroup::new();
            copy.copy_from(child);
            self.groups.insert(name.clone(), copy);
        }
        self.leaves = source.leaves.clone();
        self
    }

    pub fn to_node(&self) -> Node {
        let mut entries = BTreeMap::new();
        for (name, value) in &self.leaves {
            entries.insert(name.clone(), value.encode());
        }
        for (name, group) in &self.groups {
            entries.insert(name.clone(), group.to_node());
        }
        Node::Object(entries)
    }

    pub fn from_node(&mut self, node: &Node) -> Result<&mut Self, StoreError> {
        self.from_node_with(node, DecodeMode::Strict)
    }

    /// Rebuilds this group from `node`. On error the group is left as it
    /// was.
    pub fn from_node_with(
        &mut self,
        node: &Node,
        mode: DecodeMode,
    ) -> Result<&mut Self, StoreError> {
        *self = Self::build(node, mode, "")?;
        Ok(self)
    }

    fn build(node: &Node, mode: DecodeMode, at: &str) -> Result<DataGroup, StoreError> {
        let entries = node.as_object().ok_or_else(|| {
            StoreError::decode(format!(
                "group '{}' must be an object, found {}",
                display_path(at),
                node.shape().describe()
            ))
        })?;

        let mut group = DataGroup::new();
        for (name, value) in entries {
            let path = format!("{}/{}", at, name);
            match value {
                Node::Object(_) => {
                    group
                        .groups
                        .insert(name.clone(), Self::build(value, mode, &path)?);
                }
                Node::Array(_) => match TypedValue::decode(value) {
                    Ok(leaf) => {
                        group.leaves.insert(name.clone(), leaf);
                    }
                    Err(err) => skip_or_fail(mode, &path, err)?,
                },
                Node::Scalar(_) => skip_or_fail(
                    mode,
                    &path,
                    StoreError::decode("entry is neither a group nor a leaf"),
                )?,
            }
        }
        Ok(group)
    }

    pub fn digest(&self) -> [u8; 32] {
        let text = printer::print(&self.to_node(), false);
        let digest = Sha256::digest(text.as_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    }
}

fn display_path(at: &str) -> &str {
    if at.is_empty() { "/" } else { at }
}

fn skip_or_fail(mode: DecodeMode, path: &str, err: StoreError) -> Result<(), StoreError> {
    let err = match err {
        StoreError::Decode(msg) => StoreError::Decode(format!("{}: {}", path, msg)),
        other => other,
    };
    match mode {
        DecodeMode::Strict => Err(err),
        DecodeMode::Lenient => {
            log::warn!("skipping entry: {}", err);
            Ok(())
        }
    }
}
