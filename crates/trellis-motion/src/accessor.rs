//! Property accessors
//!
//! An accessor reads and writes one logical property of a node. Its
//! [`AccessorKey`] decides which changes compete: two accessors with equal keys
//! address the same property, so their changes are serialized.

use crate::interpolation::Animatable;
use std::fmt;
use trellis_core::{Bindable, Error, HostTree, NodeId, Result};

/// Identity of the property an accessor addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessorKey {
    /// Presence of a class tag
    Class(String),
    /// Whether the node is enabled
    Enabled,
    /// Text content as a string
    Text,
    /// Text content read and written as an integer
    IntegerText,
    /// A numeric style property
    Style(String),
    /// Host-defined property, `kind` names the accessor type
    Custom { kind: &'static str, param: String },
}

impl fmt::Display for AccessorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessorKey::Class(class) => write!(f, "class.{}", class),
            AccessorKey::Enabled => write!(f, "enabled"),
            AccessorKey::Text => write!(f, "text"),
            AccessorKey::IntegerText => write!(f, "text(int)"),
            AccessorKey::Style(property) => write!(f, "style.{}", property),
            AccessorKey::Custom { kind, param } => write!(f, "{}({})", kind, param),
        }
    }
}

/// Read/write capability for one property of a node
pub trait Accessor: Clone + fmt::Debug + 'static {
    type Value: Animatable + Bindable;

    fn key(&self) -> AccessorKey;

    fn get(&self, tree: &dyn HostTree, node: NodeId) -> Result<Self::Value>;

    fn set(&self, tree: &mut dyn HostTree, node: NodeId, value: &Self::Value) -> Result<()>;

    /// Check whether both accessors address the same property
    fn same_property<B: Accessor>(&self, other: &B) -> bool {
        self.key() == other.key()
    }
}

/// Presence of a class tag, as a boolean
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAccessor {
    class: String,
}

impl ClassAccessor {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }
}

impl Accessor for ClassAccessor {
    type Value = bool;

    fn key(&self) -> AccessorKey {
        AccessorKey::Class(self.class.clone())
    }

    fn get(&self, tree: &dyn HostTree, node: NodeId) -> Result<bool> {
        if !tree.contains(node) {
            return Err(Error::NodeNotFound(node));
        }
        Ok(tree.has_class(node, &self.class))
    }

    fn set(&self, tree: &mut dyn HostTree, node: NodeId, value: &bool) -> Result<()> {
        tree.set_class(node, &self.class, *value)
    }
}

/// Enabled state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnabledAccessor;

impl Accessor for EnabledAccessor {
    type Value = bool;

    fn key(&self) -> AccessorKey {
        AccessorKey::Enabled
    }

    fn get(&self, tree: &dyn HostTree, node: NodeId) -> Result<bool> {
        if !tree.contains(node) {
            return Err(Error::NodeNotFound(node));
        }
        Ok(tree.is_enabled(node))
    }

    fn set(&self, tree: &mut dyn HostTree, node: NodeId, value: &bool) -> Result<()> {
        tree.set_enabled(node, *value)
    }
}

/// Text content of a text-bearing node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextAccessor;

impl Accessor for TextAccessor {
    type Value = String;

    fn key(&self) -> AccessorKey {
        AccessorKey::Text
    }

    fn get(&self, tree: &dyn HostTree, node: NodeId) -> Result<String> {
        text_of(tree, node).map(str::to_string)
    }

    fn set(&self, tree: &mut dyn HostTree, node: NodeId, value: &String) -> Result<()> {
        tree.set_text(node, value)
    }
}

/// Text content interpreted as an integer
///
/// Text that does not parse reads as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntegerTextAccessor;

impl Accessor for IntegerTextAccessor {
    type Value = i64;

    fn key(&self) -> AccessorKey {
        AccessorKey::IntegerText
    }

    fn get(&self, tree: &dyn HostTree, node: NodeId) -> Result<i64> {
        Ok(text_of(tree, node)?.trim().parse().unwrap_or(0))
    }

    fn set(&self, tree: &mut dyn HostTree, node: NodeId, value: &i64) -> Result<()> {
        tree.set_text(node, &value.to_string())
    }
}

/// A numeric style property; unset properties read as 0.0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleAccessor {
    property: String,
}

impl StyleAccessor {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }
}

impl Accessor for StyleAccessor {
    type Value = f32;

    fn key(&self) -> AccessorKey {
        AccessorKey::Style(self.property.clone())
    }

    fn get(&self, tree: &dyn HostTree, node: NodeId) -> Result<f32> {
        if !tree.contains(node) {
            return Err(Error::NodeNotFound(node));
        }
        Ok(tree.style(node, &self.property).unwrap_or(0.0))
    }

    fn set(&self, tree: &mut dyn HostTree, node: NodeId, value: &f32) -> Result<()> {
        tree.set_style(node, &self.property, *value)
    }
}

fn text_of(tree: &dyn HostTree, node: NodeId) -> Result<&str> {
    if !tree.contains(node) {
        return Err(Error::NodeNotFound(node));
    }
    tree.text(node).ok_or(Error::NotTextBearing(node))
}
