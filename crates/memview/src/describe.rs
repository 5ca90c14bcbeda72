//! Read-only descriptor bundles for diagnostics and introspection.
//!
//! These records carry structured context into error reports and tooling
//! output; nothing in the core keys behavior off them.

use serde::Serialize;
use std::collections::BTreeMap;

/// Type-level facts about a structure: its name, byte length and any
/// additional named facts a kind chooses to surface.
#[derive(Debug, Clone, Serialize)]
pub struct TypeDescriptor {
    pub structure_name: String,
    pub size: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub additional: BTreeMap<String, serde_json::Value>,
}

impl TypeDescriptor {
    pub fn new(structure_name: impl Into<String>, size: u64) -> Self {
        TypeDescriptor {
            structure_name: structure_name.into(),
            size,
            additional: BTreeMap::new(),
        }
    }

    /// Attach an additional named fact.
    pub fn with_fact(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.additional.insert(name.into(), value.into());
        self
    }
}

/// Instance-level identity: where a view sits and, if it was materialized
/// as a member of a composite, which member and under which parent.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceDescriptor {
    pub layer_name: String,
    pub byte_offset: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<InstanceDescriptor>>,
}

impl InstanceDescriptor {
    pub fn new(layer_name: impl Into<String>, byte_offset: u64) -> Self {
        InstanceDescriptor {
            layer_name: layer_name.into(),
            byte_offset,
            member_name: None,
            parent: None,
        }
    }
}
