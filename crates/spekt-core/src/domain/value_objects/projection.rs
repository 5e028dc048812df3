//! Projection descriptor value object

use crate::domain::value_objects::IncludePath;
use serde_json::Value;
use std::collections::HashMap;

/// Tells a projector how to map an entity result set into DTOs.
///
/// The target DTO type is a generic parameter at the call site, not data.
/// The descriptor carries only which nested members to materialize and an
/// opaque parameter bag forwarded to the projector unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProjectionDescriptor {
    expand: Vec<IncludePath>,
    parameters: HashMap<String, Value>,
}

impl ProjectionDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request materialization of a nested member
    pub fn expand_member(mut self, path: impl Into<IncludePath>) -> Self {
        self.expand.push(path.into());
        self
    }

    /// Forward an opaque parameter to the projector
    pub fn parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn members_to_expand(&self) -> &[IncludePath] {
        &self.expand
    }

    pub fn parameters(&self) -> &HashMap<String, Value> {
        &self.parameters
    }
}
