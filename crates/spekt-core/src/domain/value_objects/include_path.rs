//! Eager-load path value object

use serde::{Deserialize, Serialize};
use std::fmt;

/// A navigation path from the entity to a related entity or collection,
/// eager-loaded alongside the main result set.
///
/// Order of addition does not matter functionally; each path is applied
/// to the query independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncludePath {
    path: String,
}

impl IncludePath {
    /// Create a path; segments are separated by `.`
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Path segments from the entity outward
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('.')
    }
}

impl fmt::Display for IncludePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for IncludePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_split_on_dots() {
        let path = IncludePath::new("orders.lines.product");
        let segments: Vec<&str> = path.segments().collect();
        assert_eq!(segments, vec!["orders", "lines", "product"]);
        assert_eq!(path.to_string(), "orders.lines.product");
    }
}
