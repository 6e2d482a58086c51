//! Include parameter parsing
//!
//! `"comments.author,uid"` becomes:
//!
//! ```text
//! comments
//! └── author
//! uid
//! ```

use crate::core::error::{IncludeResult, PathError};
use indexmap::IndexMap;

/// Ordered tree of relationship field names
///
/// Each level keeps the order in which fields first appeared in the include
/// parameter and never holds the same field twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeTree {
    children: IndexMap<String, IncludeTree>,
}

impl IncludeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list of dotted paths
    ///
    /// Empty or whitespace-only input yields an empty tree. An empty entry
    /// between commas, or a path with an empty segment, is malformed.
    pub fn parse(raw: &str) -> IncludeResult<Self> {
        let mut tree = Self::new();
        if raw.trim().is_empty() {
            return Ok(tree);
        }
        for path in raw.split(',') {
            let segments = split_path(path)?;
            tree.insert_path(&segments);
        }
        Ok(tree)
    }

    /// Parse, keeping the well-formed paths and returning the malformed ones
    pub fn parse_lossy(raw: &str) -> (Self, Vec<PathError>) {
        let mut tree = Self::new();
        let mut errors = Vec::new();
        if raw.trim().is_empty() {
            return (tree, errors);
        }
        for path in raw.split(',') {
            match split_path(path) {
                Ok(segments) => tree.insert_path(&segments),
                Err(err) => errors.push(err),
            }
        }
        (tree, errors)
    }

    /// Build a tree from already-split paths
    pub fn from_paths<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a [&'a str]>,
    {
        let mut tree = Self::new();
        for segments in paths {
            tree.insert_path(segments);
        }
        tree
    }

    /// Insert one path, sharing existing parents
    pub fn insert_path(&mut self, segments: &[&str]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        self.children
            .entry((*first).to_string())
            .or_default()
            .insert_path(rest);
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of fields at this level
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&IncludeTree> {
        self.children.get(field)
    }

    /// Fields at this level with their subtrees, in tree order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IncludeTree)> {
        self.children
            .iter()
            .map(|(field, child)| (field.as_str(), child))
    }

    /// Dotted form of every root-to-leaf path, in tree order
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (field, child) in &self.children {
            if child.is_leaf() {
                paths.push(field.clone());
            } else {
                paths.extend(
                    child
                        .paths()
                        .into_iter()
                        .map(|rest| format!("{}.{}", field, rest)),
                );
            }
        }
        paths
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, PathError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PathError::malformed(path, "empty include path"));
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(PathError::malformed(path, "empty path segment"));
    }
    Ok(segments)
}
