//! Deployment manifest: the set of object paths that exist for a deployment.

use std::collections::HashSet;

/// Read-only membership set of object paths.
///
/// Paths are stored exactly as given; the matcher compares them byte for byte
/// against the request path (or a rewritten candidate).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    paths: HashSet<String>,
}

impl Manifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manifest from an object listing.
    ///
    /// Every key starting with `base` becomes a rooted path (`base/a/b` →
    /// `/a/b`). Keys outside `base` and keys listed in `excluded` are ignored.
    pub fn from_listing<I, S>(keys: I, base: &str, excluded: &[&str]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let base = base.trim_end_matches('/');
        keys.into_iter()
            .filter_map(|key| {
                let rest = key.as_ref().strip_prefix(base)?;
                let rest = rest.strip_prefix('/')?;
                if rest.is_empty() || excluded.contains(&rest) {
                    return None;
                }
                Some(format!("/{}", rest))
            })
            .collect()
    }

    /// Returns true if `path` is a known object path.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths in lexical order, for stable output.
    pub fn sorted(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.paths.iter().cloned().collect();
        paths.sort();
        paths
    }
}

impl<S: Into<String>> FromIterator<S> for Manifest {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}
