//! Object key construction.
//!
//! Keys are `/`-separated and never start or end with a separator. Request
//! paths are cleaned as rooted paths before joining, so `..` segments stop at
//! the deployment root and cannot reach a sibling deployment.

/// Clean a rooted path into its segments (`/a/./b/../c` → `["a", "c"]`).
fn clean_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments
}

/// Key of the directory-like prefix holding a deployment's objects.
pub fn deployment_prefix(prefix: &str, deployment_id: &str) -> String {
    join(&[prefix, deployment_id])
}

/// Key of the object serving `path` for a deployment.
pub fn object_key(prefix: &str, deployment_id: &str, path: &str) -> String {
    let base = deployment_prefix(prefix, deployment_id);
    let rest = clean_segments(path).join("/");
    join(&[&base, &rest])
}

/// Join key parts, dropping empty segments and doubled separators.
pub fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|part| part.split('/'))
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
