//! Storage key canonicalization.
//!
//! Every read path derives its storage key through [`join`], so registry,
//! latest-pointer and artifact lookups share one addressing scheme with the
//! process that writes the stores:
//!
//! ```text
//! catalog/<kind>/registry.json
//! catalog/<kind>/<id>/latest.json
//! catalog/<kind>/<id>/<version>/<file>
//! ```

/// Default first segment of every storage key.
pub const DEFAULT_KEY_ROOT: &str = "catalog";

/// Object name of the per-kind registry listing.
pub const REGISTRY_FILE: &str = "registry.json";

/// Object name of the per-id latest pointer.
pub const LATEST_FILE: &str = "latest.json";

/// Join path segments into a canonical storage key.
///
/// Backslashes become forward slashes, runs of slashes collapse into one and
/// any leading slash is removed. The function is total and idempotent:
/// `join(&[&join(parts)]) == join(parts)`.
///
/// ```
/// use catalog_gateway::key::join;
///
/// assert_eq!(join(&["/catalog/", "tools", "x\\1.0", "a//b.json"]), "catalog/tools/x/1.0/a/b.json");
/// ```
pub fn join(segments: &[&str]) -> String {
    let mut key = String::new();

    for segment in segments {
        if !key.is_empty() {
            key.push('/');
        }
        key.push_str(segment);
    }

    let mut canonical = String::with_capacity(key.len());
    for c in key.chars() {
        let c = if c == '\\' { '/' } else { c };
        if c == '/' && (canonical.is_empty() || canonical.ends_with('/')) {
            continue;
        }
        canonical.push(c);
    }

    canonical
}

/// Derives the three kinds of storage key under a common root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogKeys {
    root: String,
}

impl CatalogKeys {
    /// Create a key deriver rooted at `root` (normally `catalog`).
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    /// The configured root segment.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// `catalog/<kind>/registry.json`
    pub fn registry(&self, kind: &str) -> String {
        join(&[&self.root, kind, REGISTRY_FILE])
    }

    /// `catalog/<kind>/<id>/latest.json`
    pub fn latest(&self, kind: &str, id: &str) -> String {
        join(&[&self.root, kind, id, LATEST_FILE])
    }

    /// `catalog/<kind>/<id>/<version>/<file>`
    pub fn artifact(&self, kind: &str, id: &str, version: &str, file: &str) -> String {
        join(&[&self.root, kind, id, version, file])
    }
}

impl Default for CatalogKeys {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_ROOT)
    }
}
