//! Pathname matching logic.
//!
//! # Responsibilities
//! - Match a request pathname against a view's configured pathname
//!
//! # Design Decisions
//! - Exact match, case-sensitive
//! - One trailing slash is tolerated (`/covid/single-variant/`)
//! - No regex or prefix matching; a view owns exactly one pathname

/// Matches the pathname of a dashboard URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatcher {
    path: String,
}

impl PathMatcher {
    /// Create a new path matcher. A trailing slash in `path` is ignored.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => path,
        };
        Self { path }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true if `pathname` names this view.
    pub fn matches(&self, pathname: &str) -> bool {
        let pathname = match pathname.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => pathname,
        };
        pathname == self.path
    }
}
