//! API route table
//!
//! Exact-match path table mapping request paths to API endpoints. Built and
//! validated once at startup; lookups never allocate.

use std::collections::HashMap;

use thiserror::Error;

use crate::api::Endpoint;

/// Route table validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("route path '{0}' must start with '/'")]
    RelativePath(String),
    #[error("route path '{0}' is registered more than once")]
    DuplicatePath(String),
}

/// Exact-match table of API paths
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<String, Endpoint>,
}

impl RouteTable {
    /// Build a table from `(path, endpoint)` pairs
    pub fn new<I, S>(entries: I) -> Result<Self, RouteTableError>
    where
        I: IntoIterator<Item = (S, Endpoint)>,
        S: Into<String>,
    {
        let mut routes = HashMap::new();
        for (path, endpoint) in entries {
            let path = path.into();
            if !path.starts_with('/') {
                return Err(RouteTableError::RelativePath(path));
            }
            if routes.contains_key(&path) {
                return Err(RouteTableError::DuplicatePath(path));
            }
            routes.insert(path, endpoint);
        }
        Ok(Self { routes })
    }

    /// The four endpoints the front end talks to
    pub fn standard() -> Result<Self, RouteTableError> {
        Self::new([
            ("/api/example", Endpoint::Example),
            ("/api/session", Endpoint::Session),
            ("/api/save", Endpoint::Save),
            ("/api/load", Endpoint::Load),
        ])
    }

    /// Exact match only: no prefixes, no trailing-slash folding
    pub fn lookup(&self, path: &str) -> Option<Endpoint> {
        self.routes.get(path).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(table.lookup("/api/example"), Some(Endpoint::Example));
        assert_eq!(table.lookup("/api/session"), Some(Endpoint::Session));
        assert_eq!(table.lookup("/api/save"), Some(Endpoint::Save));
        assert_eq!(table.lookup("/api/load"), Some(Endpoint::Load));
    }

    #[test]
    fn test_lookup_is_exact() {
        let table = RouteTable::standard().unwrap();
        assert_eq!(table.lookup("/api/load/"), None);
        assert_eq!(table.lookup("/api/loadx"), None);
        assert_eq!(table.lookup("/API/load"), None);
        assert_eq!(table.lookup("/api"), None);
        assert_eq!(table.lookup("/"), None);
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let err = RouteTable::new([
            ("/api/save", Endpoint::Save),
            ("/api/save", Endpoint::Load),
        ])
        .unwrap_err();
        assert_eq!(err, RouteTableError::DuplicatePath("/api/save".to_string()));
    }

    #[test]
    fn test_relative_path_rejected() {
        let err = RouteTable::new([("api/save", Endpoint::Save)]).unwrap_err();
        assert_eq!(err, RouteTableError::RelativePath("api/save".to_string()));
    }
}
