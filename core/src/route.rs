//! Screens the shell maps paths to.

use std::fmt;

use crate::types::FeatureId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/`
    List,
    /// `/features/new`
    Create,
    /// `/features/{id}/edit`
    Edit(FeatureId),
}

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Some(Route::List);
        }
        let segments: Vec<&str> = trimmed.split('/').collect();
        match segments.as_slice() {
            ["features", "new"] => Some(Route::Create),
            ["features", id, "edit"] => id.parse().ok().map(Route::Edit),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::List => "/".to_string(),
            Route::Create => "/features/new".to_string(),
            Route::Edit(id) => format!("/features/{id}/edit"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
