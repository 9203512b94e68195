//! Request path resolution.
//!
//! The resource tree is tiny: `/groups/{group}` is the only leaf. Paths are
//! resolved in one pass over their segments:
//!
//! ```text
//! Root --"groups"--> GroupsCollection --"{group}"--> Group (leaf)
//!   \--anything else--> NotFound
//! ```
//!
//! Resolution never consults the store, so a group that has no records yet
//! still resolves.

use axum::http::Method;

/// Methods a group accepts.
pub const GROUP_METHODS: &str = "GET, POST";

/// Where a request path lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// No resource at this path.
    NotFound,
    /// `/groups` itself. Not a leaf, so requests to it are not served.
    GroupsCollection,
    /// `/groups/{group}`, with an optional trailing slash.
    Group(String),
}

impl Route {
    /// Resolves a request path.
    pub fn resolve(path: &str) -> Self {
        let path = path.strip_prefix('/').unwrap_or(path);
        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            ["groups"] | ["groups", ""] => Route::GroupsCollection,
            ["groups", group] | ["groups", group, ""] if !group.is_empty() => {
                Route::Group((*group).to_string())
            }
            _ => Route::NotFound,
        }
    }
}

/// What a group does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction {
    /// GET: query records.
    Query,
    /// POST: append records.
    Append,
}

impl GroupAction {
    /// Maps a method to an action; `None` for unsupported methods.
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(GroupAction::Query),
            Method::POST => Some(GroupAction::Append),
            _ => None,
        }
    }
}
