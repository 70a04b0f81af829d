//! Routes exposed to the view layer and the navigation seam the store drives.

use std::fmt;
use std::sync::Mutex;

use tracing::debug;

use crate::domain::posts::PostId;
use crate::util::lock::mutex_lock;

const SOURCE: &str = "application::navigation";

/// A view the front end can show. Post ids stay in their route (string) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    NewPost,
    Post(String),
    Edit(String),
    About,
    Missing,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        let mut segments = trimmed.split('/').skip(1);

        match (segments.next(), segments.next(), segments.next()) {
            (None, _, _) | (Some(""), None, _) => Route::Home,
            (Some("post"), None, _) => Route::NewPost,
            (Some("post"), Some(id), None) if !id.is_empty() => Route::Post(id.to_string()),
            (Some("edit"), Some(id), None) if !id.is_empty() => Route::Edit(id.to_string()),
            (Some("about"), None, _) => Route::About,
            _ => Route::Missing,
        }
    }

    pub fn post(id: PostId) -> Self {
        Route::Post(id.to_string())
    }

    pub fn edit(id: PostId) -> Self {
        Route::Edit(id.to_string())
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::NewPost => "/post".to_string(),
            Route::Post(id) => format!("/post/{id}"),
            Route::Edit(id) => format!("/edit/{id}"),
            Route::About => "/about".to_string(),
            Route::Missing => "/missing".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that keeps every visited route in order.
#[derive(Debug, Default)]
pub struct NavigationHistory {
    entries: Mutex<Vec<Route>>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        mutex_lock(&self.entries, SOURCE, "current").last().cloned()
    }

    pub fn history(&self) -> Vec<Route> {
        mutex_lock(&self.entries, SOURCE, "history").clone()
    }
}

impl Navigator for NavigationHistory {
    fn navigate(&self, route: Route) {
        debug!(route = %route, "navigate");
        mutex_lock(&self.entries, SOURCE, "navigate").push(route);
    }
}
