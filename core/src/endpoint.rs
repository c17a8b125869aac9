//! The fixed set of backend endpoints the client talks to.

use crate::http::HttpMethod;

/// Static description of one backend route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: HttpMethod,
    /// Path relative to the base URL. `{task_id}` is the only placeholder.
    pub path: &'static str,
    pub expects_body: bool,
    pub expects_query: bool,
}

impl Endpoint {
    const fn new(
        method: HttpMethod,
        path: &'static str,
        expects_body: bool,
        expects_query: bool,
    ) -> Self {
        Self {
            method,
            path,
            expects_body,
            expects_query,
        }
    }

    /// Render the path, substituting `task_id` into the placeholder if there is one.
    pub fn render(&self, task_id: Option<&str>) -> String {
        match task_id {
            Some(id) => self.path.replace("{task_id}", id),
            None => self.path.to_string(),
        }
    }
}

pub const UPLOAD: Endpoint = Endpoint::new(HttpMethod::Post, "/upload", true, false);
pub const PROCESS: Endpoint = Endpoint::new(HttpMethod::Post, "/process", true, false);
pub const PROCESS_QUERY: Endpoint = Endpoint::new(HttpMethod::Post, "/process", false, true);
pub const TASK_STATUS: Endpoint = Endpoint::new(HttpMethod::Get, "/task/{task_id}", false, false);
pub const DELETE_TASK: Endpoint =
    Endpoint::new(HttpMethod::Delete, "/task/{task_id}", false, false);
pub const DOWNLOAD: Endpoint = Endpoint::new(HttpMethod::Get, "/download/{task_id}", false, false);
pub const GET_CONFIG: Endpoint = Endpoint::new(HttpMethod::Get, "/config", false, false);
pub const UPDATE_CONFIG: Endpoint = Endpoint::new(HttpMethod::Post, "/config", false, true);
pub const LIST_TASKS: Endpoint = Endpoint::new(HttpMethod::Get, "/tasks", false, false);
pub const HEALTH: Endpoint = Endpoint::new(HttpMethod::Get, "/health", false, false);

pub const ALL: [Endpoint; 10] = [
    UPLOAD,
    PROCESS,
    PROCESS_QUERY,
    TASK_STATUS,
    DELETE_TASK,
    DOWNLOAD,
    GET_CONFIG,
    UPDATE_CONFIG,
    LIST_TASKS,
    HEALTH,
];
