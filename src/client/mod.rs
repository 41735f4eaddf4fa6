use thiserror::Error;

use crate::models::{ScheduleFormError, TaskFormError};

pub mod api;
pub mod attachments;
pub mod planner;
pub mod store;
pub mod views;
pub mod workset;

pub use api::{Api, HttpApi};
pub use planner::Planner;
pub use store::{LocalStore, Session, Theme, UserData};
pub use workset::Workset;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the request; `message` is its error body.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error(transparent)]
    TaskForm(#[from] TaskFormError),
    #[error(transparent)]
    ScheduleForm(#[from] ScheduleFormError),
    /// A client-side form check failed; the string is shown to the user as-is.
    #[error("{0}")]
    Form(String),
    #[error("Task {0} not found")]
    TaskNotFound(u32),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Not signed in")]
    NoSession,
}

impl ClientError {
    /// True for 401 and 403 responses, which invalidate the cached session.
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Api { status: 401 | 403, .. })
    }
}
