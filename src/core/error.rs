//! Desktop-level error types.
//!
//! None of these are fatal: the shell turns each into a dialog (or, for
//! content failures, an inline message inside the owning window) and leaves
//! existing window state untouched.

use thiserror::Error;

use super::registry::{AccessLevel, AppId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesktopError {
    #[error("Unknown app: {0}")]
    UnknownApp(AppId),

    #[error("access to {app} requires level {required}, current level is {current}")]
    AccessDenied {
        app: AppId,
        required: AccessLevel,
        current: AccessLevel,
    },

    #[error("no open window for {0}")]
    WindowNotOpen(AppId),

    #[error("invalid deep link: {0}")]
    InvalidFragment(String),
}

/// A mini-app failed to load its own data. Rendered inside that app's window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{app}: {reason}")]
pub struct ContentLoadError {
    pub app: AppId,
    pub reason: String,
}

impl ContentLoadError {
    pub fn new(app: &AppId, reason: impl Into<String>) -> Self {
        Self {
            app: app.clone(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for `Result<T, DesktopError>`.
pub type Result<T> = std::result::Result<T, DesktopError>;
