//! Toolkit-independent desktop core.

pub mod auth;
pub mod cipher;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod registry;
pub mod router;
pub mod shell;
pub mod window_manager;

pub use error::{ContentLoadError, DesktopError};
pub use geometry::{Point, Rect, Size};
pub use registry::{AccessLevel, AppId, AppRegistry};
pub use shell::Shell;
