//! Window content. Each app kind is a small state machine over [`KeyInput`]
//! that renders plain [`ContentLine`]s; the shell applies whatever
//! [`AppAction`] comes back.

pub mod alibi;
pub mod encryption;
pub mod feed;
pub mod folder;
pub mod listings;
pub mod map;
pub mod system;

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::core::error::ContentLoadError;
use crate::core::geometry::Point;
use crate::core::registry::{AccessLevel, AppDescriptor, AppId, AppRegistry, ContentKind};
use crate::core::router::Params;

pub use alibi::AlibiApp;
pub use encryption::EncryptionApp;
pub use feed::FeedApp;
pub use folder::FolderApp;
pub use listings::ListingsApp;
pub use map::MapApp;
pub use system::SystemApp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    Enter,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Esc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    None,
    Open(AppId),
    CloseSelf,
    /// Replace the deep-link params for this window.
    UpdateLink(Params),
    Dialog { title: String, message: String },
}

impl AppAction {
    pub fn dialog(title: &str, message: impl Into<String>) -> Self {
        Self::Dialog {
            title: title.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Normal,
    Heading,
    Selected,
    Dim,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    pub text: String,
    pub tone: Tone,
}

impl ContentLine {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn normal(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Normal)
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Heading)
    }

    pub fn dim(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Dim)
    }

    pub fn blank() -> Self {
        Self::normal("")
    }

    /// `Selected` when `on`, otherwise `Normal`.
    pub fn choice(text: impl Into<String>, on: bool) -> Self {
        Self::new(text, if on { Tone::Selected } else { Tone::Normal })
    }
}

/// What a mini-app may look at when it starts.
pub struct LaunchContext<'a> {
    pub app: &'a AppDescriptor,
    pub registry: &'a AppRegistry,
    pub level: AccessLevel,
    pub data_dir: &'a Path,
    pub link_origin: &'a str,
}

pub enum MiniApp {
    System(SystemApp),
    Folder(FolderApp),
    Encryption(EncryptionApp),
    Listings(ListingsApp),
    Feed(FeedApp),
    Map(MapApp),
    Alibi(AlibiApp),
    Placeholder(AppId),
    /// Data failed to load; shown inline in the window.
    Failed(ContentLoadError),
}

impl MiniApp {
    pub fn launch(ctx: &LaunchContext<'_>, params: &Params) -> Self {
        let app = match &ctx.app.content {
            ContentKind::System => Ok(Self::System(SystemApp::new())),
            ContentKind::Folder(_) => Ok(Self::Folder(FolderApp::new(
                ctx.registry.sub_apps(ctx.app.id.as_str()),
                ctx.level,
            ))),
            ContentKind::Encryption => Ok(Self::Encryption(EncryptionApp::new())),
            ContentKind::Listings => {
                ListingsApp::load(ctx.data_dir, &ctx.app.id, ctx.link_origin).map(Self::Listings)
            }
            ContentKind::Feed => FeedApp::load(ctx.data_dir, &ctx.app.id).map(Self::Feed),
            ContentKind::Map(source) => Ok(Self::Map(MapApp::new(*source))),
            ContentKind::Alibi => AlibiApp::load(ctx.data_dir, &ctx.app.id).map(Self::Alibi),
            ContentKind::Placeholder => Ok(Self::Placeholder(ctx.app.id.clone())),
        };
        let mut app = app.unwrap_or_else(|e| {
            log::warn!("{e}");
            Self::Failed(e)
        });
        app.apply_params(params);
        app
    }

    /// Forward deep-link params to an already running app.
    pub fn apply_params(&mut self, params: &Params) {
        if params.is_empty() {
            return;
        }
        if let Self::Listings(app) = self {
            app.apply_params(params);
        }
    }

    pub fn set_access_level(&mut self, level: AccessLevel) {
        if let Self::Folder(app) = self {
            app.set_access_level(level);
        }
    }

    pub fn key(&mut self, key: KeyInput) -> AppAction {
        match self {
            Self::System(app) => app.key(key),
            Self::Folder(app) => app.key(key),
            Self::Encryption(app) => app.key(key),
            Self::Listings(app) => app.key(key),
            Self::Feed(app) => app.key(key),
            Self::Map(app) => app.key(key),
            Self::Alibi(app) => app.key(key),
            Self::Placeholder(_) | Self::Failed(_) => AppAction::None,
        }
    }

    /// A click at a cell relative to the content area.
    pub fn click(&mut self, cell: Point) -> AppAction {
        let Ok(row) = usize::try_from(cell.y) else {
            return AppAction::None;
        };
        match self {
            Self::System(app) => app.click(row),
            Self::Folder(app) => app.click(row),
            Self::Feed(app) => app.click(row),
            Self::Alibi(app) => app.click(row),
            _ => AppAction::None,
        }
    }

    pub fn lines(&self, width: usize) -> Vec<ContentLine> {
        match self {
            Self::System(app) => app.lines(),
            Self::Folder(app) => app.lines(),
            Self::Encryption(app) => app.lines(),
            Self::Listings(app) => app.lines(width),
            Self::Feed(app) => app.lines(width),
            Self::Map(app) => app.lines(),
            Self::Alibi(app) => app.lines(width),
            Self::Placeholder(id) => vec![
                ContentLine::blank(),
                ContentLine::normal(format!("  {id}")),
                ContentLine::dim("  Nothing to see here yet."),
            ],
            Self::Failed(e) => vec![
                ContentLine::new("Error loading content. Please try again later.", Tone::Error),
                ContentLine::dim(e.reason.clone()),
            ],
        }
    }
}

/// Read `<data dir>/<file>` as JSON, mapping any failure to a [`ContentLoadError`].
pub(crate) fn load_data<T: DeserializeOwned>(
    data_dir: &Path,
    file: &str,
    app: &AppId,
) -> Result<T, ContentLoadError> {
    let path = data_dir.join(file);
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| ContentLoadError::new(app, format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| ContentLoadError::new(app, format!("{}: {e}", path.display())))
}

/// Truncate to at most `max` characters.
pub(crate) fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Pad or truncate to exactly `width` characters.
pub(crate) fn fit(s: &str, width: usize) -> String {
    let mut out = clip(s, width);
    let len = out.chars().count();
    out.extend(std::iter::repeat(' ').take(width - len));
    out
}
