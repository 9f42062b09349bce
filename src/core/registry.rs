//! Static table of launchable apps.
//!
//! Every other component resolves app ids against this table exactly once; the
//! `content` tag on each descriptor decides which mini-app runs in its window.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::geometry::Size;

// ── Identifiers ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AppId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for AppId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccessLevel(pub u8);

impl AccessLevel {
    /// Level everyone has without a token.
    pub const DEFAULT: AccessLevel = AccessLevel(1);
}

impl Default for AccessLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Content kinds ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSource {
    /// Layered quadrant tiles shipped with the desktop.
    Tiled,
    /// Third-party map embedded by URL.
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    System,
    Folder(Vec<AppId>),
    Encryption,
    Listings,
    Feed,
    Map(MapSource),
    Alibi,
    Placeholder,
}

// ── Descriptor ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDescriptor {
    pub id: AppId,
    pub name: String,
    pub icon: String,
    pub access_level: AccessLevel,
    pub default_size: Size,
    pub min_size: Size,
    pub show_on_desktop: bool,
    pub resizable: bool,
    pub maximizable: bool,
    pub content: ContentKind,
}

impl AppDescriptor {
    pub fn new(id: &str, name: &str, icon: &str, content: ContentKind) -> Self {
        Self {
            id: AppId::from(id),
            name: name.to_string(),
            icon: icon.to_string(),
            access_level: AccessLevel::DEFAULT,
            default_size: Size::new(48, 16),
            min_size: Size::new(24, 8),
            show_on_desktop: true,
            resizable: true,
            maximizable: true,
            content,
        }
    }

    pub fn with_access(mut self, level: u8) -> Self {
        self.access_level = AccessLevel(level);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.default_size = Size::new(width, height);
        self
    }

    pub fn with_min_size(mut self, width: u32, height: u32) -> Self {
        self.min_size = Size::new(width, height);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.show_on_desktop = false;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.resizable = false;
        self.maximizable = false;
        self
    }

    /// Size a fresh window opens with; never below the minimum.
    pub fn initial_size(&self) -> Size {
        self.default_size.max(self.min_size)
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate app id {0}")]
    Duplicate(AppId),
    #[error("folder {folder} lists unknown app {child}")]
    UnknownSubApp { folder: AppId, child: AppId },
}

#[derive(Debug, Clone)]
pub struct AppRegistry {
    apps: Vec<AppDescriptor>,
}

impl AppRegistry {
    pub fn new(apps: Vec<AppDescriptor>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for app in &apps {
            if !seen.insert(app.id.as_str()) {
                return Err(RegistryError::Duplicate(app.id.clone()));
            }
        }
        for app in &apps {
            if let ContentKind::Folder(children) = &app.content {
                if let Some(child) = children.iter().find(|c| !seen.contains(c.as_str())) {
                    return Err(RegistryError::UnknownSubApp {
                        folder: app.id.clone(),
                        child: child.clone(),
                    });
                }
            }
        }
        Ok(Self { apps })
    }

    /// The Vixen 98 app table.
    pub fn builtin() -> Self {
        Self {
            apps: builtin_apps(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&AppDescriptor> {
        self.apps.iter().find(|a| a.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppDescriptor> {
        self.apps.iter()
    }

    pub fn desktop_apps(&self) -> impl Iterator<Item = &AppDescriptor> {
        self.apps.iter().filter(|a| a.show_on_desktop)
    }

    /// Children of a folder app, in declared order. Empty for non-folders.
    pub fn sub_apps(&self, id: &str) -> Vec<&AppDescriptor> {
        match self.get(id).map(|a| &a.content) {
            Some(ContentKind::Folder(children)) => {
                children.iter().filter_map(|c| self.get(c.as_str())).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

fn folder(ids: &[&str]) -> ContentKind {
    ContentKind::Folder(ids.iter().map(|id| AppId::from(*id)).collect())
}

fn builtin_apps() -> Vec<AppDescriptor> {
    vec![
        AppDescriptor::new("system", "System", "💻", ContentKind::System)
            .with_size(52, 20)
            .with_min_size(40, 16),
        AppDescriptor::new("trash", "Trash", "🗑", folder(&[]))
            .with_size(36, 10)
            .with_min_size(24, 6),
        AppDescriptor::new(
            "documents",
            "Documents",
            "📁",
            folder(&["cookie-batch-log", "placeholder"]),
        )
        .with_access(2)
        .with_size(44, 12)
        .with_min_size(28, 8),
        AppDescriptor::new(
            "cookie-batch-log",
            "Cookie Batch Log",
            "🍪",
            ContentKind::Placeholder,
        )
        .hidden(),
        AppDescriptor::new(
            "cookie-delivery-map",
            "Cookie Deliveries",
            "🍪",
            ContentKind::Map(MapSource::External),
        )
        .hidden()
        .with_size(72, 14)
        .with_min_size(40, 8),
        AppDescriptor::new("encryption", "Encryption", "🔒", ContentKind::Encryption)
            .with_size(60, 15)
            .with_min_size(46, 13),
        AppDescriptor::new("lemon-list", "Lemon List", "🍋", ContentKind::Listings)
            .with_size(104, 32)
            .with_min_size(60, 16),
        AppDescriptor::new(
            "maps",
            "Maps",
            "🗺",
            folder(&["cookie-delivery-map", "underground-map"]),
        )
        .with_size(44, 10)
        .with_min_size(28, 8),
        AppDescriptor::new("placeholder", "Placeholder", "📄", ContentKind::Placeholder)
            .hidden(),
        AppDescriptor::new("propaganda", "Propaganda", "🏛", ContentKind::Feed)
            .with_size(72, 26)
            .with_min_size(40, 10),
        AppDescriptor::new(
            "underground-map",
            "Underground",
            "🐀",
            ContentKind::Map(MapSource::Tiled),
        )
        .hidden()
        .with_size(64, 24)
        .with_min_size(44, 16),
        AppDescriptor::new("alibi", "Alibi", "㊙", ContentKind::Alibi)
            .with_size(84, 28)
            .with_min_size(64, 22),
    ]
}
