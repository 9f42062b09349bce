use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock};

use crate::core::auth::AuthConfig;
use crate::core::window_manager::DEFAULT_TASKBAR_HEIGHT;

// ── Paths ─────────────────────────────────────────────────────────────────────

pub const HOME_ENV: &str = "VIXEN_HOME";

/// `$VIXEN_HOME`, else the platform data directory, else next to the binary.
pub fn base_dir() -> PathBuf {
    let dir = std::env::var_os(HOME_ENV)
        .map(PathBuf::from)
        .or_else(|| dirs::data_local_dir().map(|d| d.join("vixen")))
        .or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        })
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&dir);
    dir
}

pub fn settings_file() -> PathBuf {
    base_dir().join("settings.json")
}

pub fn session_file() -> PathBuf {
    base_dir().join("session.json")
}

pub fn log_file() -> PathBuf {
    base_dir().join("vixen.log")
}

/// Where the mini-apps read their JSON data sets from.
pub fn data_dir(settings: &Settings) -> PathBuf {
    if let Some(dir) = &settings.data_dir {
        return dir.clone();
    }
    let local = base_dir().join("data");
    if local.is_dir() {
        local
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
    }
}

// ── JSON helpers ──────────────────────────────────────────────────────────────

pub fn load_json<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> T {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

pub fn load_settings() -> Settings {
    load_json(&settings_file())
}

pub fn save_settings(d: &Settings) -> Result<()> {
    save_json(&settings_file(), d)
}

// ── Settings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Show the boot splash.
    #[serde(default = "default_true")]
    pub bootup: bool,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_taskbar_height")]
    pub taskbar_height: u32,
    /// Prefix for shared deep links.
    #[serde(default = "default_link_origin")]
    pub link_origin: String,
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_theme() -> String {
    "Teal (Default)".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_taskbar_height() -> u32 {
    DEFAULT_TASKBAR_HEIGHT
}

fn default_link_origin() -> String {
    "https://vixen98.example".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            bootup: true,
            data_dir: None,
            taskbar_height: DEFAULT_TASKBAR_HEIGHT,
            link_origin: default_link_origin(),
            auth: AuthConfig::default(),
        }
    }
}

// ── Global settings ───────────────────────────────────────────────────────────

static APP_SETTINGS: OnceLock<RwLock<Settings>> = OnceLock::new();

fn settings_lock() -> &'static RwLock<Settings> {
    APP_SETTINGS.get_or_init(|| RwLock::new(Settings::default()))
}

pub fn get_settings() -> Settings {
    settings_lock()
        .read()
        .map(|g| g.clone())
        .unwrap_or_default()
}

pub fn reload_settings() {
    let s = load_settings();
    if let Ok(mut guard) = settings_lock().write() {
        *guard = s;
    }
}

pub fn update_settings<F: FnOnce(&mut Settings)>(f: F) {
    if let Ok(mut guard) = settings_lock().write() {
        f(&mut guard);
    }
}

pub fn persist_settings() -> Result<()> {
    save_settings(&get_settings())
}

// ── Themes ────────────────────────────────────────────────────────────────────

use ratatui::style::Color;

pub const THEMES: &[(&str, Color)] = &[
    ("Teal (Default)", Color::Cyan),
    ("Classic Blue", Color::Blue),
    ("Green", Color::Green),
    ("Amber", Color::Yellow),
    ("White", Color::White),
    ("Purple", Color::Magenta),
];

pub fn theme_color(name: &str) -> Color {
    THEMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .unwrap_or(Color::Cyan)
}

pub fn current_theme_color() -> Color {
    theme_color(&get_settings().theme)
}

/// Next theme in [`THEMES`], wrapping.
pub fn next_theme(name: &str) -> &'static str {
    let idx = THEMES.iter().position(|(n, _)| *n == name).unwrap_or(0);
    THEMES[(idx + 1) % THEMES.len()].0
}

// ── Header ────────────────────────────────────────────────────────────────────

pub const HEADER_LINES: &[&str] = &[
    "VIXEN 98",
    "COPYRIGHT 1998 VIXEN COOKIE CO.",
    "-TERMINAL EDITION-",
];
