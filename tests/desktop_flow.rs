use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::PathBuf;

use vixen::apps::{KeyInput, MiniApp, Tone};
use vixen::core::auth::{AuthConfig, AuthGate, FileStore, StoredCredentials};
use vixen::core::gesture::{content_rect, PointerEvent};
use vixen::core::router::Params;
use vixen::core::{AccessLevel, AppRegistry, Point, Shell, Size};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap()
}

fn temp_dir(tag: &str) -> PathBuf {
    let uniq = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("vixen-{tag}-{uniq}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn bundled_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn shell_with(session: PathBuf, data: PathBuf) -> Shell {
    let auth = AuthGate::new(AuthConfig::default(), Box::new(FileStore::new(session)));
    Shell::new(
        AppRegistry::builtin(),
        auth,
        Size::new(120, 40),
        1,
        data,
        "https://vixen98.example",
    )
}

/// Config whose level-2 password is "cookies".
fn config_with_password() -> AuthConfig {
    let mut cfg = AuthConfig::default();
    let probe = AuthGate::new(cfg.clone(), Box::new(vixen::core::auth::MemoryStore::default()));
    cfg.level_hashes.insert(2, probe.hash_password("cookies"));
    cfg
}

#[test]
fn login_persists_and_is_remembered_within_twelve_hours() {
    let dir = temp_dir("flow-login");
    let session = dir.join("session.json");

    let cfg = config_with_password();
    let mut gate = AuthGate::new(cfg.clone(), Box::new(FileStore::new(session.clone())));
    assert_eq!(gate.login("cookies", t0()), AccessLevel(2));

    let raw = std::fs::read_to_string(&session).unwrap();
    let stored: StoredCredentials = serde_json::from_str(&raw).unwrap();
    assert!(stored.access_token.is_some());
    assert!(raw.contains("lastLogin"));

    let mut again = AuthGate::new(cfg.clone(), Box::new(FileStore::new(session.clone())));
    assert!(again.check_stored_credentials(t0() + Duration::hours(11)));
    assert_eq!(again.current_access_level(t0() + Duration::hours(11)), AccessLevel(2));

    let mut stale = AuthGate::new(cfg, Box::new(FileStore::new(session.clone())));
    assert!(!stale.check_stored_credentials(t0() + Duration::hours(13)));
    let cleared: StoredCredentials =
        serde_json::from_str(&std::fs::read_to_string(&session).unwrap_or_default())
            .unwrap_or_default();
    assert!(cleared.access_token.is_none());
}

#[test]
fn deep_link_opens_filtered_listings() {
    let dir = temp_dir("flow-link");
    let mut shell = shell_with(dir.join("session.json"), bundled_data());

    assert!(shell.navigate("#lemon-list?search=mechanic", t0()));
    let Some(MiniApp::Listings(app)) = shell.app("lemon-list") else {
        panic!("listings not running");
    };
    assert_eq!(app.search(), "mechanic");
    assert!(app.filtered().iter().all(|l| l.text.to_lowercase().contains("mechanic")));

    let lines = shell.content_lines("lemon-list", 80);
    assert!(lines.iter().any(|l| l.text.contains("Page 1 of 1")));
}

#[test]
fn missing_data_shows_inline_error_and_keeps_window() {
    let dir = temp_dir("flow-missing");
    let mut shell = shell_with(dir.join("session.json"), dir.join("no-data-here"));

    assert!(shell.open_app("propaganda", &Params::new(), t0()));
    assert!(shell.window_manager().is_open("propaganda"));
    assert!(shell.dialogs().is_empty());
    let lines = shell.content_lines("propaganda", 60);
    assert_eq!(lines[0].tone, Tone::Error);
}

#[test]
fn alibi_generates_from_bundled_data() {
    let dir = temp_dir("flow-alibi");
    let mut shell = shell_with(dir.join("session.json"), bundled_data());

    assert!(shell.open_app("alibi", &Params::new(), t0()));
    shell.key(KeyInput::Char('g'), t0());
    let lines = shell.content_lines("alibi", 84);
    assert!(lines.iter().any(|l| l.text.starts_with("\"At ")));
}

#[test]
fn windows_cascade_and_close_hands_focus_back() {
    let dir = temp_dir("flow-windows");
    let mut shell = shell_with(dir.join("session.json"), bundled_data());

    shell.open_app("system", &Params::new(), t0());
    shell.open_app("encryption", &Params::new(), t0());
    let wm = shell.window_manager();
    let a = wm.get("system").unwrap().rect();
    let b = wm.get("encryption").unwrap().rect();
    assert_ne!((a.x, a.y), (b.x, b.y));
    assert_eq!(wm.active().unwrap().app_id().as_str(), "encryption");

    shell.close_app("encryption");
    let wm = shell.window_manager();
    assert_eq!(wm.active().unwrap().app_id().as_str(), "system");
    assert_eq!(wm.fragment(), Some("#system"));
}

#[test]
fn dragging_a_header_moves_the_window() {
    let dir = temp_dir("flow-drag");
    let mut shell = shell_with(dir.join("session.json"), bundled_data());
    shell.open_app("trash", &Params::new(), t0());

    let before = shell.window_manager().get("trash").unwrap().rect();
    let grab = Point::new(before.x + 2, before.y);
    shell.pointer(PointerEvent::Down(grab), t0());
    shell.pointer(PointerEvent::Move(Point::new(grab.x + 5, grab.y + 3)), t0());
    shell.pointer(PointerEvent::Up, t0());

    let after = shell.window_manager().get("trash").unwrap().rect();
    assert_eq!((after.x, after.y), (before.x + 5, before.y + 3));
    assert!(shell.gestures().is_idle());

    // A press inside the content only focuses.
    let c = content_rect(after);
    shell.pointer(PointerEvent::Down(Point::new(c.x, c.y)), t0());
    assert_eq!(shell.window_manager().get("trash").unwrap().rect(), after);
}
