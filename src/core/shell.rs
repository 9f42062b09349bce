//! The desktop context.
//!
//! One [`Shell`] is built at startup and owns everything the front-end talks
//! to: the window manager, the auth gate, the gesture tracker, the running
//! mini-apps and the dialog queue. Nothing here is fatal; failures are logged
//! and queued as dialogs.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use super::auth::AuthGate;
use super::error::DesktopError;
use super::geometry::Size;
use super::gesture::{GestureOutcome, GestureTracker, PointerEvent};
use super::registry::{AccessLevel, AppId, AppRegistry};
use super::router::{self, Params};
use super::window_manager::WindowManager;
use crate::apps::{AppAction, ContentLine, KeyInput, LaunchContext, MiniApp};

pub const ACCESS_DENIED_TITLE: &str = "Access Denied";
pub const ACCESS_DENIED_MESSAGE: &str = "You do not have permission to access this resource.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopIcon {
    pub app_id: AppId,
    pub name: String,
    pub icon: String,
    pub enabled: bool,
}

pub struct Shell {
    wm: WindowManager,
    auth: AuthGate,
    gestures: GestureTracker,
    apps: HashMap<AppId, MiniApp>,
    dialogs: VecDeque<Dialog>,
    data_dir: PathBuf,
    link_origin: String,
}

impl Shell {
    pub fn new(
        registry: AppRegistry,
        auth: AuthGate,
        screen: Size,
        taskbar_height: u32,
        data_dir: PathBuf,
        link_origin: impl Into<String>,
    ) -> Self {
        Self {
            wm: WindowManager::new(registry, screen, taskbar_height),
            auth,
            gestures: GestureTracker::new(),
            apps: HashMap::new(),
            dialogs: VecDeque::new(),
            data_dir,
            link_origin: link_origin.into(),
        }
    }

    pub fn window_manager(&self) -> &WindowManager {
        &self.wm
    }

    pub fn gestures(&self) -> &GestureTracker {
        &self.gestures
    }

    pub fn access_level(&self, now: DateTime<Utc>) -> AccessLevel {
        self.auth.current_access_level(now)
    }

    pub fn set_viewport(&mut self, screen: Size) {
        self.wm.set_viewport(screen);
    }

    // ── Dialogs ───────────────────────────────────────────────────────────────

    pub fn dialogs(&self) -> &VecDeque<Dialog> {
        &self.dialogs
    }

    pub fn show_dialog(&mut self, title: impl Into<String>, message: impl Into<String>) {
        let dialog = Dialog {
            title: title.into(),
            message: message.into(),
        };
        log::debug!("dialog: {}", dialog.title);
        self.dialogs.push_back(dialog);
    }

    pub fn dismiss_dialog(&mut self) -> Option<Dialog> {
        self.dialogs.pop_front()
    }

    fn report(&mut self, err: DesktopError) {
        log::warn!("{err}");
        match &err {
            DesktopError::AccessDenied { .. } => {
                self.show_dialog(ACCESS_DENIED_TITLE, ACCESS_DENIED_MESSAGE)
            }
            DesktopError::UnknownApp(_) => self.show_dialog("Unknown app", err.to_string()),
            DesktopError::InvalidFragment(_) => self.show_dialog("Invalid link", err.to_string()),
            DesktopError::WindowNotOpen(_) => {}
        }
    }

    // ── Apps ──────────────────────────────────────────────────────────────────

    /// Open (or focus) `app_id`. Returns false when the request was refused.
    pub fn open_app(&mut self, app_id: &str, params: &Params, now: DateTime<Utc>) -> bool {
        match self.try_open(app_id, params, now) {
            Ok(()) => true,
            Err(e) => {
                self.report(e);
                false
            }
        }
    }

    fn try_open(
        &mut self,
        app_id: &str,
        params: &Params,
        now: DateTime<Utc>,
    ) -> Result<(), DesktopError> {
        let desc = self
            .wm
            .registry()
            .get(app_id)
            .ok_or_else(|| DesktopError::UnknownApp(AppId::from(app_id)))?;
        let level = self.auth.current_access_level(now);
        if level < desc.access_level {
            return Err(DesktopError::AccessDenied {
                app: desc.id.clone(),
                required: desc.access_level,
                current: level,
            });
        }

        let id = self.wm.open_with(app_id, params)?.app_id().clone();
        if let Some(app) = self.apps.get_mut(&id) {
            app.apply_params(params);
            return Ok(());
        }

        let registry = self.wm.registry();
        let Some(desc) = registry.get(app_id) else {
            return Err(DesktopError::UnknownApp(id));
        };
        let ctx = LaunchContext {
            app: desc,
            registry,
            level,
            data_dir: &self.data_dir,
            link_origin: &self.link_origin,
        };
        let app = MiniApp::launch(&ctx, params);
        log::info!("launched {id}");
        self.apps.insert(id, app);
        Ok(())
    }

    /// Open whatever a deep-link fragment points at.
    pub fn navigate(&mut self, fragment: &str, now: DateTime<Utc>) -> bool {
        match router::parse(fragment) {
            Ok(link) => self.open_app(link.app.as_str(), &link.params, now),
            Err(e) => {
                self.report(e);
                false
            }
        }
    }

    pub fn desktop_icons(&self, now: DateTime<Utc>) -> Vec<DesktopIcon> {
        self.wm
            .registry()
            .desktop_apps()
            .map(|d| DesktopIcon {
                app_id: d.id.clone(),
                name: d.name.clone(),
                icon: d.icon.clone(),
                enabled: self.auth.can_open(d, now),
            })
            .collect()
    }

    pub fn click_taskbar(&mut self, app_id: &str) {
        if let Err(e) = self.wm.activate_from_taskbar(app_id) {
            self.report(e);
        }
    }

    pub fn close_app(&mut self, app_id: &str) {
        if let Err(e) = self.wm.close(app_id) {
            self.report(e);
            return;
        }
        self.forget(&AppId::from(app_id));
    }

    fn forget(&mut self, app_id: &AppId) {
        self.apps.remove(app_id);
        self.gestures.cancel_for(app_id);
    }

    pub fn app(&self, app_id: &str) -> Option<&MiniApp> {
        self.apps.get(app_id)
    }

    /// Content of an open window, rendered for `width` columns.
    pub fn content_lines(&self, app_id: &str, width: usize) -> Vec<ContentLine> {
        self.apps
            .get(app_id)
            .map(|a| a.lines(width))
            .unwrap_or_default()
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub fn pointer(&mut self, event: PointerEvent, now: DateTime<Utc>) -> GestureOutcome {
        let outcome = match self.gestures.handle(&mut self.wm, event) {
            Ok(o) => o,
            Err(e) => {
                self.gestures.reset();
                self.report(e);
                return GestureOutcome::None;
            }
        };
        match &outcome {
            GestureOutcome::Closed(app) => self.forget(app),
            GestureOutcome::Content { app, cell } => {
                if let Some(mini) = self.apps.get_mut(app) {
                    let action = mini.click(*cell);
                    self.apply(app.clone(), action, now);
                }
            }
            _ => {}
        }
        outcome
    }

    /// Keys go to the front dialog if there is one, otherwise to the active window.
    pub fn key(&mut self, input: KeyInput, now: DateTime<Utc>) {
        if !self.dialogs.is_empty() {
            if matches!(input, KeyInput::Enter | KeyInput::Esc | KeyInput::Char(' ')) {
                self.dismiss_dialog();
            }
            return;
        }
        let Some(active) = self.wm.active().map(|w| w.app_id().clone()) else {
            return;
        };
        let Some(mini) = self.apps.get_mut(&active) else {
            return;
        };
        let action = mini.key(input);
        self.apply(active, action, now);
    }

    fn apply(&mut self, source: AppId, action: AppAction, now: DateTime<Utc>) {
        match action {
            AppAction::None => {}
            AppAction::Open(target) => {
                self.open_app(target.as_str(), &Params::new(), now);
            }
            AppAction::CloseSelf => self.close_app(source.as_str()),
            AppAction::UpdateLink(params) => self.wm.set_fragment(&source, &params),
            AppAction::Dialog { title, message } => self.show_dialog(title, message),
        }
    }

    // ── Auth ──────────────────────────────────────────────────────────────────

    pub fn login(&mut self, password: &str, now: DateTime<Utc>) -> AccessLevel {
        let level = self.auth.login(password, now);
        if level > AccessLevel::DEFAULT {
            self.show_dialog("Login", format!("Access level {level} granted."));
        } else {
            self.show_dialog("Login", "Invalid password.");
        }
        self.refresh_access(now);
        level
    }

    pub fn logout(&mut self, now: DateTime<Utc>) {
        self.auth.logout();
        log::info!("logged out");
        self.refresh_access(now);
    }

    pub fn check_stored_credentials(&mut self, now: DateTime<Utc>) -> bool {
        let ok = self.auth.check_stored_credentials(now);
        self.refresh_access(now);
        ok
    }

    fn refresh_access(&mut self, now: DateTime<Utc>) {
        let level = self.auth.current_access_level(now);
        for app in self.apps.values_mut() {
            app.set_access_level(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::{AuthConfig, MemoryStore};
    use crate::core::geometry::Point;
    use crate::core::gesture::{close_button_rect, content_rect};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap()
    }

    fn shell() -> Shell {
        let auth = AuthGate::new(AuthConfig::default(), Box::new(MemoryStore::default()));
        let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
        Shell::new(
            AppRegistry::builtin(),
            auth,
            Size::new(160, 50),
            1,
            data,
            "https://vixen.example",
        )
    }

    fn elevated(shell: &mut Shell) {
        let token = shell.auth.issue_token(AccessLevel(3), now()).unwrap();
        let store = MemoryStore::with(crate::core::auth::StoredCredentials {
            access_token: Some(token.as_str().to_string()),
            last_login: Some(now()),
        });
        shell.auth = AuthGate::new(AuthConfig::default(), Box::new(store));
        shell.refresh_access(now());
    }

    #[test]
    fn unknown_app_queues_dialog_and_changes_nothing() {
        let mut s = shell();
        assert!(!s.open_app("nope", &Params::new(), now()));
        assert!(s.window_manager().is_empty());
        let d = s.dismiss_dialog().unwrap();
        assert_eq!(d.title, "Unknown app");
        assert_eq!(d.message, "Unknown app: nope");
    }

    #[test]
    fn locked_app_is_denied() {
        let mut s = shell();
        assert!(!s.open_app("documents", &Params::new(), now()));
        assert!(!s.window_manager().is_open("documents"));
        assert_eq!(
            s.dialogs().front(),
            Some(&Dialog {
                title: ACCESS_DENIED_TITLE.into(),
                message: ACCESS_DENIED_MESSAGE.into(),
            })
        );
    }

    #[test]
    fn elevated_session_opens_locked_app() {
        let mut s = shell();
        elevated(&mut s);
        assert!(s.open_app("documents", &Params::new(), now()));
        assert!(s.app("documents").is_some());
    }

    #[test]
    fn desktop_icons_reflect_access() {
        let s = shell();
        let icons = s.desktop_icons(now());
        let docs = icons.iter().find(|i| i.app_id.as_str() == "documents").unwrap();
        assert!(!docs.enabled);
        assert!(icons.iter().any(|i| i.app_id.as_str() == "system" && i.enabled));
        assert!(icons.iter().all(|i| i.app_id.as_str() != "cookie-batch-log"));
    }

    #[test]
    fn navigate_opens_listing_with_params() {
        let mut s = shell();
        assert!(s.navigate("#lemon-list?search=car", now()));
        assert_eq!(s.window_manager().fragment(), Some("#lemon-list?search=car"));
        let Some(MiniApp::Listings(app)) = s.app("lemon-list") else {
            panic!("listings not running");
        };
        assert_eq!(app.search(), "car");
    }

    #[test]
    fn reopen_forwards_params_to_running_app() {
        let mut s = shell();
        s.open_app("lemon-list", &Params::new(), now());
        s.navigate("lemon-list?search=taxi", now());
        assert_eq!(s.window_manager().len(), 1);
        let Some(MiniApp::Listings(app)) = s.app("lemon-list") else {
            panic!("listings not running");
        };
        assert_eq!(app.search(), "taxi");
    }

    #[test]
    fn empty_fragment_is_reported() {
        let mut s = shell();
        assert!(!s.navigate("#", now()));
        assert_eq!(s.dialogs().len(), 1);
    }

    #[test]
    fn system_enter_closes_its_window() {
        let mut s = shell();
        s.open_app("system", &Params::new(), now());
        s.key(KeyInput::Enter, now());
        assert!(!s.window_manager().is_open("system"));
        assert!(s.app("system").is_none());
    }

    #[test]
    fn folder_opens_sub_app() {
        let mut s = shell();
        s.open_app("maps", &Params::new(), now());
        s.key(KeyInput::Enter, now());
        assert!(s.window_manager().is_open("cookie-delivery-map"));
        assert_eq!(
            s.window_manager().active().unwrap().app_id().as_str(),
            "cookie-delivery-map"
        );
    }

    #[test]
    fn typing_in_listings_updates_fragment() {
        let mut s = shell();
        s.open_app("lemon-list", &Params::new(), now());
        s.key(KeyInput::Char('c'), now());
        assert_eq!(
            s.window_manager().fragment(),
            Some("#lemon-list?filters=&search=c")
        );
    }

    #[test]
    fn search_link_survives_switching_windows() {
        let mut s = shell();
        s.open_app("lemon-list", &Params::new(), now());
        s.key(KeyInput::Char('c'), now());
        s.open_app("system", &Params::new(), now());
        assert_eq!(s.window_manager().fragment(), Some("#system"));

        s.close_app("system");
        assert_eq!(
            s.window_manager().fragment(),
            Some("#lemon-list?filters=&search=c")
        );
        s.open_app("lemon-list", &Params::new(), now());
        assert_eq!(
            s.window_manager().fragment(),
            Some("#lemon-list?filters=&search=c")
        );
    }

    #[test]
    fn keys_dismiss_dialog_first() {
        let mut s = shell();
        s.open_app("system", &Params::new(), now());
        s.show_dialog("Hi", "there");
        s.key(KeyInput::Enter, now());
        assert!(s.dialogs().is_empty());
        assert!(s.window_manager().is_open("system"));
    }

    #[test]
    fn close_button_drops_mini_app() {
        let mut s = shell();
        s.open_app("system", &Params::new(), now());
        let rect = s.window_manager().get("system").unwrap().rect();
        let b = close_button_rect(rect);
        let outcome = s.pointer(PointerEvent::Down(Point::new(b.x, b.y)), now());
        assert_eq!(outcome, GestureOutcome::Closed(AppId::from("system")));
        assert!(s.app("system").is_none());
    }

    #[test]
    fn content_click_reaches_mini_app() {
        let mut s = shell();
        s.open_app("maps", &Params::new(), now());
        let c = content_rect(s.window_manager().get("maps").unwrap().rect());
        s.pointer(PointerEvent::Down(Point::new(c.x + 1, c.y)), now());
        s.pointer(PointerEvent::Up, now());
        assert!(s.window_manager().is_open("cookie-delivery-map"));
    }

    #[test]
    fn failed_login_reports_invalid_password() {
        let mut s = shell();
        assert_eq!(s.login("hunter2", now()), AccessLevel::DEFAULT);
        assert_eq!(s.dismiss_dialog().unwrap().message, "Invalid password.");
    }

    #[test]
    fn logout_refreshes_open_folders() {
        let mut s = shell();
        elevated(&mut s);
        s.open_app("documents", &Params::new(), now());
        s.logout(now());
        assert_eq!(s.access_level(now()), AccessLevel::DEFAULT);
        assert!(!s.open_app("documents", &Params::new(), now()));
    }
}
