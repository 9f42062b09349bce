//! Window bookkeeping: which windows exist, how they stack, where they sit.
//!
//! One [`WindowInstance`] per app id. Taskbar entries are derived from the
//! window list, so they are created and destroyed together with their window.
//! Every focus change draws a fresh z value from a monotonic counter.

use super::error::{DesktopError, Result};
use super::geometry::{Point, Rect, Size};
use super::registry::{AppId, AppRegistry};
use super::router::{self, Params};

pub const CASCADE_ORIGIN: Point = Point::new(2, 1);
pub const CASCADE_STEP: i32 = 2;
const MAX_CASCADE_STEPS: usize = 512;
pub const DEFAULT_TASKBAR_HEIGHT: u32 = 1;

pub type WindowHandle = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInstance {
    app_id: AppId,
    handle: WindowHandle,
    title: String,
    icon: String,
    z: u64,
    rect: Rect,
    restore_rect: Option<Rect>,
    min_size: Size,
    resizable: bool,
    maximizable: bool,
    minimized: bool,
    maximized: bool,
    active: bool,
    // Last deep-link params, restored when the window regains the fragment.
    params: Params,
}

impl WindowInstance {
    pub fn app_id(&self) -> &AppId {
        &self.app_id
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn z(&self) -> u64 {
        self.z
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn min_size(&self) -> Size {
        self.min_size
    }

    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    pub fn is_maximizable(&self) -> bool {
        self.maximizable
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn is_maximized(&self) -> bool {
        self.maximized
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_visible(&self) -> bool {
        !self.minimized
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskbarEntry {
    pub app_id: AppId,
    pub title: String,
    pub icon: String,
    pub active: bool,
    pub minimized: bool,
}

pub struct WindowManager {
    registry: AppRegistry,
    // Open order; stacking lives in `z`.
    windows: Vec<WindowInstance>,
    z_counter: u64,
    next_handle: WindowHandle,
    screen: Size,
    taskbar_height: u32,
    fragment: Option<String>,
}

impl WindowManager {
    pub fn new(registry: AppRegistry, screen: Size, taskbar_height: u32) -> Self {
        Self {
            registry,
            windows: Vec::new(),
            z_counter: 0,
            next_handle: 1,
            screen,
            taskbar_height,
            fragment: None,
        }
    }

    pub fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    /// Screen minus the taskbar strip.
    pub fn desktop_area(&self) -> Rect {
        Rect::new(
            0,
            0,
            self.screen.width,
            self.screen.height.saturating_sub(self.taskbar_height),
        )
    }

    pub fn screen(&self) -> Size {
        self.screen
    }

    pub fn taskbar_height(&self) -> u32 {
        self.taskbar_height
    }

    pub fn set_viewport(&mut self, screen: Size) {
        self.screen = screen;
        let desk = self.desktop_area();
        for win in self.windows.iter_mut().filter(|w| w.maximized) {
            win.rect = desk;
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn get(&self, app_id: &str) -> Option<&WindowInstance> {
        self.windows.iter().find(|w| w.app_id.as_str() == app_id)
    }

    pub fn is_open(&self, app_id: &str) -> bool {
        self.get(app_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Back to front.
    pub fn windows_by_z(&self) -> Vec<&WindowInstance> {
        let mut out: Vec<&WindowInstance> = self.windows.iter().collect();
        out.sort_by_key(|w| w.z);
        out
    }

    pub fn active(&self) -> Option<&WindowInstance> {
        self.windows.iter().find(|w| w.active)
    }

    /// Topmost visible window containing `p`.
    pub fn window_at(&self, p: Point) -> Option<&WindowInstance> {
        self.windows
            .iter()
            .filter(|w| w.is_visible() && w.rect.contains(p))
            .max_by_key(|w| w.z)
    }

    /// One entry per open window, in open order.
    pub fn taskbar(&self) -> Vec<TaskbarEntry> {
        self.windows
            .iter()
            .map(|w| TaskbarEntry {
                app_id: w.app_id.clone(),
                title: w.title.clone(),
                icon: w.icon.clone(),
                active: w.active,
                minimized: w.minimized,
            })
            .collect()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Point the fragment at `app_id` and remember `params` on its window.
    pub fn set_fragment(&mut self, app_id: &AppId, params: &Params) {
        if let Some(win) = self.windows.iter_mut().find(|w| &w.app_id == app_id) {
            win.params = params.clone();
        }
        self.fragment = Some(router::format(app_id, params));
    }

    // ── Operations ────────────────────────────────────────────────────────────

    pub fn open(&mut self, app_id: &str) -> Result<&WindowInstance> {
        self.open_with(app_id, &Params::new())
    }

    pub fn open_with(&mut self, app_id: &str, params: &Params) -> Result<&WindowInstance> {
        if !self.is_open(app_id) {
            let desc = self
                .registry
                .get(app_id)
                .ok_or_else(|| DesktopError::UnknownApp(AppId::from(app_id)))?;
            let size = desc.initial_size();
            let win = WindowInstance {
                app_id: desc.id.clone(),
                handle: self.next_handle,
                title: desc.name.clone(),
                icon: desc.icon.clone(),
                z: 0,
                rect: Rect::from_parts(self.cascade_position(size), size),
                restore_rect: None,
                min_size: desc.min_size,
                resizable: desc.resizable,
                maximizable: desc.maximizable,
                minimized: false,
                maximized: false,
                active: false,
                params: Params::new(),
            };
            self.next_handle += 1;
            log::debug!("open {} at {:?}", win.app_id, win.rect);
            self.windows.push(win);
        }

        self.bring_to_front(app_id)?;
        let idx = self.index_of(app_id)?;
        let win = &self.windows[idx];
        let id = win.app_id.clone();
        // Plain reopen keeps whatever state the window last linked to.
        let params = if params.is_empty() {
            win.params.clone()
        } else {
            params.clone()
        };
        self.set_fragment(&id, &params);
        Ok(&self.windows[idx])
    }

    pub fn bring_to_front(&mut self, app_id: &str) -> Result<()> {
        let idx = self.index_of(app_id)?;
        let top_z = self.windows.iter().map(|w| w.z).max().unwrap_or(0);
        let already_front = self.windows[idx].active
            && self.windows[idx].z == top_z
            && self.windows.iter().filter(|w| w.active).count() == 1;
        if already_front && top_z > 0 {
            return Ok(());
        }

        self.z_counter = self.z_counter.max(top_z) + 1;
        for w in &mut self.windows {
            w.active = false;
        }
        let win = &mut self.windows[idx];
        win.z = self.z_counter;
        win.active = true;
        Ok(())
    }

    pub fn minimize(&mut self, app_id: &str) -> Result<()> {
        let idx = self.index_of(app_id)?;
        self.windows[idx].minimized = true;
        if self.windows[idx].active {
            let next = self
                .windows
                .iter()
                .filter(|w| w.is_visible())
                .max_by_key(|w| w.z)
                .map(|w| w.app_id.clone());
            if let Some(next) = next {
                self.bring_to_front(next.as_str())?;
            }
        }
        Ok(())
    }

    pub fn restore(&mut self, app_id: &str) -> Result<()> {
        let idx = self.index_of(app_id)?;
        let desk = self.desktop_area();
        let win = &mut self.windows[idx];
        win.minimized = false;
        if win.maximized {
            win.rect = desk;
        }
        self.bring_to_front(app_id)
    }

    pub fn toggle_maximize(&mut self, app_id: &str) -> Result<()> {
        let idx = self.index_of(app_id)?;
        let desk = self.desktop_area();
        let win = &mut self.windows[idx];
        if !win.maximizable {
            return Ok(());
        }
        if win.maximized {
            win.maximized = false;
            if let Some(prev) = win.restore_rect.take() {
                win.rect = prev;
            }
        } else {
            win.restore_rect = Some(win.rect);
            win.maximized = true;
            win.minimized = false;
            win.rect = desk;
        }
        self.bring_to_front(app_id)
    }

    /// Move by a delta. The header row always stays inside the desktop.
    pub fn drag(&mut self, app_id: &str, dx: i32, dy: i32) -> Result<()> {
        self.bring_to_front(app_id)?;
        let idx = self.index_of(app_id)?;
        let desk = self.desktop_area();
        let win = &mut self.windows[idx];
        if win.maximized || win.minimized {
            return Ok(());
        }

        let min_x = i64::from(desk.x) - i64::from(win.rect.width) + 1;
        let max_x = desk.right() - 1;
        let min_y = i64::from(desk.y);
        let max_y = desk.bottom() - 1;
        let x = (i64::from(win.rect.x) + i64::from(dx)).clamp(min_x, max_x.max(min_x));
        let y = (i64::from(win.rect.y) + i64::from(dy)).clamp(min_y, max_y.max(min_y));
        win.rect.x = saturate_i32(x);
        win.rect.y = saturate_i32(y);
        Ok(())
    }

    /// Grow or shrink from the bottom-right edge, never below the app minimum.
    pub fn resize(&mut self, app_id: &str, dw: i32, dh: i32) -> Result<()> {
        self.bring_to_front(app_id)?;
        let idx = self.index_of(app_id)?;
        let win = &mut self.windows[idx];
        if !win.resizable || win.maximized || win.minimized {
            return Ok(());
        }
        win.rect.width = grow(win.rect.width, dw, win.min_size.width);
        win.rect.height = grow(win.rect.height, dh, win.min_size.height);
        Ok(())
    }

    pub fn close(&mut self, app_id: &str) -> Result<()> {
        let idx = self.index_of(app_id)?;
        let closed = self.windows.remove(idx);
        log::debug!("close {}", closed.app_id);

        let next = self
            .windows
            .iter()
            .max_by_key(|w| (w.is_visible(), w.z))
            .map(|w| (w.app_id.clone(), w.params.clone()));
        match next {
            Some((next, params)) => {
                self.bring_to_front(next.as_str())?;
                self.set_fragment(&next, &params);
            }
            None => self.fragment = None,
        }
        Ok(())
    }

    pub fn activate_from_taskbar(&mut self, app_id: &str) -> Result<()> {
        let idx = self.index_of(app_id)?;
        let win = &self.windows[idx];
        if win.minimized {
            self.restore(app_id)
        } else if win.active {
            self.minimize(app_id)
        } else {
            self.bring_to_front(app_id)
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn index_of(&self, app_id: &str) -> Result<usize> {
        self.windows
            .iter()
            .position(|w| w.app_id.as_str() == app_id)
            .ok_or_else(|| DesktopError::WindowNotOpen(AppId::from(app_id)))
    }

    /// Step diagonally from the cascade origin until no window starts at the
    /// same top-left cell, wrapping each axis that would leave the desktop.
    fn cascade_position(&self, size: Size) -> Point {
        let desk = self.desktop_area();
        let max_x = desk.right() - i64::from(size.width);
        let max_y = desk.bottom() - i64::from(size.height);

        let mut p = CASCADE_ORIGIN;
        for _ in 0..MAX_CASCADE_STEPS {
            if !self.windows.iter().any(|w| w.rect.origin() == p) {
                break;
            }
            p.x += CASCADE_STEP;
            p.y += CASCADE_STEP;
            if i64::from(p.x) > max_x {
                p.x = CASCADE_ORIGIN.x;
            }
            if i64::from(p.y) > max_y {
                p.y = CASCADE_ORIGIN.y;
            }
        }
        p
    }
}

fn grow(current: u32, delta: i32, min: u32) -> u32 {
    let next = (i64::from(current) + i64::from(delta)).max(i64::from(min));
    u32::try_from(next).unwrap_or(u32::MAX)
}

fn saturate_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::{AppDescriptor, ContentKind};

    fn wm() -> WindowManager {
        WindowManager::new(AppRegistry::builtin(), Size::new(200, 60), 1)
    }

    fn assert_single_active(wm: &WindowManager) {
        let active: Vec<_> = wm.windows_by_z().into_iter().filter(|w| w.is_active()).collect();
        assert_eq!(active.len(), 1, "exactly one active window");
        let top = active[0].z();
        for w in wm.windows_by_z() {
            if w.app_id() != active[0].app_id() {
                assert!(w.z() < top);
            }
        }
    }

    #[test]
    fn open_is_idempotent() {
        let mut wm = wm();
        let first = wm.open("system").unwrap().rect();
        wm.open("alibi").unwrap();
        let again = wm.open("system").unwrap().rect();
        wm.open("system").unwrap();
        assert_eq!(wm.len(), 2);
        assert_eq!(first, again);
        assert_eq!(wm.active().map(|w| w.app_id().as_str()), Some("system"));
    }

    #[test]
    fn reopen_after_close_uses_default_geometry() {
        let mut wm = wm();
        let fresh = wm.open("system").unwrap().rect();
        wm.drag("system", 7, 3).unwrap();
        wm.resize("system", 10, 10).unwrap();
        wm.close("system").unwrap();
        let reopened = wm.open("system").unwrap().rect();
        assert_eq!(reopened, fresh);
        assert_eq!(reopened.size(), Size::new(52, 20));
    }

    #[test]
    fn maximize_twice_restores_exact_geometry() {
        let mut wm = wm();
        wm.open("alibi").unwrap();
        wm.drag("alibi", 5, 4).unwrap();
        let before = wm.get("alibi").unwrap().rect();

        wm.toggle_maximize("alibi").unwrap();
        let max = wm.get("alibi").unwrap();
        assert!(max.is_maximized());
        assert_eq!(max.rect(), Rect::new(0, 0, 200, 59));

        wm.toggle_maximize("alibi").unwrap();
        let after = wm.get("alibi").unwrap();
        assert!(!after.is_maximized());
        assert_eq!(after.rect(), before);
    }

    #[test]
    fn bring_to_front_keeps_one_active_topmost() {
        let mut wm = wm();
        for id in ["system", "alibi", "maps", "trash"] {
            wm.open(id).unwrap();
        }
        for id in ["maps", "system", "trash", "system", "alibi"] {
            wm.bring_to_front(id).unwrap();
            assert_single_active(&wm);
            assert_eq!(wm.active().map(|w| w.app_id().as_str()), Some(id));
        }
    }

    #[test]
    fn bring_to_front_on_front_window_is_noop() {
        let mut wm = wm();
        wm.open("system").unwrap();
        wm.open("alibi").unwrap();
        let z = wm.get("alibi").unwrap().z();
        wm.bring_to_front("alibi").unwrap();
        assert_eq!(wm.get("alibi").unwrap().z(), z);
    }

    #[test]
    fn z_values_are_never_reused_after_close() {
        let mut wm = wm();
        wm.open("system").unwrap();
        wm.open("alibi").unwrap();
        wm.open("maps").unwrap();
        let highest = wm.get("maps").unwrap().z();
        wm.close("maps").unwrap();
        wm.bring_to_front("system").unwrap();
        assert!(wm.get("system").unwrap().z() > highest);
    }

    #[test]
    fn unknown_app_leaves_state_untouched() {
        let mut wm = wm();
        wm.open("system").unwrap();
        let before: Vec<WindowInstance> = wm.windows_by_z().into_iter().cloned().collect();
        let fragment = wm.fragment().map(str::to_string);

        let err = wm.open("does-not-exist").unwrap_err();
        assert_eq!(err, DesktopError::UnknownApp(AppId::from("does-not-exist")));

        let after: Vec<WindowInstance> = wm.windows_by_z().into_iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(wm.fragment().map(str::to_string), fragment);
    }

    #[test]
    fn resize_clamps_to_descriptor_minimum() {
        let registry = AppRegistry::new(vec![AppDescriptor::new(
            "system",
            "System",
            "💻",
            ContentKind::System,
        )
        .with_size(300, 200)
        .with_min_size(350, 380)])
        .unwrap();
        let mut wm = WindowManager::new(registry, Size::new(1920, 1080), 30);

        let size = wm.open("system").unwrap().rect().size();
        assert!(size.width >= 350 && size.height >= 380);

        wm.resize("system", -9999, -9999).unwrap();
        assert_eq!(wm.get("system").unwrap().rect().size(), Size::new(350, 380));
    }

    #[test]
    fn fixed_windows_ignore_resize_and_maximize() {
        let registry = AppRegistry::new(vec![AppDescriptor::new(
            "dialog",
            "Dialog",
            "!",
            ContentKind::Placeholder,
        )
        .fixed()])
        .unwrap();
        let mut wm = WindowManager::new(registry, Size::new(120, 40), 1);
        let rect = wm.open("dialog").unwrap().rect();
        wm.resize("dialog", 10, 10).unwrap();
        wm.toggle_maximize("dialog").unwrap();
        let win = wm.get("dialog").unwrap();
        assert_eq!(win.rect(), rect);
        assert!(!win.is_maximized());
    }

    #[test]
    fn cascade_offsets_each_new_window() {
        let mut wm = wm();
        let a = wm.open("system").unwrap().rect().origin();
        let b = wm.open("alibi").unwrap().rect().origin();
        let c = wm.open("trash").unwrap().rect().origin();
        assert_eq!(a, CASCADE_ORIGIN);
        assert_eq!(b, Point::new(CASCADE_ORIGIN.x + 2, CASCADE_ORIGIN.y + 2));
        assert_eq!(c, Point::new(CASCADE_ORIGIN.x + 4, CASCADE_ORIGIN.y + 4));

        // Freed slot is reused.
        wm.close("system").unwrap();
        assert_eq!(wm.open("maps").unwrap().rect().origin(), CASCADE_ORIGIN);
    }

    #[test]
    fn cascade_wraps_when_leaving_desktop() {
        let apps: Vec<AppDescriptor> = (0..4)
            .map(|i| {
                AppDescriptor::new(&format!("app{i}"), "App", "x", ContentKind::Placeholder)
                    .with_size(10, 4)
                    .with_min_size(10, 4)
            })
            .collect();
        let registry = AppRegistry::new(apps).unwrap();
        // Height 9 leaves room for y = 1, 3, 5 only.
        let mut wm = WindowManager::new(registry, Size::new(100, 10), 1);
        let origins: Vec<Point> = (0..4)
            .map(|i| wm.open(&format!("app{i}")).unwrap().rect().origin())
            .collect();
        assert_eq!(origins[0], Point::new(2, 1));
        assert_eq!(origins[1], Point::new(4, 3));
        assert_eq!(origins[2], Point::new(6, 5));
        assert_eq!(origins[3], Point::new(8, 1));
    }

    #[test]
    fn taskbar_tracks_windows_in_lockstep() {
        let mut wm = wm();
        wm.open("system").unwrap();
        wm.open("alibi").unwrap();
        wm.minimize("system").unwrap();
        let bar = wm.taskbar();
        assert_eq!(bar.len(), 2);
        assert!(bar[0].minimized && !bar[0].active);
        assert!(bar[1].active && !bar[1].minimized);

        wm.close("alibi").unwrap();
        let bar = wm.taskbar();
        assert_eq!(bar.len(), 1);
        assert_eq!(bar[0].app_id.as_str(), "system");
    }

    #[test]
    fn minimize_passes_focus_to_topmost_visible() {
        let mut wm = wm();
        wm.open("system").unwrap();
        wm.open("alibi").unwrap();
        wm.open("maps").unwrap();
        wm.minimize("maps").unwrap();
        assert_eq!(wm.active().map(|w| w.app_id().as_str()), Some("alibi"));
        let maps = wm.get("maps").unwrap();
        assert!(maps.is_minimized());
        assert_eq!(maps.rect().origin(), Point::new(6, 5));
    }

    #[test]
    fn minimizing_last_visible_window_keeps_it_active() {
        let mut wm = wm();
        wm.open("system").unwrap();
        wm.minimize("system").unwrap();
        assert_single_active(&wm);
    }

    #[test]
    fn taskbar_click_cycles_restore_minimize_focus() {
        let mut wm = wm();
        wm.open("system").unwrap();
        wm.open("alibi").unwrap();

        wm.activate_from_taskbar("system").unwrap();
        assert!(wm.get("system").unwrap().is_active());

        wm.activate_from_taskbar("system").unwrap();
        assert!(wm.get("system").unwrap().is_minimized());
        assert!(wm.get("alibi").unwrap().is_active());

        wm.activate_from_taskbar("system").unwrap();
        let sys = wm.get("system").unwrap();
        assert!(!sys.is_minimized() && sys.is_active());
    }

    #[test]
    fn drag_moves_and_focuses() {
        let mut wm = wm();
        wm.open("system").unwrap();
        wm.open("alibi").unwrap();
        wm.drag("system", 3, -1).unwrap();
        let sys = wm.get("system").unwrap();
        assert!(sys.is_active());
        assert_eq!(sys.rect().origin(), Point::new(5, 0));
    }

    #[test]
    fn drag_keeps_header_on_desktop() {
        let mut wm = wm();
        wm.open("system").unwrap();
        wm.drag("system", -10_000, -10_000).unwrap();
        let r = wm.get("system").unwrap().rect();
        assert_eq!(r.y, 0);
        assert_eq!(r.right(), 1);
        wm.drag("system", 50_000, 50_000).unwrap();
        let r = wm.get("system").unwrap().rect();
        assert_eq!(r.x, 199);
        assert_eq!(r.y, 58);
    }

    #[test]
    fn maximized_window_is_focused_but_not_moved() {
        let mut wm = wm();
        wm.open("system").unwrap();
        wm.open("alibi").unwrap();
        wm.toggle_maximize("system").unwrap();
        wm.bring_to_front("alibi").unwrap();
        wm.drag("system", 4, 4).unwrap();
        wm.resize("system", 4, 4).unwrap();
        let sys = wm.get("system").unwrap();
        assert!(sys.is_active());
        assert_eq!(sys.rect(), wm.desktop_area());
    }

    #[test]
    fn missing_window_reports_not_open() {
        let mut wm = wm();
        assert_eq!(
            wm.minimize("system"),
            Err(DesktopError::WindowNotOpen(AppId::from("system")))
        );
        assert!(wm.is_empty());
    }

    #[test]
    fn fragment_follows_open_and_close() {
        let mut wm = wm();
        assert_eq!(wm.fragment(), None);
        wm.open("system").unwrap();
        let mut params = Params::new();
        params.insert("search".into(), "car".into());
        wm.open_with("lemon-list", &params).unwrap();
        assert_eq!(wm.fragment(), Some("#lemon-list?search=car"));

        wm.close("lemon-list").unwrap();
        assert_eq!(wm.fragment(), Some("#system"));
        wm.close("system").unwrap();
        assert_eq!(wm.fragment(), None);
    }

    #[test]
    fn fragment_keeps_params_of_the_window_it_returns_to() {
        let mut wm = wm();
        let mut params = Params::new();
        params.insert("search".into(), "car".into());
        wm.open_with("lemon-list", &params).unwrap();
        wm.open("system").unwrap();
        assert_eq!(wm.fragment(), Some("#system"));

        wm.close("system").unwrap();
        assert_eq!(wm.fragment(), Some("#lemon-list?search=car"));

        wm.open("system").unwrap();
        wm.open("lemon-list").unwrap();
        assert_eq!(wm.fragment(), Some("#lemon-list?search=car"));
        assert_eq!(wm.get("lemon-list").unwrap().params(), &params);

        let mut typed = Params::new();
        typed.insert("search".into(), "cab".into());
        wm.set_fragment(&AppId::from("lemon-list"), &typed);
        wm.close("system").unwrap();
        assert_eq!(wm.fragment(), Some("#lemon-list?search=cab"));
    }

    #[test]
    fn viewport_change_refits_maximized_windows() {
        let mut wm = wm();
        wm.open("alibi").unwrap();
        wm.toggle_maximize("alibi").unwrap();
        wm.set_viewport(Size::new(100, 30));
        assert_eq!(wm.get("alibi").unwrap().rect(), Rect::new(0, 0, 100, 29));
    }

    #[test]
    fn window_at_picks_topmost_visible() {
        let mut wm = wm();
        wm.open("system").unwrap();
        wm.open("alibi").unwrap();
        let p = Point::new(10, 10);
        assert_eq!(wm.window_at(p).map(|w| w.app_id().as_str()), Some("alibi"));
        wm.minimize("alibi").unwrap();
        assert_eq!(wm.window_at(p).map(|w| w.app_id().as_str()), Some("system"));
    }
}
