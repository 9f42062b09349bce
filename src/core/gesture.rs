//! Pointer gestures over window chrome.
//!
//! `Idle → Dragging | Resizing → Idle`. A press on the header starts a drag,
//! a press on the bottom-right corner starts a resize, the header buttons act
//! immediately and anything else inside a window only focuses it.

use super::error::Result;
use super::geometry::{Point, Rect};
use super::registry::AppId;
use super::window_manager::{WindowInstance, WindowManager};

pub const TITLE_MIN_BUTTON: &str = "[-]";
pub const TITLE_MAX_BUTTON: &str = "[+]";
pub const TITLE_RESTORE_BUTTON: &str = "[R]";
pub const TITLE_CLOSE_BUTTON: &str = "[X]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowHit {
    Title,
    Minimize,
    Maximize,
    Close,
    Resize,
    /// Cell relative to the top-left of the content area.
    Content(Point),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        app: AppId,
        /// Pointer position relative to the window origin at press time.
        grab: Point,
    },
    Resizing {
        app: AppId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    None,
    /// Press landed on no window.
    Desktop(Point),
    Focused(AppId),
    Content { app: AppId, cell: Point },
    Minimized(AppId),
    Maximized(AppId),
    Closed(AppId),
    Moved(AppId),
    Resized(AppId),
}

// ── Chrome layout ─────────────────────────────────────────────────────────────

fn button_width(label: &str) -> u32 {
    label.chars().count() as u32
}

pub fn close_button_rect(win: Rect) -> Rect {
    let w = button_width(TITLE_CLOSE_BUTTON);
    Rect::new(
        win.x + win.width.saturating_sub(w + 1) as i32,
        win.y,
        w,
        1,
    )
}

/// `None` for apps that cannot be maximized.
pub fn max_button_rect(win: Rect, maximizable: bool) -> Option<Rect> {
    if !maximizable {
        return None;
    }
    let close = close_button_rect(win);
    let w = button_width(TITLE_MAX_BUTTON);
    Some(Rect::new(close.x - w as i32, win.y, w, 1))
}

pub fn min_button_rect(win: Rect, maximizable: bool) -> Rect {
    let left_of = max_button_rect(win, maximizable).unwrap_or_else(|| close_button_rect(win));
    let w = button_width(TITLE_MIN_BUTTON);
    Rect::new(left_of.x - w as i32, win.y, w, 1)
}

/// Inside the one-cell border; the top border doubles as the header.
pub fn content_rect(win: Rect) -> Rect {
    Rect::new(
        win.x + 1,
        win.y + 1,
        win.width.saturating_sub(2),
        win.height.saturating_sub(2),
    )
}

pub fn hit_test(win: &WindowInstance, p: Point) -> Option<WindowHit> {
    let r = win.rect();
    if !r.contains(p) {
        return None;
    }
    if p.y == r.y {
        if close_button_rect(r).contains(p) {
            return Some(WindowHit::Close);
        }
        if max_button_rect(r, win.is_maximizable()).is_some_and(|b| b.contains(p)) {
            return Some(WindowHit::Maximize);
        }
        if min_button_rect(r, win.is_maximizable()).contains(p) {
            return Some(WindowHit::Minimize);
        }
        return Some(WindowHit::Title);
    }
    let corner = Point::new(
        (r.right() - 1) as i32,
        (r.bottom() - 1) as i32,
    );
    if p == corner && win.is_resizable() && !win.is_maximized() {
        return Some(WindowHit::Resize);
    }
    let c = content_rect(r);
    let cell = Point::new(p.x - c.x, p.y - c.y);
    Some(WindowHit::Content(cell))
}

// ── Tracker ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct GestureTracker {
    state: GestureState,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Drop an in-flight gesture on `app`, e.g. when its window closes.
    pub fn cancel_for(&mut self, app: &AppId) {
        let owns = match &self.state {
            GestureState::Dragging { app: a, .. } | GestureState::Resizing { app: a } => a == app,
            GestureState::Idle => false,
        };
        if owns {
            self.reset();
        }
    }

    pub fn handle(&mut self, wm: &mut WindowManager, event: PointerEvent) -> Result<GestureOutcome> {
        match event {
            PointerEvent::Down(p) => self.press(wm, p),
            PointerEvent::Move(p) => self.motion(wm, p),
            PointerEvent::Up => {
                self.reset();
                Ok(GestureOutcome::None)
            }
        }
    }

    fn press(&mut self, wm: &mut WindowManager, p: Point) -> Result<GestureOutcome> {
        self.reset();
        let Some((app, hit, origin)) = wm
            .window_at(p)
            .and_then(|w| hit_test(w, p).map(|h| (w.app_id().clone(), h, w.rect().origin())))
        else {
            return Ok(GestureOutcome::Desktop(p));
        };

        match hit {
            WindowHit::Close => {
                wm.close(app.as_str())?;
                Ok(GestureOutcome::Closed(app))
            }
            WindowHit::Minimize => {
                wm.minimize(app.as_str())?;
                Ok(GestureOutcome::Minimized(app))
            }
            WindowHit::Maximize => {
                wm.toggle_maximize(app.as_str())?;
                Ok(GestureOutcome::Maximized(app))
            }
            WindowHit::Title => {
                wm.bring_to_front(app.as_str())?;
                self.state = GestureState::Dragging {
                    app: app.clone(),
                    grab: Point::new(p.x - origin.x, p.y - origin.y),
                };
                Ok(GestureOutcome::Focused(app))
            }
            WindowHit::Resize => {
                wm.bring_to_front(app.as_str())?;
                self.state = GestureState::Resizing { app: app.clone() };
                Ok(GestureOutcome::Focused(app))
            }
            WindowHit::Content(cell) => {
                wm.bring_to_front(app.as_str())?;
                Ok(GestureOutcome::Content { app, cell })
            }
        }
    }

    fn motion(&mut self, wm: &mut WindowManager, p: Point) -> Result<GestureOutcome> {
        let state = self.state.clone();
        match state {
            GestureState::Idle => Ok(GestureOutcome::None),
            GestureState::Dragging { app, grab } => {
                let Some(rect) = wm.get(app.as_str()).map(|w| w.rect()) else {
                    self.reset();
                    return Ok(GestureOutcome::None);
                };
                let dx = p.x - grab.x - rect.x;
                let dy = p.y - grab.y - rect.y;
                wm.drag(app.as_str(), dx, dy)?;
                Ok(GestureOutcome::Moved(app))
            }
            GestureState::Resizing { app } => {
                let Some(rect) = wm.get(app.as_str()).map(|w| w.rect()) else {
                    self.reset();
                    return Ok(GestureOutcome::None);
                };
                let dw = i64::from(p.x) - (rect.right() - 1);
                let dh = i64::from(p.y) - (rect.bottom() - 1);
                wm.resize(app.as_str(), clamp_delta(dw), clamp_delta(dh))?;
                Ok(GestureOutcome::Resized(app))
            }
        }
    }
}

fn clamp_delta(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
