use anyhow::Result;
use chrono::{Local, Utc};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEventKind,
};
use crossterm::execute;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::time::{Duration, Instant};

use crate::apps::KeyInput;
use crate::config::{next_theme, persist_settings, update_settings};
use crate::core::gesture::{
    close_button_rect, content_rect, max_button_rect, min_button_rect, PointerEvent,
    TITLE_CLOSE_BUTTON, TITLE_MAX_BUTTON, TITLE_MIN_BUTTON, TITLE_RESTORE_BUTTON,
};
use crate::core::registry::{AccessLevel, AppId};
use crate::core::router::Params;
use crate::core::shell::{DesktopIcon, Shell};
use crate::core::window_manager::{TaskbarEntry, WindowInstance};
use crate::core::{geometry, Point, Size};
use crate::ui::{
    desktop_style, dim_style, input_prompt, normal_style, render_message_box, sel_style,
    title_style, tone_style, Term,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopExit {
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartAction {
    Login,
    Logout,
    Theme,
    Shutdown,
}

const START_ITEMS: [(&str, StartAction); 4] = [
    ("Log in...", StartAction::Login),
    ("Log out", StartAction::Logout),
    ("Change theme", StartAction::Theme),
    ("Shut down", StartAction::Shutdown),
];

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(450);
const TASK_START_BUTTON: &str = "[Start]";
const TASK_START_SEPARATOR: &str = " | ";
const TASK_LABEL_MAX: usize = 16;
const ICON_W: u16 = 14;
const ICON_H: u16 = 3;
const RESIZE_GRIP: &str = "◢";

#[derive(Debug, Clone, Copy)]
struct LastClick {
    icon: usize,
    at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TaskButton {
    app_id: AppId,
    rect: Rect,
}

#[derive(Debug, Default)]
struct StartState {
    open: bool,
    selected: usize,
}

struct DesktopState {
    shell: Shell,
    start: StartState,
    selected_icon: usize,
    last_click: Option<LastClick>,
    cursor_x: u16,
    cursor_y: u16,
}

pub fn desktop_mode(terminal: &mut Term, shell: Shell) -> Result<DesktopExit> {
    let _ = terminal.hide_cursor();
    execute!(terminal.backend_mut(), EnableMouseCapture)?;
    let result = run_desktop_loop(terminal, shell);
    let _ = execute!(terminal.backend_mut(), DisableMouseCapture);
    let _ = terminal.show_cursor();
    result
}

fn run_desktop_loop(terminal: &mut Term, shell: Shell) -> Result<DesktopExit> {
    let mut state = DesktopState {
        shell,
        start: StartState::default(),
        selected_icon: 0,
        last_click: None,
        cursor_x: 0,
        cursor_y: 0,
    };
    let ts = terminal.size()?;
    state
        .shell
        .set_viewport(Size::new(u32::from(ts.width), u32::from(ts.height)));

    loop {
        draw_desktop(terminal, &state)?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
                        continue;
                    }
                    if let Some(exit) = handle_key(terminal, &mut state, key.code, key.modifiers)? {
                        return Ok(exit);
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(exit) = handle_mouse(terminal, &mut state, mouse)? {
                        return Ok(exit);
                    }
                }
                Event::Resize(w, h) => {
                    state
                        .shell
                        .set_viewport(Size::new(u32::from(w), u32::from(h)));
                }
                _ => {}
            }
        }
    }
}

// ── Input ─────────────────────────────────────────────────────────────────────

fn to_key_input(code: KeyCode) -> Option<KeyInput> {
    Some(match code {
        KeyCode::Char(c) => KeyInput::Char(c),
        KeyCode::Backspace => KeyInput::Backspace,
        KeyCode::Enter => KeyInput::Enter,
        KeyCode::Tab => KeyInput::Tab,
        KeyCode::BackTab => KeyInput::BackTab,
        KeyCode::Up => KeyInput::Up,
        KeyCode::Down => KeyInput::Down,
        KeyCode::Left => KeyInput::Left,
        KeyCode::Right => KeyInput::Right,
        KeyCode::PageUp => KeyInput::PageUp,
        KeyCode::PageDown => KeyInput::PageDown,
        KeyCode::Esc => KeyInput::Esc,
        _ => return None,
    })
}

fn handle_key(
    terminal: &mut Term,
    state: &mut DesktopState,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<Option<DesktopExit>> {
    let now = Utc::now();

    if modifiers.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return Ok(Some(DesktopExit::Shutdown));
    }

    if !state.shell.dialogs().is_empty() {
        if let Some(input) = to_key_input(code) {
            state.shell.key(input, now);
        }
        return Ok(None);
    }

    if state.start.open {
        match code {
            KeyCode::Esc | KeyCode::F(10) => state.start.open = false,
            KeyCode::Up => state.start.selected = state.start.selected.saturating_sub(1),
            KeyCode::Down => {
                state.start.selected = (state.start.selected + 1).min(START_ITEMS.len() - 1)
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let action = START_ITEMS[state.start.selected].1;
                return run_start_action(terminal, state, action);
            }
            _ => {}
        }
        return Ok(None);
    }

    if matches!(code, KeyCode::F(10)) {
        state.start = StartState {
            open: true,
            selected: 0,
        };
        return Ok(None);
    }

    let active = state
        .shell
        .window_manager()
        .active()
        .filter(|w| w.is_visible())
        .map(|w| w.app_id().clone());

    if modifiers.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('w')) {
        if let Some(id) = active {
            state.shell.close_app(id.as_str());
        }
        return Ok(None);
    }
    if matches!(code, KeyCode::F(6)) {
        focus_next_window(state);
        return Ok(None);
    }

    if active.is_some() {
        if let Some(input) = to_key_input(code) {
            state.shell.key(input, now);
        }
        return Ok(None);
    }

    // No window has focus: arrows walk the desktop icons.
    let icons = state.shell.desktop_icons(now);
    if icons.is_empty() {
        return Ok(None);
    }
    let per_col = icons_per_column(desk_rect(terminal, &state.shell)?);
    match code {
        KeyCode::Up => state.selected_icon = state.selected_icon.saturating_sub(1),
        KeyCode::Down => state.selected_icon = (state.selected_icon + 1).min(icons.len() - 1),
        KeyCode::Left => state.selected_icon = state.selected_icon.saturating_sub(per_col),
        KeyCode::Right => {
            state.selected_icon = (state.selected_icon + per_col).min(icons.len() - 1)
        }
        KeyCode::Enter => {
            if let Some(icon) = icons.get(state.selected_icon) {
                state.shell.open_app(icon.app_id.as_str(), &Params::new(), now);
            }
        }
        _ => {}
    }
    Ok(None)
}

fn handle_mouse(
    terminal: &mut Term,
    state: &mut DesktopState,
    mouse: crossterm::event::MouseEvent,
) -> Result<Option<DesktopExit>> {
    let now = Utc::now();
    state.cursor_x = mouse.column;
    state.cursor_y = mouse.row;
    let p = Point::new(i32::from(mouse.column), i32::from(mouse.row));

    match mouse.kind {
        MouseEventKind::Drag(MouseButton::Left) => {
            state.shell.pointer(PointerEvent::Move(p), now);
            return Ok(None);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            state.shell.pointer(PointerEvent::Up, now);
            return Ok(None);
        }
        MouseEventKind::Down(MouseButton::Left) => {}
        _ => return Ok(None),
    }

    if !state.shell.dialogs().is_empty() {
        state.shell.dismiss_dialog();
        return Ok(None);
    }

    let size = terminal.size()?;
    let screen = Rect::new(0, 0, size.width, size.height);
    let task = taskbar_area(screen, state.shell.window_manager().taskbar_height());

    if state.start.open {
        if let Some(idx) = hit_start_menu(task, mouse.column, mouse.row) {
            state.start.selected = idx;
            return run_start_action(terminal, state, START_ITEMS[idx].1);
        }
        state.start.open = false;
    }

    if point_in_rect(mouse.column, mouse.row, task) {
        if point_in_rect(mouse.column, mouse.row, start_button_rect(task)) {
            state.start = StartState {
                open: true,
                selected: 0,
            };
            return Ok(None);
        }
        let entries = state.shell.window_manager().taskbar();
        if let Some(btn) = taskbar_layout(&entries, task, clock_text().chars().count())
            .into_iter()
            .find(|b| point_in_rect(mouse.column, mouse.row, b.rect))
        {
            state.shell.click_taskbar(btn.app_id.as_str());
        }
        return Ok(None);
    }

    if let crate::core::gesture::GestureOutcome::Desktop(_) =
        state.shell.pointer(PointerEvent::Down(p), now)
    {
        let desk = desk_rect(terminal, &state.shell)?;
        let icons = state.shell.desktop_icons(now);
        if let Some(idx) = icon_at(icons.len(), desk, mouse.column, mouse.row) {
            state.selected_icon = idx;
            if is_double_click(state, idx) {
                state
                    .shell
                    .open_app(icons[idx].app_id.as_str(), &Params::new(), now);
            }
        }
    }
    Ok(None)
}

fn is_double_click(state: &mut DesktopState, icon: usize) -> bool {
    let now = Instant::now();
    if let Some(prev) = state.last_click {
        if prev.icon == icon && now.duration_since(prev.at) <= DOUBLE_CLICK_WINDOW {
            state.last_click = None;
            return true;
        }
    }
    state.last_click = Some(LastClick { icon, at: now });
    false
}

fn focus_next_window(state: &mut DesktopState) {
    let entries = state.shell.window_manager().taskbar();
    if entries.is_empty() {
        return;
    }
    let current = entries.iter().position(|e| e.active).unwrap_or(0);
    let next = &entries[(current + 1) % entries.len()];
    if next.minimized || !next.active {
        state.shell.click_taskbar(next.app_id.as_str());
    }
}

fn run_start_action(
    terminal: &mut Term,
    state: &mut DesktopState,
    action: StartAction,
) -> Result<Option<DesktopExit>> {
    state.start.open = false;
    let now = Utc::now();
    match action {
        StartAction::Login => {
            if let Some(password) = input_prompt(terminal, "Enter password:", true)? {
                if !password.is_empty() {
                    state.shell.login(&password, now);
                }
            }
        }
        StartAction::Logout => {
            state.shell.logout(now);
            state.shell.show_dialog("Log out", "You have been logged out.");
        }
        StartAction::Theme => {
            update_settings(|s| s.theme = next_theme(&s.theme).to_string());
            if let Err(e) = persist_settings() {
                log::warn!("saving settings: {e:#}");
            }
        }
        StartAction::Shutdown => return Ok(Some(DesktopExit::Shutdown)),
    }
    Ok(None)
}

// ── Drawing ───────────────────────────────────────────────────────────────────

fn draw_desktop(terminal: &mut Term, state: &DesktopState) -> Result<()> {
    let now = Utc::now();
    terminal.draw(|f| {
        let size = f.area();
        let wm = state.shell.window_manager();
        let task = taskbar_area(size, wm.taskbar_height());
        let desk = Rect::new(size.x, size.y, size.width, size.height.saturating_sub(task.height));

        // Fully clear each frame so overlapped windows cannot leak old cells.
        f.render_widget(Clear, size);

        draw_desktop_background(f, desk);
        let icons = state.shell.desktop_icons(now);
        let icon_focus = wm.active().map_or(true, |w| !w.is_visible());
        draw_icons(f, desk, &icons, icon_focus.then_some(state.selected_icon));

        for win in wm.windows_by_z() {
            draw_window(f, state, win, desk);
        }

        draw_taskbar(f, state, task);

        if state.start.open {
            draw_start_menu(f, task, state);
        }

        if let Some(dialog) = state.shell.dialogs().front() {
            render_message_box(f, desk, &dialog.title, &dialog.message);
        }

        draw_cursor(f, state.cursor_x, state.cursor_y, size);
    })?;
    Ok(())
}

fn draw_desktop_background(f: &mut ratatui::Frame, area: Rect) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let lines: Vec<Line> = (0..area.height)
        .map(|_| Line::from(Span::styled(" ".repeat(area.width as usize), desktop_style())))
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_icons(f: &mut ratatui::Frame, desk: Rect, icons: &[DesktopIcon], selected: Option<usize>) {
    for (idx, icon) in icons.iter().enumerate() {
        let r = icon_rect(idx, desk);
        if r.width == 0 || r.height == 0 || r.y + r.height > desk.y + desk.height {
            continue;
        }
        let label_style = if selected == Some(idx) {
            sel_style()
        } else if icon.enabled {
            normal_style()
        } else {
            dim_style()
        };
        let glyph = if icon.enabled {
            icon.icon.clone()
        } else {
            format!("{} 🔒", icon.icon)
        };
        let lines = vec![
            Line::from(Span::styled(format!(" {glyph}"), title_style())),
            Line::from(Span::styled(icon.name.clone(), label_style)),
        ];
        f.render_widget(Paragraph::new(lines), r);
    }
}

fn draw_window(f: &mut ratatui::Frame, state: &DesktopState, win: &WindowInstance, screen: Rect) {
    if !win.is_visible() {
        return;
    }
    let full = win.rect();
    let Some(area) = clip_to_screen(full, screen) else {
        return;
    };
    if full.width < 8 || full.height < 3 {
        return;
    }

    // Ensure this window is fully opaque over anything behind it.
    f.render_widget(Clear, area);

    let focused = win.is_active();
    let border_style = if focused { title_style() } else { dim_style() };
    f.render_widget(
        Block::default().borders(Borders::ALL).style(border_style),
        area,
    );

    // Header laid out over the full width, then cut to what is on screen.
    let mut chars: Vec<char> = vec![' '; full.width as usize];
    write_text(&mut chars, 1, &format!(" {} {} ", win.icon(), win.title()));
    let offset = |r: geometry::Rect| (r.x - full.x).max(0) as usize;
    write_text(&mut chars, offset(close_button_rect(full)), TITLE_CLOSE_BUTTON);
    if let Some(max) = max_button_rect(full, win.is_maximizable()) {
        let label = if win.is_maximized() {
            TITLE_RESTORE_BUTTON
        } else {
            TITLE_MAX_BUTTON
        };
        write_text(&mut chars, offset(max), label);
    }
    write_text(
        &mut chars,
        offset(min_button_rect(full, win.is_maximizable())),
        TITLE_MIN_BUTTON,
    );
    let skip = (i64::from(area.x) - i64::from(full.x)).max(0) as usize;
    let header: String = chars.into_iter().skip(skip).take(area.width as usize).collect();
    let header_style = if focused { sel_style() } else { dim_style() };
    if i64::from(full.y) == i64::from(area.y) {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(header, header_style))),
            Rect::new(area.x, area.y, area.width, 1),
        );
    }

    let content = content_rect(full);
    if let Some(inner) = clip_to_screen(content, area) {
        let lines: Vec<Line> = state
            .shell
            .content_lines(win.app_id().as_str(), content.width as usize)
            .into_iter()
            .map(|l| Line::from(Span::styled(l.text, tone_style(l.tone))))
            .collect();
        let dx = (i64::from(inner.x) - i64::from(content.x)).max(0) as u16;
        f.render_widget(Paragraph::new(lines).scroll((0, dx)), inner);
    }

    if win.is_resizable() && !win.is_maximized() {
        let gx = full.right() - 1;
        let gy = full.bottom() - 1;
        if let (Ok(gx), Ok(gy)) = (u16::try_from(gx), u16::try_from(gy)) {
            if point_in_rect(gx, gy, area) {
                f.render_widget(
                    Paragraph::new(Span::styled(RESIZE_GRIP, border_style)),
                    Rect::new(gx, gy, 1, 1),
                );
            }
        }
    }
}

fn draw_taskbar(f: &mut ratatui::Frame, state: &DesktopState, area: Rect) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let width = area.width as usize;
    let mut row = vec![' '; width];
    write_text(&mut row, 0, TASK_START_BUTTON);
    write_text(&mut row, TASK_START_BUTTON.len(), TASK_START_SEPARATOR);

    let clock = clock_text();
    let clock_w = clock.chars().count();
    let entries = state.shell.window_manager().taskbar();
    for btn in taskbar_layout(&entries, area, clock_w) {
        if let Some(entry) = entries.iter().find(|e| e.app_id == btn.app_id) {
            write_text(&mut row, (btn.rect.x - area.x) as usize, &task_button_text(entry));
        }
    }
    if width > clock_w {
        write_text(&mut row, width - clock_w, &clock);
    }

    let line: String = row.into_iter().collect();
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(line, sel_style()))),
        Rect::new(area.x, area.y, area.width, 1),
    );

    if area.height > 1 {
        let link = state.shell.window_manager().fragment().unwrap_or("#");
        let level = state.shell.access_level(Utc::now());
        let lock = if level > AccessLevel::DEFAULT {
            format!(" level {level} ")
        } else {
            String::new()
        };
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!(" {link}"), dim_style()),
                Span::styled(lock, title_style()),
            ])),
            Rect::new(area.x, area.y + 1, area.width, 1),
        );
    }
}

fn draw_start_menu(f: &mut ratatui::Frame, task: Rect, state: &DesktopState) {
    let r = start_menu_rect(task);
    f.render_widget(Clear, r);
    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(" Vixen 98 ", title_style()))
            .style(normal_style()),
        r,
    );
    let inner_w = r.width.saturating_sub(2) as usize;
    let lines: Vec<Line> = START_ITEMS
        .iter()
        .enumerate()
        .map(|(i, (label, _))| {
            let style = if i == state.start.selected {
                sel_style()
            } else {
                normal_style()
            };
            let mut chars = vec![' '; inner_w];
            write_text(&mut chars, 0, &format!(" {label}"));
            Line::from(Span::styled(chars.into_iter().collect::<String>(), style))
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines),
        Rect::new(r.x + 1, r.y + 1, r.width.saturating_sub(2), r.height.saturating_sub(2)),
    );
}

fn draw_cursor(f: &mut ratatui::Frame, x: u16, y: u16, size: Rect) {
    if x >= size.width || y >= size.height {
        return;
    }
    f.render_widget(
        Paragraph::new(Line::from(Span::styled("+", sel_style()))),
        Rect::new(x, y, 1, 1),
    );
}

// ── Layout ────────────────────────────────────────────────────────────────────

fn clock_text() -> String {
    Local::now().format(" %-I:%M %p ").to_string()
}

fn desk_rect(terminal: &Term, shell: &Shell) -> Result<Rect> {
    let size = terminal.size()?;
    let task_h = shell.window_manager().taskbar_height().min(u32::from(u16::MAX)) as u16;
    Ok(Rect::new(0, 0, size.width, size.height.saturating_sub(task_h)))
}

fn taskbar_area(size: Rect, height: u32) -> Rect {
    let h = (height.min(u32::from(u16::MAX)) as u16).min(size.height);
    Rect::new(size.x, size.y + size.height - h, size.width, h)
}

fn start_button_rect(task: Rect) -> Rect {
    Rect::new(
        task.x,
        task.y,
        (TASK_START_BUTTON.len() as u16).min(task.width),
        task.height.min(1),
    )
}

fn start_menu_rect(task: Rect) -> Rect {
    let h = START_ITEMS.len() as u16 + 2;
    Rect::new(task.x, task.y.saturating_sub(h), 24.min(task.width), h)
}

fn hit_start_menu(task: Rect, x: u16, y: u16) -> Option<usize> {
    let r = start_menu_rect(task);
    let inner = Rect::new(r.x + 1, r.y + 1, r.width.saturating_sub(2), r.height.saturating_sub(2));
    if !point_in_rect(x, y, inner) {
        return None;
    }
    Some((y - inner.y) as usize).filter(|i| *i < START_ITEMS.len())
}

fn task_button_text(entry: &TaskbarEntry) -> String {
    let label: String = entry.title.chars().take(TASK_LABEL_MAX).collect();
    if entry.minimized {
        format!("({label})")
    } else if entry.active {
        format!("[*{label}]")
    } else {
        format!("[{label}]")
    }
}

/// Buttons after the start button, in open order, stopping before the clock.
fn taskbar_layout(entries: &[TaskbarEntry], task: Rect, clock_w: usize) -> Vec<TaskButton> {
    let mut out = Vec::new();
    if task.height == 0 || task.width == 0 {
        return out;
    }
    let end = u32::from(task.x) + u32::from(task.width).saturating_sub(clock_w as u32);
    let mut x = u32::from(task.x) + (TASK_START_BUTTON.len() + TASK_START_SEPARATOR.len()) as u32;
    for entry in entries {
        let width = task_button_text(entry).chars().count() as u32;
        if x + width >= end {
            break;
        }
        out.push(TaskButton {
            app_id: entry.app_id.clone(),
            rect: Rect::new(x as u16, task.y, width as u16, 1),
        });
        x += width + 1;
    }
    out
}

fn icons_per_column(desk: Rect) -> usize {
    (desk.height.saturating_sub(1) / ICON_H).max(1) as usize
}

fn icon_rect(idx: usize, desk: Rect) -> Rect {
    let per_col = icons_per_column(desk);
    let col = (idx / per_col) as u16;
    let row = (idx % per_col) as u16;
    let x = desk.x + 2 + col.saturating_mul(ICON_W);
    let y = desk.y + 1 + row * ICON_H;
    if x >= desk.x + desk.width {
        return Rect::new(x, y, 0, 0);
    }
    Rect::new(x, y, (ICON_W - 2).min(desk.x + desk.width - x), 2)
}

fn icon_at(count: usize, desk: Rect, x: u16, y: u16) -> Option<usize> {
    (0..count).find(|&i| point_in_rect(x, y, icon_rect(i, desk)))
}

/// Part of a window rect that falls on `screen`, if any.
fn clip_to_screen(r: geometry::Rect, screen: Rect) -> Option<Rect> {
    let left = i64::from(r.x).max(i64::from(screen.x));
    let top = i64::from(r.y).max(i64::from(screen.y));
    let right = r.right().min(i64::from(screen.x) + i64::from(screen.width));
    let bottom = r.bottom().min(i64::from(screen.y) + i64::from(screen.height));
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(
        left as u16,
        top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    ))
}

fn point_in_rect(x: u16, y: u16, r: Rect) -> bool {
    x >= r.x && x < r.x.saturating_add(r.width) && y >= r.y && y < r.y.saturating_add(r.height)
}

fn write_text(buf: &mut [char], start: usize, text: &str) {
    for (i, ch) in text.chars().enumerate() {
        let idx = start + i;
        if idx >= buf.len() {
            break;
        }
        buf[idx] = ch;
    }
}
