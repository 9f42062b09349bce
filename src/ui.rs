use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::time::Duration;

use crate::apps::Tone;
use crate::config::{current_theme_color, HEADER_LINES};

pub type Term = Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>;

// ── Padding ───────────────────────────────────────────────────────────────────
// Horizontal padding applied to every full-screen page.
const H_PAD: u16 = 3;

/// Shrink a rect by H_PAD columns on each side.
pub fn pad_horizontal(area: Rect) -> Rect {
    let pad = H_PAD.min(area.width / 2);
    Rect {
        x: area.x + pad,
        y: area.y,
        width: area.width.saturating_sub(pad * 2),
        height: area.height,
    }
}

// ── Color helpers ─────────────────────────────────────────────────────────────

pub fn normal_style()   -> Style { Style::default().fg(current_theme_color()) }
pub fn sel_style()      -> Style { Style::default().fg(Color::Black).bg(current_theme_color()).add_modifier(Modifier::BOLD) }
pub fn title_style()    -> Style { Style::default().fg(current_theme_color()).add_modifier(Modifier::BOLD) }
pub fn dim_style()      -> Style { Style::default().fg(current_theme_color()).add_modifier(Modifier::DIM) }
pub fn error_style()    -> Style { Style::default().fg(Color::Red).add_modifier(Modifier::BOLD) }
pub fn desktop_style()  -> Style { Style::default().bg(Color::Black).fg(current_theme_color()) }

pub fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Normal => normal_style(),
        Tone::Heading => title_style(),
        Tone::Selected => sel_style(),
        Tone::Dim => dim_style(),
        Tone::Error => error_style(),
    }
}

// ── Header ────────────────────────────────────────────────────────────────────

pub fn render_header(f: &mut Frame, area: Rect) {
    let inner = pad_horizontal(area);
    let lines: Vec<Line> = HEADER_LINES
        .iter()
        .map(|l| Line::from(Span::styled(*l, title_style())))
        .collect();
    let p = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(p, inner);
}

pub fn render_separator(f: &mut Frame, area: Rect) {
    let inner = pad_horizontal(area);
    let sep = "=".repeat(inner.width as usize);
    let p = Paragraph::new(sep).alignment(Alignment::Center).style(dim_style());
    f.render_widget(p, inner);
}

fn render_hint(f: &mut Frame, area: Rect, hint: &str) {
    let p = Paragraph::new(hint).style(dim_style());
    f.render_widget(p, pad_horizontal(area));
}

// ── Text input ────────────────────────────────────────────────────────────────

/// Read one line. `masked` echoes `*` instead of the typed characters.
pub fn input_prompt(terminal: &mut Term, prompt: &str, masked: bool) -> Result<Option<String>> {
    let mut buf = String::new();

    loop {
        terminal.draw(|f| {
            let size = f.area();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(1),
                    Constraint::Min(1),
                    Constraint::Length(1),
                ])
                .split(size);

            render_header(f, chunks[0]);
            render_separator(f, chunks[1]);

            let content_area = pad_horizontal(chunks[2]);
            let shown = if masked {
                "*".repeat(buf.chars().count())
            } else {
                buf.clone()
            };
            let display = format!("{prompt}\n\n  > {shown}█");
            let p = Paragraph::new(display).style(normal_style());
            f.render_widget(p, content_area);
            render_hint(f, chunks[3], "Enter = submit   Esc = cancel");
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press { continue; }
                match key.code {
                    KeyCode::Enter => return Ok(Some(buf.trim().to_string())),
                    KeyCode::Esc => return Ok(None),
                    KeyCode::Backspace => {
                        buf.pop();
                    }
                    KeyCode::Char(c) => {
                        if (c as u32) >= 32 {
                            buf.push(c);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

// ── Box overlay ───────────────────────────────────────────────────────────────

/// Centered box of `width` x `height` inside `area`, clamped to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + area.width.saturating_sub(w) / 2,
        area.y + area.height.saturating_sub(h) / 2,
        w,
        h,
    )
}

/// Modal message box with a title and an `[ OK ]` footer.
pub fn render_message_box(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let text_w = message
        .lines()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(title.chars().count() + 4);
    let w = (text_w + 6).min(u16::MAX as usize) as u16;
    let h = (message.lines().count() + 5).min(u16::MAX as usize) as u16;
    let rect = centered_rect(area, w, h);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(format!(" {title} "), sel_style()))
        .border_style(title_style())
        .style(desktop_style());
    let inner = block.inner(rect);
    f.render_widget(Clear, rect);
    f.render_widget(block, rect);

    let mut lines: Vec<Line> = message
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), normal_style())))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("[ OK ]", sel_style())));
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clamped() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect(area, 10, 4), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect(area, 50, 50), area);
    }

    #[test]
    fn padding_never_exceeds_half_width() {
        let r = pad_horizontal(Rect::new(0, 0, 4, 1));
        assert_eq!(r.width, 0);
        assert_eq!(pad_horizontal(Rect::new(0, 0, 20, 1)).x, 3);
    }
}
