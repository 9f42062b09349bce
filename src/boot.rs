use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::time::{Duration, Instant};

use crate::config::current_theme_color;
use crate::ui::Term;

fn themed_style() -> Style {
    Style::default().fg(current_theme_color())
}

/// The splash runs at most this long before the desktop appears.
pub const SPLASH_DURATION: Duration = Duration::from_millis(8500);

const LOGO: &[&str] = &[
    r" __     ___                    ___   ___  ",
    r" \ \   / (_)_  _____ _ __     / _ \ ( _ ) ",
    r"  \ \ / /| \ \/ / _ \ '_ \   | (_) |/ _ \ ",
    r"   \ V / | |>  <  __/ | | |   \__, | (_) |",
    r"    \_/  |_/_/\_\___|_| |_|     /_/ \___/ ",
];

const SEQUENCES: &[(&str, u64, u64)] = &[
    ("VIXEN BIOS v4.98\nMemory test: 65536K OK\nDetecting drives... C: D:",   15, 700),
    ("Starting Vixen 98...",                                                   40, 900),
    ("Loading desktop\nMounting C:\\COOKIES\nConnecting to delivery network", 20, 900),
];

/// Typed-out boot lines followed by the logo. Any of Space, Enter or Esc skips.
pub fn splash(terminal: &mut Term) -> Result<()> {
    let started = Instant::now();
    let mut displayed_lines: Vec<String> = Vec::new();

    'outer: for (text, char_delay_ms, pause_ms) in SEQUENCES {
        displayed_lines.clear();

        for line in text.lines() {
            let mut built = String::new();
            for ch in line.chars() {
                built.push(ch);
                let mut render_lines = displayed_lines.clone();
                render_lines.push(built.clone());

                terminal.draw(|f| draw_boot(f, &render_lines))?;

                if check_skip()? || started.elapsed() >= SPLASH_DURATION {
                    break 'outer;
                }
                std::thread::sleep(Duration::from_millis(*char_delay_ms));
            }
            displayed_lines.push(built);
        }

        for _ in 0..pause_ms / 50 {
            terminal.draw(|f| draw_boot(f, &displayed_lines))?;
            if check_skip()? {
                break 'outer;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }

    let logo: Vec<String> = LOGO.iter().map(|l| l.to_string()).collect();
    while started.elapsed() < SPLASH_DURATION {
        terminal.draw(|f| draw_boot(f, &logo))?;
        if check_skip()? {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    terminal.draw(|f| f.render_widget(Paragraph::new(""), f.area()))?;
    std::thread::sleep(Duration::from_millis(300));
    Ok(())
}

fn draw_boot(f: &mut Frame, lines: &[String]) {
    let size = f.area();
    let style = themed_style();
    let text_lines: Vec<Line> = lines
        .iter()
        .map(|l| Line::from(Span::styled(l.as_str(), style)))
        .collect();
    let p = Paragraph::new(text_lines).alignment(Alignment::Center);
    // Center vertically
    let top = size.height.saturating_sub(lines.len() as u16) / 2;
    let pad = 3u16;
    let area = Rect {
        x: pad,
        y: top,
        width: size.width.saturating_sub(pad * 2),
        height: size.height.saturating_sub(top),
    };
    f.render_widget(p, area);

    let hint = Paragraph::new(Span::styled("SPACE to skip", Style::default().fg(Color::DarkGray)))
        .alignment(Alignment::Center);
    let hint_area = Rect {
        x: 0,
        y: size.height.saturating_sub(1),
        width: size.width,
        height: 1,
    };
    f.render_widget(hint, hint_area);
}

/// Returns true if the user pressed a skip key.
fn check_skip() -> Result<bool> {
    if event::poll(Duration::from_millis(0))? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press
                && matches!(k.code, KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Esc)
            {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
