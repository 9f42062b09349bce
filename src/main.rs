use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::Env;
use ratatui::backend::CrosstermBackend;
use std::fs::OpenOptions;
use std::io::stdout;

use vixen::config::{self, get_settings};
use vixen::core::auth::{AuthGate, FileStore};
use vixen::core::{AppRegistry, Shell, Size};
use vixen::ui::Term;
use vixen::{boot, desktop};

// ── Terminal setup / teardown ─────────────────────────────────────────────────

fn init_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(ratatui::Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// The terminal belongs to the desktop, so log lines go to a file.
fn init_logging() -> Result<()> {
    let path = config::log_file();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ── Main application loop ─────────────────────────────────────────────────────

fn run(terminal: &mut Term, mut shell: Shell, show_splash: bool, fragment: Option<&str>) -> Result<()> {
    if show_splash {
        boot::splash(terminal)?;
    }
    if let Some(fragment) = fragment {
        shell.navigate(fragment, Utc::now());
    }
    let exit = desktop::desktop_mode(terminal, shell)?;
    log::info!("desktop exited: {exit:?}");
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let no_splash = args.iter().any(|a| a == "--no-splash");
    let fragment = args.iter().find(|a| !a.starts_with("--")).cloned();

    init_logging()?;
    config::reload_settings();
    let settings = get_settings();
    let data_dir = config::data_dir(&settings);
    log::info!("starting, data from {}", data_dir.display());

    let auth = AuthGate::new(
        settings.auth.clone(),
        Box::new(FileStore::new(config::session_file())),
    );
    let (w, h) = crossterm::terminal::size().context("querying terminal size")?;
    let mut shell = Shell::new(
        AppRegistry::builtin(),
        auth,
        Size::new(u32::from(w), u32::from(h)),
        settings.taskbar_height,
        data_dir,
        settings.link_origin.clone(),
    );
    // A remembered elevated login skips the splash.
    let remembered = shell.check_stored_credentials(Utc::now());
    let show_splash = settings.bootup && !no_splash && !remembered;

    let mut terminal = init_terminal()?;

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        run(&mut terminal, shell, show_splash, fragment.as_deref())
    }));

    // Always restore terminal
    restore_terminal(&mut terminal).ok();

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            log::error!("{e:#}");
            Err(e)
        }
        Err(_) => {
            log::error!("desktop panicked");
            eprintln!("Vixen 98 crashed. Check {}", config::log_file().display());
            Ok(())
        }
    }
}
