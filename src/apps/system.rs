use super::{AppAction, ContentLine, KeyInput};

const SYSTEM_INFO: &[&str] = &[
    "System:",
    "    Vixen 98",
    "    0.500",
    "",
    "Registered to:",
    "    █████████  █████",
    "    24796-OEM-0014736-66386",
    "    (420) 846-4670",
    "",
    "Computer:",
    "    AuthenticVIX",
    "    64.0GB RAM",
    "    DMA EPIC 9900 CPU",
    "        64 cores @ 3.1GHz",
    "    XTR 9090 Ti GPU",
    "        24GB VRAM",
];

const OK_BUTTON: &str = "[  OK  ]";

#[derive(Debug, Default)]
pub struct SystemApp;

impl SystemApp {
    pub fn new() -> Self {
        Self
    }

    pub fn key(&mut self, key: KeyInput) -> AppAction {
        match key {
            KeyInput::Enter | KeyInput::Char(' ') => AppAction::CloseSelf,
            _ => AppAction::None,
        }
    }

    pub fn click(&mut self, row: usize) -> AppAction {
        if row == self.ok_row() {
            AppAction::CloseSelf
        } else {
            AppAction::None
        }
    }

    fn ok_row(&self) -> usize {
        SYSTEM_INFO.len() + 1
    }

    pub fn lines(&self) -> Vec<ContentLine> {
        let mut out: Vec<ContentLine> = SYSTEM_INFO
            .iter()
            .map(|l| ContentLine::normal(format!("  {l}")))
            .collect();
        out.push(ContentLine::blank());
        out.push(ContentLine::choice(format!("  {OK_BUTTON}"), true));
        out
    }
}
