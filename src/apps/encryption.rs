//! File encryption tool.
//!
//! Encrypt wraps `{name, type, data}` (data base64) as JSON and seals it with
//! the shared password cipher, writing `<name>.VIX` next to the input.
//! Decrypt reverses that and restores the original file name.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{AppAction, ContentLine, KeyInput, Tone};
use crate::core::cipher::{self, CipherError};

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const ENCRYPTED_EXTENSION: &str = "VIX";

#[derive(Debug, Error)]
pub enum EncryptionError {
    #[error("Please select a file.")]
    NoFile,
    #[error("Please enter a password.")]
    NoPassword,
    #[error("File size exceeds 10 MB limit.")]
    TooLarge,
    #[error("Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error: {0}")]
    Cipher(#[from] CipherError),
    #[error("Error: malformed file payload")]
    Payload,
    #[error("Error: {} already exists", .0.display())]
    Exists(PathBuf),
}

#[derive(Debug, Serialize, Deserialize)]
struct FilePayload {
    name: String,
    #[serde(rename = "type")]
    mime: String,
    data: String,
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("txt") | Some("log") => "text/plain",
        Some("md") => "text/markdown",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Write `bytes` to a file that must not exist yet.
fn write_new(path: &Path, bytes: &[u8]) -> Result<(), EncryptionError> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => EncryptionError::Exists(path.to_path_buf()),
            _ => EncryptionError::Io(e),
        })?;
    file.write_all(bytes)?;
    Ok(())
}

fn check_inputs(path: &Path, password: &str) -> Result<(), EncryptionError> {
    if path.as_os_str().is_empty() || !path.is_file() {
        return Err(EncryptionError::NoFile);
    }
    if password.is_empty() {
        return Err(EncryptionError::NoPassword);
    }
    if std::fs::metadata(path)?.len() > MAX_FILE_SIZE {
        return Err(EncryptionError::TooLarge);
    }
    Ok(())
}

pub fn encrypt_file(path: &Path, password: &str) -> Result<PathBuf, EncryptionError> {
    check_inputs(path, password)?;
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let payload = FilePayload {
        name: name.clone(),
        mime: mime_for(path).to_string(),
        data: STANDARD.encode(bytes),
    };
    let json = serde_json::to_vec(&payload).map_err(|_| EncryptionError::Payload)?;
    let sealed = cipher::seal(password, &json)?;

    let out = path.with_file_name(format!("{name}.{ENCRYPTED_EXTENSION}"));
    write_new(&out, sealed.as_bytes())?;
    log::info!("encrypted {} -> {}", path.display(), out.display());
    Ok(out)
}

pub fn decrypt_file(path: &Path, password: &str) -> Result<PathBuf, EncryptionError> {
    check_inputs(path, password)?;
    let armoured = std::fs::read_to_string(path)?;
    let json = cipher::open(password, &armoured)?;
    let payload: FilePayload =
        serde_json::from_slice(&json).map_err(|_| EncryptionError::Payload)?;
    let bytes = STANDARD
        .decode(payload.data.as_bytes())
        .map_err(|_| EncryptionError::Payload)?;

    // Only the final component of the stored name is trusted.
    let name = Path::new(&payload.name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or(EncryptionError::Payload)?;
    let mut out = path.with_file_name(&name);
    if out.exists() {
        out = path.with_file_name(format!("decrypted-{name}"));
    }
    write_new(&out, &bytes)?;
    log::info!("decrypted {} -> {}", path.display(), out.display());
    Ok(out)
}

// ── Window state ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Path,
    Password,
    Reveal,
    Encrypt,
    Decrypt,
}

const FOCUS_ORDER: [Focus; 5] = [
    Focus::Path,
    Focus::Password,
    Focus::Reveal,
    Focus::Encrypt,
    Focus::Decrypt,
];

#[derive(Debug)]
pub struct EncryptionApp {
    path: String,
    password: String,
    reveal: bool,
    focus: Focus,
    status: Option<(String, bool)>,
    output: Option<PathBuf>,
}

impl Default for EncryptionApp {
    fn default() -> Self {
        Self::new()
    }
}

impl EncryptionApp {
    pub fn new() -> Self {
        Self {
            path: String::new(),
            password: String::new(),
            reveal: false,
            focus: Focus::Path,
            status: None,
            output: None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(s, _)| s.as_str())
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    fn cycle(&mut self, forward: bool) {
        let idx = FOCUS_ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        let len = FOCUS_ORDER.len();
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        self.focus = FOCUS_ORDER[next];
    }

    pub fn run(&mut self, encrypt: bool) {
        let path = PathBuf::from(self.path.trim());
        let result = if encrypt {
            encrypt_file(&path, &self.password)
        } else {
            decrypt_file(&path, &self.password)
        };
        match result {
            Ok(out) => {
                let verb = if encrypt { "encrypted" } else { "decrypted" };
                self.status = Some((format!("File {verb} successfully."), false));
                self.output = Some(out);
            }
            Err(e) => {
                self.status = Some((e.to_string(), true));
                self.output = None;
            }
        }
    }

    pub fn key(&mut self, key: KeyInput) -> AppAction {
        match key {
            KeyInput::Tab | KeyInput::Down => self.cycle(true),
            KeyInput::BackTab | KeyInput::Up => self.cycle(false),
            KeyInput::Enter => match self.focus {
                Focus::Path | Focus::Password => self.cycle(true),
                Focus::Reveal => self.reveal = !self.reveal,
                Focus::Encrypt => self.run(true),
                Focus::Decrypt => self.run(false),
            },
            KeyInput::Backspace => match self.focus {
                Focus::Path => {
                    self.path.pop();
                }
                Focus::Password => {
                    self.password.pop();
                }
                _ => {}
            },
            KeyInput::Char(c) => match self.focus {
                Focus::Path => self.path.push(c),
                Focus::Password => self.password.push(c),
                Focus::Reveal if c == ' ' => self.reveal = !self.reveal,
                _ => {}
            },
            _ => {}
        }
        AppAction::None
    }

    pub fn lines(&self) -> Vec<ContentLine> {
        let path = if self.path.is_empty() {
            "No file selected".to_string()
        } else {
            self.path.clone()
        };
        let password = if self.reveal {
            self.password.clone()
        } else {
            "*".repeat(self.password.chars().count())
        };
        let reveal = if self.reveal { "[x]" } else { "[ ]" };

        let mut out = vec![
            ContentLine::dim("Type a file path, then a password."),
            ContentLine::blank(),
            ContentLine::choice(format!("File:     {path}"), self.focus == Focus::Path),
            ContentLine::choice(format!("Password: {password}"), self.focus == Focus::Password),
            ContentLine::choice(format!("{reveal} Show password"), self.focus == Focus::Reveal),
            ContentLine::blank(),
            ContentLine::choice("[ Encrypt ]", self.focus == Focus::Encrypt),
            ContentLine::choice("[ Decrypt ]", self.focus == Focus::Decrypt),
            ContentLine::blank(),
        ];
        if let Some((msg, is_err)) = &self.status {
            out.push(ContentLine::new(
                msg.clone(),
                if *is_err { Tone::Error } else { Tone::Normal },
            ));
        }
        if let Some(p) = &self.output {
            out.push(ContentLine::dim(format!("Saved: {}", p.display())));
        }
        out
    }
}
