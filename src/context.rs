use crate::config::{Identity, TerminalConfig};
use crate::vfs::VirtualFileSystem;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    Normal,
    Chat,
}

/// what a single key press means to the line editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
    Up,
    Down,
    Other,
}

impl Key {
    /// Map a DOM keyboard event. Modified keys are never typed as text.
    pub fn from_dom(key: &str, key_code: u32, ctrl: bool, alt: bool, meta: bool) -> Self {
        match key_code {
            13 => return Key::Enter,
            8 => return Key::Backspace,
            38 => return Key::Up,
            40 => return Key::Down,
            _ => {}
        }
        if ctrl || alt || meta {
            return Key::Other;
        }
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Key::Char(c),
            _ => Key::Other,
        }
    }
}

/// Submitted lines plus a browse cursor. `cursor == len` means "not
/// browsing, the buffer is live input".
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Trims and appends; blank lines are dropped. Resets the cursor.
    pub fn push(&mut self, line: &str) -> bool {
        let line = line.trim();
        let added = !line.is_empty();
        if added {
            self.entries.push(line.to_string());
        }
        self.cursor = self.entries.len();
        added
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    // clamps at 0, no wraparound
    pub fn older(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        Some(self.current())
    }

    // clamps at len, where the buffer goes back to empty
    pub fn newer(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
        Some(self.current())
    }

    fn current(&self) -> &str {
        self.entries.get(self.cursor).map_or("", String::as_str)
    }
}

/// Per-page-load state: mode, history, the line being typed, cosmetic cwd.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub cwd: String,
    pub mode: SessionMode,
    pub history: History,
    buffer: String,
}

/// What the display should show after a key press, plus the submitted line
/// if the key was Enter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    pub echo: String,
    pub submitted: Option<String>,
}

impl SessionState {
    pub fn new(cwd: impl Into<String>) -> Self {
        Self { cwd: cwd.into(), ..Self::default() }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn in_chat(&self) -> bool {
        self.mode == SessionMode::Chat
    }

    /// Feed one key into the line editor.
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        match key {
            Key::Char(c) if !c.is_control() => {
                self.buffer.push(c);
                KeyOutcome { echo: c.to_string(), submitted: None }
            }
            Key::Backspace => {
                let echo = if self.buffer.pop().is_some() { "\x08 \x08".to_string() } else { String::new() };
                KeyOutcome { echo, submitted: None }
            }
            Key::Up => self.browse(|h| h.older().map(str::to_string)),
            Key::Down => self.browse(|h| h.newer().map(str::to_string)),
            Key::Enter => KeyOutcome { echo: String::new(), submitted: Some(self.submit()) },
            _ => KeyOutcome::default(),
        }
    }

    /// Take the buffer as a submitted line, recording it in history.
    pub fn submit(&mut self) -> String {
        let line = std::mem::take(&mut self.buffer);
        self.history.push(&line);
        line
    }

    // swap the buffer for a history entry, echoing enough backspaces to
    // wipe what was typed
    fn browse(&mut self, step: impl FnOnce(&mut History) -> Option<String>) -> KeyOutcome {
        let Some(entry) = step(&mut self.history) else {
            return KeyOutcome::default();
        };
        let mut echo = "\x08 \x08".repeat(self.buffer.chars().count());
        echo.push_str(&entry);
        self.buffer = entry;
        KeyOutcome { echo, submitted: None }
    }
}

/// What command handlers get to see.
pub struct TerminalContext {
    pub vfs: Rc<VirtualFileSystem>,
    pub session: Rc<RefCell<SessionState>>,
    pub identity: Identity,
    pub env: Vec<(String, String)>,
    /// whether an inference backend was wired in at all
    pub backend_available: bool,
}

impl TerminalContext {
    pub fn new(config: &TerminalConfig, session: Rc<RefCell<SessionState>>, backend_available: bool) -> Self {
        let vfs = match &config.files {
            Some(files) => VirtualFileSystem::from_entries(files, &config.identity.user),
            None => VirtualFileSystem::portfolio(&config.identity.user),
        };
        Self {
            vfs: Rc::new(vfs),
            session,
            env: default_env(&config.identity),
            identity: config.identity.clone(),
            backend_available,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.session.borrow().mode
    }

    pub fn cwd(&self) -> String {
        self.session.borrow().cwd.clone()
    }
}

fn default_env(id: &Identity) -> Vec<(String, String)> {
    [
        ("USER", id.user.as_str()),
        ("HOME", id.home.as_str()),
        ("PWD", id.cwd.as_str()),
        ("SHELL", id.shell.as_str()),
        ("TERM", id.term.as_str()),
        ("LANG", "en_US.UTF-8"),
        ("PATH", "/usr/local/bin:/usr/bin:/bin"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
