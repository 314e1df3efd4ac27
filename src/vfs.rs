use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

pub const DEFAULT_PERMISSIONS: &str = "-rw-r--r--";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VfsError {
    #[error("{0}: No such file or directory")]
    NotFound(String),
}

/// one canned file, never changes after startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub content: String,
    pub permissions: String,
    pub owner: String,
    pub group: String,
    /// byte length of `content`
    pub size: usize,
    pub modified: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(name: &str, content: &str, owner: &str, modified: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
            permissions: DEFAULT_PERMISSIONS.to_string(),
            owner: owner.to_string(),
            group: owner.to_string(),
            size: content.len(),
            modified,
        }
    }
}

/// Flat, read-only file table. BTreeMap keeps listings alphabetical.
#[derive(Debug, Clone, Default)]
pub struct VirtualFileSystem {
    files: BTreeMap<String, FileRecord>,
}

impl VirtualFileSystem {
    /// build from (name, content) pairs; size/metadata derived here once
    pub fn from_entries<I, N, C>(entries: I, owner: &str) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let modified = seed_timestamp();
        let files = entries
            .into_iter()
            .map(|(name, content)| {
                let record = FileRecord::new(name.as_ref(), content.as_ref(), owner, modified);
                (record.name.clone(), record)
            })
            .collect();
        Self { files }
    }

    /// the built-in portfolio files
    pub fn portfolio(owner: &str) -> Self {
        Self::from_entries(PORTFOLIO_FILES.iter().copied(), owner)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// all records, alphabetical by name
    pub fn files(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&FileRecord> {
        self.files.get(name)
    }

    /// Look a file up by what the user typed. `./name` and `<cwd>/name`
    /// both land on `name` since everything lives in one directory.
    pub fn read_file(&self, path: &str, cwd: &str) -> Result<&FileRecord, VfsError> {
        let name = path
            .strip_prefix("./")
            .or_else(|| {
                path.strip_prefix(cwd)
                    .and_then(|rest| rest.strip_prefix('/'))
            })
            .unwrap_or(path);
        self.files
            .get(name)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }
}

// fixed so `ll` output is stable across reloads
fn seed_timestamp() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 1, 14)
        .and_then(|d| d.and_hms_opt(9, 27, 21))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

const PORTFOLIO_FILES: &[(&str, &str)] = &[
    (
        "README.md",
        "# Welcome

This is a terminal-flavoured portfolio. Poke around with Unix-like commands
to learn about my background, projects, and how to reach me.

## Quick Start
- Type `help` to see available commands
- Use `cat about.md` to learn about me
- Use `cat projects.md` to see my projects
- Use `cat contact.md` for contact information
- Type `chat` to talk to a small on-device language model

Feel free to explore and reach out!",
    ),
    (
        "about.md",
        "# About

Software engineer | Systems & machine learning
Based somewhere with good coffee.

I like small, fast tools and models that run where the data lives.

## Skills
- Rust, Python, TypeScript
- Machine learning & data pipelines
- WebAssembly and browser runtimes
- Cloud infrastructure and MLOps",
    ),
    (
        "contact.md",
        "# Contact

- Email: hello@example.com
- GitHub: [@portfolio](https://github.com/portfolio)
- Website: [example.com](https://example.com)

Always happy to chat about *interesting* projects.",
    ),
    (
        "help.md",
        "# Available Commands

## File Operations
ls                - List files in current directory
ll                - Detailed file listing
cat <file>        - Display file contents
pwd               - Print working directory

## System Information
whoami            - Show current user
date              - Show current date/time
uname             - Show system information

## Terminal Control
clear             - Clear terminal screen
chat              - Start chat mode
exit              - Exit chat mode (when in chat)",
    ),
    (
        "projects.md",
        "# Projects

1. In-browser terminal
   A fake shell with canned files and a local chat model
   - Tech stack: Rust, WebAssembly, xterm.js

2. Energy forecasting
   - Short-term load prediction for building sites
   - Tech stack: Python, PyTorch, Docker

3. Materials search
   - Property prediction over a materials database
   - Tech stack: Python, scikit-learn, PostgreSQL",
    ),
];
