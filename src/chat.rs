//! Chat mode: backend lifecycle, the download/load progress overlay and
//! single-turn prompting.

use crate::config::{ChatConfig, GenerateOptions};
use crate::context::{SessionMode, SessionState};
use crate::format::normalize_whitespace;
use crate::style::{self, StyledLine};
use crate::writer::WriteScheduler;
use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedSender};
use futures::{FutureExt, StreamExt};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;
use thiserror::Error;

// cut a reply at the first role marker or line break
static TURN_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Human:|Assistant:|[\r\n]").expect("turn boundary pattern"));

const BAR_WIDTH: usize = 30;

/// Display strings are what the user sees; the detail goes to the log.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("Failed to initialize AI model. Please try again later.")]
    Init(String),
    #[error("Failed to generate response. Please try again.")]
    Generate(String),
    #[error("Model is not yet initialized. Please wait...")]
    NotReady,
    #[error("backend call failed: {0}")]
    Js(String),
}

/// A local text-generation model. Calls are awaited one at a time.
#[async_trait(?Send)]
pub trait InferenceBackend {
    fn is_ready(&self) -> bool;

    /// Load the model, reporting progress on `progress` as it goes.
    async fn initialize(&self, progress: UnboundedSender<ProgressEvent>) -> Result<(), BackendError>;

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, BackendError>;
}

/// Phase names as the model loader reports them. The transformers.js
/// spellings are accepted too; anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    #[serde(alias = "download", alias = "progress", alias = "initiate")]
    Downloading,
    #[serde(alias = "loading tokenizer", alias = "loading model")]
    Loading,
    Ready,
    #[serde(other)]
    Other,
}

impl ProgressStatus {
    pub fn label(self) -> &'static str {
        match self {
            ProgressStatus::Downloading => "downloading",
            ProgressStatus::Loading => "loading",
            ProgressStatus::Ready => "ready",
            ProgressStatus::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    /// 0-100 within the current phase
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub file: Option<String>,
}

impl ProgressEvent {
    pub fn new(status: ProgressStatus, progress: f64) -> Self {
        Self { status, progress, file: None }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Overall percentage: downloading fills the first half of the bar
    /// as reported, loading maps onto 50-100. `None` for unknown phases.
    pub fn percentage(&self) -> Option<f64> {
        let pct = match self.status {
            ProgressStatus::Downloading => self.progress,
            ProgressStatus::Loading => 50.0 + self.progress / 2.0,
            ProgressStatus::Ready => 100.0,
            ProgressStatus::Other => return None,
        };
        Some(pct.clamp(0.0, 100.0))
    }
}

fn progress_message(percentage: f64, status: ProgressStatus) -> String {
    let filled = ((BAR_WIDTH as f64) * percentage / 100.0).floor() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "Initializing AI model... [{}{}] {}% {}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        percentage.floor() as u32,
        status.label()
    )
}

/// what to do with the screen after feeding an event to the overlay
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayUpdate {
    Unchanged,
    /// erase `erase` lines, then draw `lines` in place
    Redraw { erase: usize, lines: Vec<StyledLine> },
    /// erase `erase` lines; the overlay is gone for good
    Finished { erase: usize },
}

/// Throttled, in-place progress display.
#[derive(Debug, Clone)]
pub struct ProgressOverlay {
    last_percentage: f64,
    last_file: Option<String>,
    last_message: String,
    rendered_lines: usize,
    finished: bool,
}

impl Default for ProgressOverlay {
    fn default() -> Self {
        Self {
            last_percentage: -1.0,
            last_file: None,
            last_message: String::new(),
            rendered_lines: 0,
            finished: false,
        }
    }
}

impl ProgressOverlay {
    pub fn rendered_lines(&self) -> usize {
        self.rendered_lines
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// redraw on new text, a new file, or a move of at least one percent
    pub fn should_redraw(&self, message: &str, percentage: f64, file: Option<&str>) -> bool {
        message != self.last_message
            || file.is_some_and(|f| self.last_file.as_deref() != Some(f))
            || (percentage - self.last_percentage).abs() >= 1.0
    }

    pub fn update(&mut self, event: &ProgressEvent) -> OverlayUpdate {
        if self.finished {
            return OverlayUpdate::Unchanged;
        }
        let Some(percentage) = event.percentage() else {
            log::debug!("[chat] ignoring progress status {:?}", event.status);
            return OverlayUpdate::Unchanged;
        };
        if event.status == ProgressStatus::Ready {
            return self.finish();
        }

        let message = progress_message(percentage, event.status);
        let file = event.file.as_deref();
        if !self.should_redraw(&message, percentage, file) {
            return OverlayUpdate::Unchanged;
        }

        let mut lines = vec![StyledLine::warning(message.as_str())];
        if let Some(file) = file {
            lines.push(StyledLine::muted(file));
            self.last_file = Some(file.to_string());
        }
        let erase = std::mem::replace(&mut self.rendered_lines, lines.len());
        self.last_message = message;
        self.last_percentage = percentage;
        OverlayUpdate::Redraw { erase, lines }
    }

    pub fn finish(&mut self) -> OverlayUpdate {
        if self.finished {
            return OverlayUpdate::Unchanged;
        }
        self.finished = true;
        OverlayUpdate::Finished { erase: std::mem::take(&mut self.rendered_lines) }
    }
}

/// Cut a raw completion at the first turn marker or line break, then trim.
/// A completion that opens with a line break cleans to nothing.
pub fn clean_response(raw: &str, prompt: &str) -> String {
    let body = raw.strip_prefix(prompt).unwrap_or(raw);
    let first = TURN_BOUNDARY.split(body).next().unwrap_or_default();
    normalize_whitespace(first)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    #[default]
    Idle,
    Initializing,
    Ready,
    Generating,
    /// last init attempt failed; `chat` tries again
    Failed,
}

pub struct ChatSession {
    backend: Option<Rc<dyn InferenceBackend>>,
    config: ChatConfig,
    session: Rc<RefCell<SessionState>>,
    writer: WriteScheduler,
    state: ChatState,
}

impl ChatSession {
    pub fn new(
        backend: Option<Rc<dyn InferenceBackend>>,
        config: ChatConfig,
        session: Rc<RefCell<SessionState>>,
        writer: WriteScheduler,
    ) -> Self {
        Self { backend, config, session, writer, state: ChatState::Idle }
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    fn set_mode(&self, mode: SessionMode) {
        self.session.borrow_mut().mode = mode;
        log::info!("[chat] mode -> {:?}", mode);
    }

    /// Switch to chat mode, loading the model first if needed. On failure
    /// the session is back in normal mode and the error is returned for
    /// the caller to print.
    pub async fn start(&mut self) -> Result<(), BackendError> {
        let Some(backend) = self.backend.clone() else {
            return Err(BackendError::NotReady);
        };
        self.set_mode(SessionMode::Chat);
        self.writer
            .write_styled_line(&StyledLine::success("Entering chat mode. Type \"exit\" to leave chat mode."));
        self.writer.flush().await;

        if backend.is_ready() {
            self.state = ChatState::Ready;
            return Ok(());
        }

        self.state = ChatState::Initializing;
        let mut overlay = ProgressOverlay::default();
        let (tx, mut rx) = mpsc::unbounded();
        let init = backend.initialize(tx).fuse();
        futures::pin_mut!(init);

        let result = loop {
            futures::select! {
                event = rx.next() => {
                    if let Some(event) = event {
                        self.show_progress(&mut overlay, &event);
                        self.writer.flush().await;
                    }
                }
                result = init => break result,
            }
        };
        // whatever was sent right before init resolved
        while let Ok(event) = rx.try_recv() {
            self.show_progress(&mut overlay, &event);
        }

        match result {
            Ok(()) => {
                // loaders that never send `ready` still get a clean finish
                let update = overlay.finish();
                self.apply_overlay(update);
                self.state = ChatState::Ready;
                self.writer.flush().await;
                Ok(())
            }
            Err(e) => {
                log::error!("[chat] model init failed: {:?}", e);
                if let OverlayUpdate::Finished { erase } = overlay.finish() {
                    self.writer.write(style::erase_lines(erase));
                }
                self.state = ChatState::Failed;
                self.set_mode(SessionMode::Normal);
                self.writer.flush().await;
                Err(e)
            }
        }
    }

    fn show_progress(&self, overlay: &mut ProgressOverlay, event: &ProgressEvent) {
        let update = overlay.update(event);
        log::debug!("[chat] progress {:?} -> {:?}", event, update);
        self.apply_overlay(update);
    }

    fn apply_overlay(&self, update: OverlayUpdate) {
        match update {
            OverlayUpdate::Unchanged => {}
            OverlayUpdate::Redraw { erase, lines } => {
                self.writer.write(style::erase_lines(erase));
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        self.writer.write("\r\n");
                    }
                    self.writer.write_styled(line);
                }
            }
            OverlayUpdate::Finished { erase } => {
                self.writer.write(style::erase_lines(erase));
                self.writer
                    .write_styled_line(&StyledLine::success("Model initialization complete!"));
            }
        }
    }

    /// Leave chat mode. Idempotent.
    pub fn leave(&mut self) {
        if self.session.borrow().in_chat() {
            self.set_mode(SessionMode::Normal);
        }
        self.writer.write_styled_line(&StyledLine::success("Exiting chat mode."));
    }

    /// One message in, one cleaned line out. Errors are printed, never
    /// returned.
    pub async fn turn(&mut self, message: &str) {
        let line = match self.respond(message).await {
            Ok(Some(reply)) => StyledLine::success(reply),
            // user left while we were generating
            Ok(None) => return,
            Err(e) => {
                log::error!("[chat] turn failed: {:?}", e);
                StyledLine::error(format!("Error: {}", e))
            }
        };
        self.writer.write_styled_line(&line);
        self.writer.flush().await;
    }

    async fn respond(&mut self, message: &str) -> Result<Option<String>, BackendError> {
        let backend = match &self.backend {
            Some(backend) if self.state == ChatState::Ready && backend.is_ready() => backend.clone(),
            _ => return Err(BackendError::NotReady),
        };

        self.state = ChatState::Generating;
        self.writer.write_styled(&StyledLine::warning("[thinking...]"));
        self.writer.flush().await;

        let prompt = self.config.prompt_for(message);
        let result = backend.generate(&prompt, &self.config.generation).await;

        self.writer.write(style::CLEAR_LINE);
        self.state = ChatState::Ready;
        if !self.session.borrow().in_chat() {
            log::debug!("[chat] dropping reply, no longer in chat mode");
            self.writer.flush().await;
            return Ok(None);
        }
        let raw = result?;
        Ok(Some(clean_response(&raw, &prompt)))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::*;
    use crate::display::RecordingDisplay;
    use futures::executor::block_on;
    use std::time::Duration;

    fn event(status: ProgressStatus, progress: f64) -> ProgressEvent {
        ProgressEvent::new(status, progress)
    }

    fn session_with(backend: ScriptedBackend) -> (Rc<RefCell<RecordingDisplay>>, Rc<ScriptedBackend>, ChatSession) {
        let display = Rc::new(RefCell::new(RecordingDisplay::new()));
        let writer = WriteScheduler::new(display.clone(), Duration::ZERO).with_resolver(style::resolve_plain);
        let backend = Rc::new(backend);
        let state = Rc::new(RefCell::new(SessionState::new("/")));
        let chat = ChatSession::new(Some(backend.clone() as Rc<dyn InferenceBackend>), ChatConfig::default(), state, writer);
        (display, backend, chat)
    }

    #[test]
    fn test_percentage_mapping() {
        assert_eq!(event(ProgressStatus::Downloading, 30.0).percentage(), Some(30.0));
        assert_eq!(event(ProgressStatus::Loading, 50.0).percentage(), Some(75.0));
        assert_eq!(event(ProgressStatus::Ready, 0.0).percentage(), Some(100.0));
        assert_eq!(event(ProgressStatus::Other, 10.0).percentage(), None);
        assert_eq!(event(ProgressStatus::Downloading, 140.0).percentage(), Some(100.0));
    }

    #[test]
    fn test_status_aliases() {
        let parse = |s: &str| serde_json::from_str::<ProgressEvent>(s).unwrap().status;
        assert_eq!(parse(r#"{"status":"download","progress":1}"#), ProgressStatus::Downloading);
        assert_eq!(parse(r#"{"status":"initiate"}"#), ProgressStatus::Downloading);
        assert_eq!(parse(r#"{"status":"loading model"}"#), ProgressStatus::Loading);
        assert_eq!(parse(r#"{"status":"ready"}"#), ProgressStatus::Ready);
        assert_eq!(parse(r#"{"status":"done","file":"x"}"#), ProgressStatus::Other);
    }

    #[test]
    fn test_message_layout() {
        let msg = progress_message(50.0, ProgressStatus::Loading);
        assert_eq!(
            msg,
            format!("Initializing AI model... [{}{}] 50% loading", "█".repeat(15), "░".repeat(15))
        );
    }

    #[test]
    fn test_small_steps_are_throttled() {
        let mut overlay = ProgressOverlay::default();
        let mut redraws = Vec::new();
        for step in 0..=25 {
            let pct = step as f64 / 10.0;
            if let OverlayUpdate::Redraw { .. } = overlay.update(&event(ProgressStatus::Downloading, pct)) {
                redraws.push(step);
            }
        }
        assert_eq!(redraws, vec![0, 10, 20]);
        assert_eq!(overlay.rendered_lines(), 1);
    }

    #[test]
    fn test_file_or_status_change_forces_redraw() {
        let mut overlay = ProgressOverlay::default();
        overlay.update(&event(ProgressStatus::Downloading, 50.0).with_file("a.onnx"));
        let update = overlay.update(&event(ProgressStatus::Downloading, 50.2).with_file("b.onnx"));
        match update {
            OverlayUpdate::Redraw { erase, lines } => {
                assert_eq!(erase, 2);
                assert_eq!(lines[1].plain_text(), "b.onnx");
            }
            other => panic!("expected redraw, got {:?}", other),
        }
        // 50.2% downloading -> 50.1% loading: same percent, new phase
        let update = overlay.update(&event(ProgressStatus::Loading, 0.2));
        assert!(matches!(update, OverlayUpdate::Redraw { erase: 2, .. }));
        assert_eq!(overlay.rendered_lines(), 1);
    }

    #[test]
    fn test_ready_always_finishes() {
        let mut overlay = ProgressOverlay::default();
        overlay.update(&event(ProgressStatus::Loading, 100.0).with_file("model.onnx"));
        // ready at the same percentage still ends the overlay
        assert_eq!(
            overlay.update(&event(ProgressStatus::Ready, 100.0)),
            OverlayUpdate::Finished { erase: 2 }
        );
        assert!(overlay.is_finished());
        assert_eq!(overlay.update(&event(ProgressStatus::Downloading, 1.0)), OverlayUpdate::Unchanged);
        assert_eq!(overlay.finish(), OverlayUpdate::Unchanged);
    }

    #[test]
    fn test_clean_response() {
        let prompt = "sys\n\nHuman: hi\nAssistant:";
        let raw = format!("{}  Hello   there!\nHuman: more", prompt);
        assert_eq!(clean_response(&raw, prompt), "Hello there!");
        assert_eq!(clean_response("Sure. Assistant: again", prompt), "Sure.");
        assert_eq!(clean_response("\n\nLeading break\nsecond", prompt), "");
    }

    #[test]
    fn test_start_with_ready_backend() {
        let (display, backend, mut chat) = session_with(ScriptedBackend::ready());
        block_on(chat.start()).unwrap();
        assert_eq!(chat.state(), ChatState::Ready);
        assert!(chat.session.borrow().in_chat());
        assert_eq!(backend.init_calls.get(), 0);
        assert_eq!(
            display.borrow().lines(),
            vec!["Entering chat mode. Type \"exit\" to leave chat mode."]
        );
    }

    #[test]
    fn test_start_renders_progress_then_success() {
        let backend = ScriptedBackend {
            events: vec![
                event(ProgressStatus::Downloading, 0.0).with_file("model.onnx"),
                event(ProgressStatus::Downloading, 0.4).with_file("model.onnx"),
                event(ProgressStatus::Loading, 100.0),
                event(ProgressStatus::Ready, 100.0),
            ],
            ..ScriptedBackend::default()
        };
        let (display, backend, mut chat) = session_with(backend);
        block_on(chat.start()).unwrap();
        assert_eq!(backend.init_calls.get(), 1);
        assert_eq!(chat.state(), ChatState::Ready);

        let transcript = display.borrow().transcript();
        assert_eq!(transcript.matches("Initializing AI model...").count(), 2);
        assert!(transcript.contains("0% downloading\r\nmodel.onnx"));
        assert!(transcript.contains("100% loading"));
        assert!(transcript.ends_with(&format!("{}Model initialization complete!\n", style::CLEAR_LINE)));
        assert_eq!(transcript.matches("Model initialization complete!").count(), 1);
    }

    #[test]
    fn test_start_without_ready_event_still_finishes() {
        let (display, _backend, mut chat) = session_with(ScriptedBackend::default());
        block_on(chat.start()).unwrap();
        assert_eq!(
            display.borrow().lines(),
            vec![
                "Entering chat mode. Type \"exit\" to leave chat mode.",
                "Model initialization complete!"
            ]
        );
    }

    #[test]
    fn test_failed_init_returns_to_normal() {
        let backend = ScriptedBackend {
            fail_init: true,
            events: vec![event(ProgressStatus::Downloading, 10.0)],
            ..ScriptedBackend::default()
        };
        let (display, backend, mut chat) = session_with(backend);
        let err = block_on(chat.start()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to initialize AI model. Please try again later.");
        assert_eq!(chat.state(), ChatState::Failed);
        assert!(!chat.session.borrow().in_chat());
        assert!(!display.borrow().transcript().contains("complete"));

        // a later attempt goes back to the backend
        let _ = block_on(chat.start());
        assert_eq!(backend.init_calls.get(), 2);
    }

    #[test]
    fn test_turn_writes_cleaned_reply() {
        let (display, backend, mut chat) = session_with(ScriptedBackend::ready().reply(" Hi!\nHuman: x"));
        block_on(chat.start()).unwrap();
        block_on(chat.turn("hello"));
        assert_eq!(display.borrow().lines().last().map(String::as_str), Some("Hi!"));
        assert!(display.borrow().transcript().contains(&format!("[thinking...]{}", style::CLEAR_LINE)));
        assert_eq!(backend.prompts.borrow()[0], ChatConfig::default().prompt_for("hello"));
        assert_eq!(chat.state(), ChatState::Ready);
    }

    #[test]
    fn test_turn_failure_is_one_error_line() {
        let (display, _backend, mut chat) = session_with(ScriptedBackend::ready());
        block_on(chat.start()).unwrap();
        block_on(chat.turn("hello"));
        assert_eq!(
            display.borrow().lines().last().map(String::as_str),
            Some("Error: Failed to generate response. Please try again.")
        );
        assert!(chat.session.borrow().in_chat());
    }

    #[test]
    fn test_turn_before_ready() {
        let (display, backend, mut chat) = session_with(ScriptedBackend::default());
        block_on(chat.turn("hello"));
        assert!(backend.prompts.borrow().is_empty());
        assert_eq!(
            display.borrow().lines(),
            vec!["Error: Model is not yet initialized. Please wait..."]
        );
    }

    #[test]
    fn test_reply_after_leaving_is_dropped() {
        let (display, _backend, mut chat) = session_with(ScriptedBackend::ready().reply("late"));
        block_on(chat.start()).unwrap();
        chat.session.borrow_mut().mode = SessionMode::Normal;
        // still Ready, so the backend is asked, but nothing is printed
        block_on(chat.turn("hello"));
        assert!(!display.borrow().transcript().contains("late"));
    }

    #[test]
    fn test_leave() {
        let (display, _backend, mut chat) = session_with(ScriptedBackend::ready());
        block_on(chat.start()).unwrap();
        chat.leave();
        block_on(chat.writer.flush());
        assert!(!chat.session.borrow().in_chat());
        assert_eq!(display.borrow().lines().last().map(String::as_str), Some("Exiting chat mode."));
    }
}
