use crate::chat::{ChatSession, InferenceBackend};
use crate::command::{run_command, CommandError, Dispatch, SpecialAction};
use crate::config::{BannerConfig, PromptConfig, TerminalConfig};
use crate::context::{SessionMode, SessionState, TerminalContext};
use crate::style::{StyleTag, StyledLine};
use crate::writer::WriteScheduler;
use std::cell::RefCell;
use std::rc::Rc;

/// Runs one submitted line at a time: command table in normal mode, the
/// chat session in chat mode. All output goes through the writer.
pub struct Interpreter {
    ctx: TerminalContext,
    writer: WriteScheduler,
    chat: ChatSession,
    prompt: PromptConfig,
    banner: BannerConfig,
}

impl Interpreter {
    pub fn new(
        config: TerminalConfig,
        session: Rc<RefCell<SessionState>>,
        writer: WriteScheduler,
        backend: Option<Rc<dyn InferenceBackend>>,
    ) -> Self {
        let ctx = TerminalContext::new(&config, session.clone(), backend.is_some());
        let chat = ChatSession::new(backend, config.chat, session, writer.clone());
        Self { ctx, writer, chat, prompt: config.prompt, banner: config.banner }
    }

    pub fn context(&self) -> &TerminalContext {
        &self.ctx
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Boxed welcome text, redrawn after every `clear`.
    pub fn banner(&self) -> Vec<StyledLine> {
        let rows = [self.banner.title.as_str(), self.banner.subtitle.as_str()];
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) + 4;
        let mut lines = vec![StyledLine::success(format!("╭{}╮", "─".repeat(width)))];
        for row in rows {
            let pad = width - 2 - row.chars().count();
            lines.push(StyledLine::success(format!("│  {}{}│", row, " ".repeat(pad))));
        }
        lines.push(StyledLine::success(format!("╰{}╯", "─".repeat(width))));
        lines.push(StyledLine::blank());
        lines
    }

    /// `(base) user@host:~/dir$ ` in normal mode, the chat prompt otherwise
    pub fn prompt(&self) -> StyledLine {
        if self.ctx.mode() == SessionMode::Chat {
            return StyledLine::styled(self.prompt.chat_prompt.as_str(), StyleTag::Info);
        }
        let identity = &self.ctx.identity;
        let cwd = self.ctx.cwd();
        let shown = match cwd.strip_prefix(identity.home.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => format!("~{}", rest),
            _ => cwd,
        };
        let mut line = StyledLine::new();
        if !self.prompt.env_label.is_empty() {
            line = line.push(format!("{} ", self.prompt.env_label), StyleTag::Muted);
        }
        line.push(format!("{}@{}", identity.user, identity.host), StyleTag::Success)
            .push(":", StyleTag::Plain)
            .push(shown, StyleTag::Info)
            .push("$ ", StyleTag::Plain)
    }

    /// Process one line to completion, including any backend round trip.
    pub async fn dispatch(&mut self, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            return;
        }

        if self.ctx.mode() == SessionMode::Chat {
            // checked before the backend ever sees it
            if input.eq_ignore_ascii_case("exit") {
                self.chat.leave();
            } else {
                self.chat.turn(input).await;
            }
            self.writer.flush().await;
            return;
        }

        match run_command(input, &mut self.ctx) {
            Dispatch::Empty => {}
            Dispatch::Unknown(name) => {
                self.writer.write_styled_line(&StyledLine::error(format!("{}: command not found", name)));
                self.writer
                    .write_styled_line(&StyledLine::muted("Type \"help\" to see available commands"));
            }
            Dispatch::Ran { kind, result } => match result {
                Ok(reply) => {
                    self.writer.write_lines(&reply.lines);
                    if let Some(action) = reply.action {
                        self.perform(action).await;
                    }
                }
                Err(e) => {
                    log::debug!("[dispatch] {} failed: {:?}", kind.name(), e);
                    self.writer.write_styled_line(&e.to_line());
                }
            },
        }
        self.writer.flush().await;
    }

    async fn perform(&mut self, action: SpecialAction) {
        match action {
            SpecialAction::ClearScreen => {
                self.writer.clear();
                let banner = self.banner();
                self.writer.write_lines(&banner);
            }
            SpecialAction::EnterChat => {
                self.writer.flush().await;
                if let Err(e) = self.chat.start().await {
                    self.writer.write_styled_line(&CommandError::Backend(e).to_line());
                }
            }
            SpecialAction::ExitChat => self.chat.leave(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::ScriptedBackend;
    use crate::chat::{ChatState, ProgressEvent, ProgressStatus};
    use crate::display::{DisplayOp, RecordingDisplay};
    use crate::style;
    use futures::executor::block_on;
    use std::time::Duration;

    struct Rig {
        display: Rc<RefCell<RecordingDisplay>>,
        session: Rc<RefCell<SessionState>>,
        interpreter: Interpreter,
    }

    impl Rig {
        fn new(backend: Option<ScriptedBackend>) -> Self {
            let config = TerminalConfig::default();
            let display = Rc::new(RefCell::new(RecordingDisplay::new()));
            let writer = WriteScheduler::new(display.clone(), Duration::ZERO).with_resolver(style::resolve_plain);
            let session = Rc::new(RefCell::new(SessionState::new(config.identity.cwd.clone())));
            let backend = backend.map(|b| Rc::new(b) as Rc<dyn InferenceBackend>);
            let interpreter = Interpreter::new(config, session.clone(), writer, backend);
            Self { display, session, interpreter }
        }

        fn run(&mut self, line: &str) -> Vec<String> {
            let before = self.display.borrow().ops.len();
            block_on(self.interpreter.dispatch(line));
            self.display.borrow().ops[before..]
                .iter()
                .filter_map(|op| match op {
                    DisplayOp::Line(text) => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }

        fn mode(&self) -> SessionMode {
            self.session.borrow().mode
        }
    }

    #[test]
    fn test_unknown_command_prints_hint() {
        let mut rig = Rig::new(None);
        assert_eq!(
            rig.run("xyz"),
            vec!["xyz: command not found", "Type \"help\" to see available commands"]
        );
        assert_eq!(rig.mode(), SessionMode::Normal);
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut rig = Rig::new(None);
        rig.run("   ");
        assert!(rig.display.borrow().ops.is_empty());
    }

    #[test]
    fn test_usage_error_is_one_line() {
        let mut rig = Rig::new(None);
        assert_eq!(rig.run("mv only"), vec!["mv: missing destination file operand after 'only'"]);
    }

    #[test]
    fn test_cat_through_dispatch() {
        let mut rig = Rig::new(None);
        let out = rig.run("CAT ./contact.md");
        assert_eq!(out[0], "Contact");
    }

    #[test]
    fn test_clear_redraws_banner_and_keeps_mode() {
        let mut rig = Rig::new(None);
        rig.run("ls");
        rig.run("clear");
        let banner: Vec<String> = rig.interpreter.banner().iter().map(|l| l.plain_text()).collect();
        assert_eq!(rig.display.borrow().lines(), banner);
        assert!(rig.display.borrow().ops.contains(&DisplayOp::Clear));
        assert_eq!(rig.mode(), SessionMode::Normal);
    }

    #[test]
    fn test_banner_box_is_aligned() {
        let rig = Rig::new(None);
        let widths: Vec<usize> = rig.interpreter.banner()[..4]
            .iter()
            .map(|l| l.plain_text().chars().count())
            .collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{:?}", widths);
    }

    #[test]
    fn test_prompt_shows_home_as_tilde() {
        let mut rig = Rig::new(Some(ScriptedBackend::ready()));
        assert_eq!(rig.interpreter.prompt().plain_text(), "(base) guest@portfolio:~/portfolio$ ");
        rig.run("chat");
        assert_eq!(rig.interpreter.prompt().plain_text(), "🤖 > ");
    }

    #[test]
    fn test_chat_without_backend() {
        let mut rig = Rig::new(None);
        assert_eq!(rig.run("chat"), vec!["Error: Chat service is not available."]);
        assert_eq!(rig.mode(), SessionMode::Normal);
    }

    #[test]
    fn test_chat_round_trip() {
        let backend = ScriptedBackend {
            events: vec![ProgressEvent::new(ProgressStatus::Ready, 100.0)],
            ..ScriptedBackend::default()
        }
        .reply("Hello human.");
        let mut rig = Rig::new(Some(backend));

        assert_eq!(
            rig.run("chat"),
            vec!["Entering chat mode. Type \"exit\" to leave chat mode.", "Model initialization complete!"]
        );
        assert_eq!(rig.mode(), SessionMode::Chat);
        assert_eq!(rig.interpreter.chat().state(), ChatState::Ready);

        // commands are just messages now
        assert_eq!(rig.run("ls"), vec!["Hello human."]);
        assert_eq!(rig.run("  EXIT "), vec!["Exiting chat mode."]);
        assert_eq!(rig.mode(), SessionMode::Normal);
        assert_eq!(rig.run("exit"), vec!["Not in chat mode."]);
    }

    #[test]
    fn test_chat_init_failure_is_one_error_line() {
        let backend = ScriptedBackend { fail_init: true, ..ScriptedBackend::default() };
        let mut rig = Rig::new(Some(backend));
        let out = rig.run("chat");
        assert_eq!(
            out,
            vec![
                "Entering chat mode. Type \"exit\" to leave chat mode.",
                "Error: Failed to initialize AI model. Please try again later."
            ]
        );
        assert_eq!(rig.mode(), SessionMode::Normal);
    }

    #[test]
    fn test_history_sees_submitted_lines() {
        let mut rig = Rig::new(None);
        rig.session.borrow_mut().history.push("pwd");
        rig.session.borrow_mut().history.push("history");
        assert_eq!(rig.run("history"), vec!["   1  pwd", "   2  history"]);
    }
}
