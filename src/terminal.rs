use crate::chat::InferenceBackend;
use crate::config::TerminalConfig;
use crate::context::{Key, SessionMode, SessionState};
use crate::display::Display;
use crate::interpreter::Interpreter;
use crate::writer::WriteScheduler;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Top-level handle the page (or the native repl) talks to. Clones share
/// everything, so one can be moved into each spawned task.
///
/// Submitted lines queue up in `pending`; `drain` runs them strictly one
/// after another even when several drains are spawned at once.
///
/// Keys pressed while a line is running are not echoed, since the running
/// line may rewrite the current row (the chat `[thinking...]` indicator).
/// Held-back input is written out after the next prompt instead.
#[derive(Clone)]
pub struct Terminal {
    session: Rc<RefCell<SessionState>>,
    writer: WriteScheduler,
    pending: Rc<RefCell<VecDeque<PendingLine>>>,
    // None while a drain is running with it
    interpreter: Rc<RefCell<Option<Interpreter>>>,
    // the input buffer has keys that were never echoed
    held: Rc<Cell<bool>>,
}

struct PendingLine {
    text: String,
    // typed while busy, so not on screen yet
    echo: bool,
}

impl Terminal {
    pub fn new(
        config: TerminalConfig,
        display: Rc<RefCell<dyn Display>>,
        backend: Option<Rc<dyn InferenceBackend>>,
    ) -> Self {
        let writer = WriteScheduler::new(display, config.write_delay());
        Self::with_writer(config, writer, backend)
    }

    /// build around an existing writer, e.g. one with a plain resolver
    pub fn with_writer(config: TerminalConfig, writer: WriteScheduler, backend: Option<Rc<dyn InferenceBackend>>) -> Self {
        let session = Rc::new(RefCell::new(SessionState::new(config.identity.cwd.clone())));
        let interpreter = Interpreter::new(config, session.clone(), writer.clone(), backend);
        Self {
            session,
            writer,
            pending: Rc::new(RefCell::new(VecDeque::new())),
            interpreter: Rc::new(RefCell::new(Some(interpreter))),
            held: Rc::new(Cell::new(false)),
        }
    }

    pub fn writer(&self) -> &WriteScheduler {
        &self.writer
    }

    pub fn session(&self) -> Rc<RefCell<SessionState>> {
        self.session.clone()
    }

    pub fn mode(&self) -> SessionMode {
        self.session.borrow().mode
    }

    pub fn history(&self) -> Vec<String> {
        self.session.borrow().history.entries().to_vec()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    fn busy(&self) -> bool {
        self.interpreter.borrow().is_none()
    }

    /// Banner and first prompt.
    pub async fn boot(&self) {
        if let Some(interpreter) = self.interpreter.borrow().as_ref() {
            self.writer.write_lines(&interpreter.banner());
            self.writer.write_styled(&interpreter.prompt());
        }
        self.writer.flush().await;
    }

    /// Feed a key from the display. Echo is queued right away unless a line
    /// is running; returns true when the key submitted a line (call `drain`
    /// to run it).
    pub fn handle_key(&self, key: Key) -> bool {
        let outcome = self.session.borrow_mut().handle_key(key);
        let busy = self.busy();
        if busy {
            self.held.set(true);
        } else if !outcome.echo.is_empty() {
            self.writer.write(outcome.echo);
        }
        match outcome.submitted {
            Some(text) => {
                if !busy {
                    self.writer.write("\r\n");
                }
                // the line itself is now on screen or queued for it
                self.held.set(false);
                self.pending.borrow_mut().push_back(PendingLine { text, echo: busy });
                true
            }
            None => false,
        }
    }

    /// Queue a whole line, bypassing the key editor (paste, native stdin).
    pub fn submit(&self, line: &str) {
        self.session.borrow_mut().history.push(line);
        self.pending.borrow_mut().push_back(PendingLine { text: line.to_string(), echo: false });
    }

    /// Run every queued line in order, re-issuing the prompt after each.
    /// A drain started while another is running only flushes the writer;
    /// the running one picks up anything queued meanwhile.
    pub async fn drain(&self) {
        let taken = self.interpreter.borrow_mut().take();
        let Some(mut interpreter) = taken else {
            self.writer.flush().await;
            return;
        };
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(line) = next else { break };
            if line.echo {
                self.writer.write(format!("{}\r\n", line.text));
            }
            interpreter.dispatch(&line.text).await;
            self.writer.write_styled(&interpreter.prompt());
            self.writer.flush().await;
        }
        *self.interpreter.borrow_mut() = Some(interpreter);
        if self.held.replace(false) {
            let typed = self.session.borrow().buffer().to_string();
            self.writer.write(typed);
        }
        // flush echo that arrived with nothing to run
        self.writer.flush().await;
    }

    pub fn resize(&self) {
        self.writer.resize();
    }
}
