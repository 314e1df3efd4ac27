// serialized writes to the display
// producers (command output, chat, progress overlay, key echo) only enqueue;
// whoever calls `flush` first drains the queue in order, everyone else
// returns straight away and their entries get written by that drainer

use crate::display::Display;
use crate::style::{self, StyleResolver, StyledLine};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteQueueEntry {
    /// partial write, cursor stays on the line
    Text(String),
    /// write followed by a line break
    Line(String),
    Clear,
}

/// async pause between writes
pub type Delay = Rc<dyn Fn(Duration) -> LocalBoxFuture<'static, ()>>;

#[cfg(target_arch = "wasm32")]
fn sleep(pause: Duration) -> LocalBoxFuture<'static, ()> {
    gloo_timers::future::sleep(pause).boxed_local()
}

#[cfg(not(target_arch = "wasm32"))]
fn sleep(_pause: Duration) -> LocalBoxFuture<'static, ()> {
    futures::future::ready(()).boxed_local()
}

/// Timer-backed on wasm, immediate everywhere else.
pub fn default_delay() -> Delay {
    Rc::new(sleep)
}

/// Cheap to clone, every clone feeds the same queue.
#[derive(Clone)]
pub struct WriteScheduler {
    display: Rc<RefCell<dyn Display>>,
    queue: Rc<RefCell<VecDeque<WriteQueueEntry>>>,
    writing: Rc<Cell<bool>>,
    delay: Delay,
    pause: Duration,
    resolver: StyleResolver,
}

impl WriteScheduler {
    pub fn new(display: Rc<RefCell<dyn Display>>, pause: Duration) -> Self {
        Self {
            display,
            queue: Rc::new(RefCell::new(VecDeque::new())),
            writing: Rc::new(Cell::new(false)),
            delay: default_delay(),
            pause,
            resolver: style::resolve,
        }
    }

    pub fn with_delay(mut self, delay: Delay) -> Self {
        self.delay = delay;
        self
    }

    /// swap the tag -> escape mapping, e.g. `style::resolve_plain`
    pub fn with_resolver(mut self, resolver: StyleResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn enqueue(&self, entry: WriteQueueEntry) {
        self.queue.borrow_mut().push_back(entry);
    }

    pub fn write(&self, text: impl Into<String>) {
        self.enqueue(WriteQueueEntry::Text(text.into()));
    }

    pub fn write_line(&self, text: impl Into<String>) {
        self.enqueue(WriteQueueEntry::Line(text.into()));
    }

    pub fn write_styled(&self, line: &StyledLine) {
        self.write(line.render_with(self.resolver));
    }

    pub fn write_styled_line(&self, line: &StyledLine) {
        self.write_line(line.render_with(self.resolver));
    }

    pub fn write_lines<'a>(&self, lines: impl IntoIterator<Item = &'a StyledLine>) {
        for line in lines {
            self.write_styled_line(line);
        }
    }

    pub fn clear(&self) {
        self.enqueue(WriteQueueEntry::Clear);
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_writing(&self) -> bool {
        self.writing.get()
    }

    pub fn resize(&self) {
        if let Err(e) = self.display.borrow_mut().resize_to_fit() {
            log::warn!("[writer] resize failed: {}", e);
        }
    }

    /// Drain the queue front to back, one entry at a time. Returns at once
    /// if another flush is already draining.
    pub async fn flush(&self) {
        if self.writing.replace(true) {
            return;
        }
        loop {
            // borrow ends before any await
            let next = self.queue.borrow_mut().pop_front();
            let Some(entry) = next else { break };
            self.apply(&entry);
            if self.pending() > 0 && !self.pause.is_zero() {
                (self.delay)(self.pause).await;
            }
        }
        self.writing.set(false);
    }

    fn apply(&self, entry: &WriteQueueEntry) {
        let mut display = self.display.borrow_mut();
        let result = match entry {
            WriteQueueEntry::Text(text) => display.write(text),
            WriteQueueEntry::Line(text) => display.write_line(text),
            WriteQueueEntry::Clear => display.clear(),
        };
        // best effort, a dropped write shouldn't take the session down
        if let Err(e) = result {
            log::warn!("[writer] dropped {:?}: {}", entry, e);
        }
    }
}
