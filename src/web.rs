// browser binding: wraps the page's xterm-like display object and the
// transformers helper object, exposes `Terminal` to js

use crate::chat::{BackendError, InferenceBackend, ProgressEvent};
use crate::config::{GenerateOptions, TerminalConfig};
use crate::context::{Key, SessionMode};
use crate::display::{Display, DisplayError};
use crate::terminal::Terminal;
use async_trait::async_trait;
use futures::channel::mpsc::UnboundedSender;
use js_sys::{Array, Function, Promise, Reflect};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};

/// `log` records to the browser console
struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[folio] {}", record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&msg),
            Level::Warn => web_sys::console::warn_1(&msg),
            _ => web_sys::console::log_1(&msg),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

#[wasm_bindgen(start)]
pub fn start() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| value.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{:?}", value))
}

fn is_missing(value: &JsValue) -> bool {
    value.is_undefined() || value.is_null()
}

/// look up `obj[name]` as a function, None if absent or not callable
fn method(obj: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(obj, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
}

/// Anything with `write(text)`, `writeln(text)` and `clear()`; xterm.js fits.
/// `fit()` is called on resize when present.
pub struct JsDisplay {
    target: JsValue,
}

impl JsDisplay {
    pub fn new(target: JsValue) -> Self {
        Self { target }
    }

    fn call(&self, name: &str, arg: Option<&str>) -> Result<(), DisplayError> {
        let func = method(&self.target, name)
            .ok_or_else(|| DisplayError::Js(format!("display has no {}()", name)))?;
        let result = match arg {
            Some(text) => func.call1(&self.target, &JsValue::from_str(text)),
            None => func.call0(&self.target),
        };
        result.map(|_| ()).map_err(|e| DisplayError::Js(js_message(&e)))
    }
}

impl Display for JsDisplay {
    fn write(&mut self, text: &str) -> Result<(), DisplayError> {
        self.call("write", Some(text))
    }

    fn write_line(&mut self, text: &str) -> Result<(), DisplayError> {
        self.call("writeln", Some(text))
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.call("clear", None)
    }

    fn resize_to_fit(&mut self) -> Result<(), DisplayError> {
        if method(&self.target, "fit").is_none() {
            return Ok(());
        }
        self.call("fit", None)
    }
}

/// Adapter over the page's model helper:
/// `isModelReady()`, `setProgressCallback(fn)`, `initialize()` and
/// `generate(prompt, options)`, the last two returning promises.
pub struct JsBackend {
    helper: JsValue,
}

impl JsBackend {
    pub fn new(helper: JsValue) -> Self {
        Self { helper }
    }

    async fn call_async(&self, name: &str, args: &[JsValue]) -> Result<JsValue, String> {
        let func = method(&self.helper, name).ok_or_else(|| format!("helper has no {}()", name))?;
        let argv: Array = args.iter().collect();
        let value = func.apply(&self.helper, &argv).map_err(|e| js_message(&e))?;
        let promise = Promise::resolve(&value);
        JsFuture::from(promise).await.map_err(|e| js_message(&e))
    }

    fn set_progress_callback(&self, callback: &JsValue) {
        if let Some(func) = method(&self.helper, "setProgressCallback") {
            if let Err(e) = func.call1(&self.helper, callback) {
                log::warn!("[web] setProgressCallback threw: {}", js_message(&e));
            }
        }
    }
}

// the pipeline hands back either a string or [{ generated_text }]
fn generated_text(value: &JsValue) -> Option<String> {
    if let Some(text) = value.as_string() {
        return Some(text);
    }
    let first = if Array::is_array(value) {
        Array::from(value).get(0)
    } else {
        value.clone()
    };
    Reflect::get(&first, &JsValue::from_str("generated_text"))
        .ok()
        .and_then(|t| t.as_string())
}

#[async_trait(?Send)]
impl InferenceBackend for JsBackend {
    fn is_ready(&self) -> bool {
        match method(&self.helper, "isModelReady") {
            Some(func) => func
                .call0(&self.helper)
                .map(|v| v.is_truthy())
                .unwrap_or(false),
            None => Reflect::get(&self.helper, &JsValue::from_str("modelReady"))
                .map(|v| v.is_truthy())
                .unwrap_or(false),
        }
    }

    async fn initialize(&self, progress: UnboundedSender<ProgressEvent>) -> Result<(), BackendError> {
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |raw: JsValue| {
            match serde_wasm_bindgen::from_value::<ProgressEvent>(raw) {
                Ok(event) => {
                    let _ = progress.unbounded_send(event);
                }
                Err(e) => log::debug!("[web] unreadable progress event: {}", e),
            }
        });
        self.set_progress_callback(callback.as_ref());
        let result = self.call_async("initialize", &[]).await;
        // the closure dies with this frame, so unhook it first
        self.set_progress_callback(&JsValue::NULL);
        drop(callback);
        result.map(|_| ()).map_err(BackendError::Init)
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, BackendError> {
        let options = serde_wasm_bindgen::to_value(options).map_err(|e| BackendError::Js(e.to_string()))?;
        let value = self
            .call_async("generate", &[JsValue::from_str(prompt), options])
            .await
            .map_err(BackendError::Generate)?;
        generated_text(&value).ok_or_else(|| BackendError::Generate("no generated_text in result".to_string()))
    }
}

/// The widget as seen from js: `new Terminal(display, helper?, config?)`.
#[wasm_bindgen(js_name = Terminal)]
pub struct WebTerminal {
    inner: Terminal,
}

#[wasm_bindgen(js_class = Terminal)]
impl WebTerminal {
    #[wasm_bindgen(constructor)]
    pub fn new(display: JsValue, helper: JsValue, config: JsValue) -> Result<WebTerminal, JsValue> {
        let config = if is_missing(&config) {
            TerminalConfig::default()
        } else {
            serde_wasm_bindgen::from_value::<TerminalConfig>(config)
                .map_err(|e| JsValue::from_str(&format!("invalid terminal config: {}", e)))?
        };
        let backend: Option<Rc<dyn InferenceBackend>> = if is_missing(&helper) {
            None
        } else {
            Some(Rc::new(JsBackend::new(helper)))
        };
        let display: Rc<RefCell<dyn Display>> = Rc::new(RefCell::new(JsDisplay::new(display)));
        log::info!("[web] terminal up, chat backend: {}", backend.is_some());
        Ok(WebTerminal { inner: Terminal::new(config, display, backend) })
    }

    pub fn boot(&self) {
        let term = self.inner.clone();
        spawn_local(async move { term.boot().await });
    }

    /// Returns true when the key submitted a line.
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(&self, key: &str, key_code: u32, ctrl: bool, alt: bool, meta: bool) -> bool {
        let submitted = self.inner.handle_key(Key::from_dom(key, key_code, ctrl, alt, meta));
        self.spawn_drain();
        submitted
    }

    pub fn submit(&self, line: &str) {
        self.inner.submit(line);
        self.spawn_drain();
    }

    pub fn resize(&self) {
        self.inner.resize();
    }

    pub fn mode(&self) -> String {
        match self.inner.mode() {
            SessionMode::Normal => "normal".to_string(),
            SessionMode::Chat => "chat".to_string(),
        }
    }

    pub fn history(&self) -> Array {
        self.inner.history().into_iter().map(JsValue::from).collect()
    }
}

impl WebTerminal {
    // every input event kicks a drain; extra ones just flush the echo
    fn spawn_drain(&self) {
        let term = self.inner.clone();
        spawn_local(async move { term.drain().await });
    }
}
