// native repl over the same core, handy for poking at commands without a
// browser. no chat backend here, so `chat` reports it as unavailable
#![cfg_attr(target_arch = "wasm32", allow(dead_code, unused_imports))]

use folio_shell::{StdoutDisplay, Terminal, TerminalConfig};
use futures::executor::block_on;
use std::cell::RefCell;
use std::error::Error;
use std::io::{self, BufRead};
use std::rc::Rc;

// optional first arg: path to a json config
fn load_config() -> Result<TerminalConfig, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            Ok(TerminalConfig::from_json(&json)?)
        }
        None => Ok(TerminalConfig::default()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let config = load_config()?;
    let terminal = Terminal::new(config, Rc::new(RefCell::new(StdoutDisplay)), None);
    block_on(terminal.boot());

    for line in io::stdin().lock().lines() {
        let line = line?;
        terminal.submit(&line);
        block_on(terminal.drain());
    }
    println!();
    Ok(())
}

// the browser entry point lives in the library
#[cfg(target_arch = "wasm32")]
fn main() {}
