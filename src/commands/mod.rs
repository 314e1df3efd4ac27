// one file per built-in (or per family of built-ins)
// handlers are plain fns, `CommandKind::handler` wires them up

pub mod cat;
pub mod chat;
pub mod clear;
pub mod cp;
pub mod echo;
pub mod env;
pub mod find;
pub mod grep;
pub mod help;
pub mod history;
pub mod ls;
pub mod man;
pub mod mkdir;
pub mod ps;
pub mod pwd;
pub mod rm;
pub mod sysinfo;
pub mod touch;

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::TerminalConfig;
    use crate::context::{SessionState, TerminalContext};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// context over the given files, or the built-in table
    pub fn context(files: Option<&[(&str, &str)]>) -> TerminalContext {
        let mut cfg = TerminalConfig::default();
        if let Some(files) = files {
            cfg.files = Some(
                files
                    .iter()
                    .map(|(n, c)| (n.to_string(), c.to_string()))
                    .collect(),
            );
        }
        let session = Rc::new(RefCell::new(SessionState::new(cfg.identity.cwd.clone())));
        TerminalContext::new(&cfg, session, true)
    }

    pub fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    pub fn texts(lines: &[crate::style::StyledLine]) -> Vec<String> {
        lines.iter().map(|l| l.plain_text()).collect()
    }
}
