use crate::chat::BackendError;
use crate::commands;
use crate::context::TerminalContext;
use crate::style::{StyleTag, StyledLine};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    /// wrong or missing arguments
    #[error("{0}")]
    Usage(String),
    /// file, man page or help topic that doesn't exist
    #[error("{0}")]
    NotFound(String),
    #[error("Already in chat mode. Type \"exit\" to leave chat mode.")]
    AlreadyInMode,
    #[error("Not in chat mode.")]
    NotInMode,
    #[error("Error: Chat service is not available.")]
    BackendUnavailable,
    #[error("Error: {0}")]
    Backend(#[from] BackendError),
}

impl CommandError {
    /// mode misuse is informational, everything else is an error
    pub fn style(&self) -> StyleTag {
        match self {
            CommandError::AlreadyInMode | CommandError::NotInMode => StyleTag::Info,
            _ => StyleTag::Error,
        }
    }

    pub fn to_line(&self) -> StyledLine {
        StyledLine::styled(self.to_string(), self.style())
    }
}

/// things a handler can ask for that go beyond printing lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialAction {
    ClearScreen,
    EnterChat,
    ExitChat,
}

/// handler output: lines to print, maybe followed by an action
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub lines: Vec<StyledLine>,
    pub action: Option<SpecialAction>,
}

impl Reply {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lines(lines: Vec<StyledLine>) -> Self {
        Self { lines, action: None }
    }

    pub fn line(line: impl Into<StyledLine>) -> Self {
        Self::lines(vec![line.into()])
    }

    pub fn action(action: SpecialAction) -> Self {
        Self { lines: Vec::new(), action: Some(action) }
    }
}

pub type CommandResult = Result<Reply, CommandError>;

pub type Handler = fn(&[String], &mut TerminalContext) -> CommandResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Files,
    System,
    Search,
    Control,
}

impl Category {
    pub fn title(self) -> &'static str {
        match self {
            Category::Files => "File Operations",
            Category::System => "System Information",
            Category::Search => "Search & Documentation",
            Category::Control => "Terminal Control",
        }
    }
}

/// Closed set of built-ins. Name lookup happens once per line via
/// `from_name`, everything else is a match on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Help,
    Clear,
    Ls,
    Ll,
    Cat,
    Pwd,
    Mkdir,
    Touch,
    Rm,
    Cp,
    Mv,
    Echo,
    Whoami,
    Date,
    Ps,
    Df,
    Env,
    Uname,
    Grep,
    Find,
    Man,
    History,
    Chat,
    Exit,
}

impl CommandKind {
    pub const ALL: [CommandKind; 24] = [
        CommandKind::Help,
        CommandKind::Clear,
        CommandKind::Ls,
        CommandKind::Ll,
        CommandKind::Cat,
        CommandKind::Pwd,
        CommandKind::Mkdir,
        CommandKind::Touch,
        CommandKind::Rm,
        CommandKind::Cp,
        CommandKind::Mv,
        CommandKind::Echo,
        CommandKind::Whoami,
        CommandKind::Date,
        CommandKind::Ps,
        CommandKind::Df,
        CommandKind::Env,
        CommandKind::Uname,
        CommandKind::Grep,
        CommandKind::Find,
        CommandKind::Man,
        CommandKind::History,
        CommandKind::Chat,
        CommandKind::Exit,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Help => "help",
            CommandKind::Clear => "clear",
            CommandKind::Ls => "ls",
            CommandKind::Ll => "ll",
            CommandKind::Cat => "cat",
            CommandKind::Pwd => "pwd",
            CommandKind::Mkdir => "mkdir",
            CommandKind::Touch => "touch",
            CommandKind::Rm => "rm",
            CommandKind::Cp => "cp",
            CommandKind::Mv => "mv",
            CommandKind::Echo => "echo",
            CommandKind::Whoami => "whoami",
            CommandKind::Date => "date",
            CommandKind::Ps => "ps",
            CommandKind::Df => "df",
            CommandKind::Env => "env",
            CommandKind::Uname => "uname",
            CommandKind::Grep => "grep",
            CommandKind::Find => "find",
            CommandKind::Man => "man",
            CommandKind::History => "history",
            CommandKind::Chat => "chat",
            CommandKind::Exit => "exit",
        }
    }

    /// name plus operands, as shown in `help`
    pub fn synopsis(self) -> &'static str {
        match self {
            CommandKind::Cat => "cat <file>",
            CommandKind::Mkdir => "mkdir <dir>",
            CommandKind::Touch => "touch <file>",
            CommandKind::Rm => "rm <file>",
            CommandKind::Cp => "cp <src> <dst>",
            CommandKind::Mv => "mv <src> <dst>",
            CommandKind::Echo => "echo <text>",
            CommandKind::Grep => "grep <pattern>",
            CommandKind::Find => "find <path>",
            CommandKind::Man => "man <command>",
            CommandKind::Help => "help [command]",
            other => other.name(),
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            CommandKind::Help => "Show this help message",
            CommandKind::Clear => "Clear terminal screen",
            CommandKind::Ls => "List files in current directory",
            CommandKind::Ll => "Detailed file listing",
            CommandKind::Cat => "Display file contents",
            CommandKind::Pwd => "Print working directory",
            CommandKind::Mkdir => "Create directory",
            CommandKind::Touch => "Create empty file",
            CommandKind::Rm => "Remove file",
            CommandKind::Cp => "Copy file",
            CommandKind::Mv => "Move file",
            CommandKind::Echo => "Print its arguments",
            CommandKind::Whoami => "Show current user",
            CommandKind::Date => "Show current date/time",
            CommandKind::Ps => "List running processes",
            CommandKind::Df => "Show disk space usage",
            CommandKind::Env => "Show environment variables",
            CommandKind::Uname => "Show system information",
            CommandKind::Grep => "Search files for a pattern",
            CommandKind::Find => "Find files",
            CommandKind::Man => "Show manual page",
            CommandKind::History => "View command history (-c clears it)",
            CommandKind::Chat => "Start chat mode",
            CommandKind::Exit => "Exit chat mode (when in chat)",
        }
    }

    pub fn category(self) -> Category {
        match self {
            CommandKind::Ls
            | CommandKind::Ll
            | CommandKind::Cat
            | CommandKind::Pwd
            | CommandKind::Mkdir
            | CommandKind::Touch
            | CommandKind::Rm
            | CommandKind::Cp
            | CommandKind::Mv => Category::Files,
            CommandKind::Whoami
            | CommandKind::Date
            | CommandKind::Ps
            | CommandKind::Df
            | CommandKind::Env
            | CommandKind::Uname => Category::System,
            CommandKind::Grep | CommandKind::Find | CommandKind::Man | CommandKind::History => {
                Category::Search
            }
            CommandKind::Help
            | CommandKind::Clear
            | CommandKind::Echo
            | CommandKind::Chat
            | CommandKind::Exit => Category::Control,
        }
    }

    /// operands required before the handler runs
    pub fn min_args(self) -> usize {
        match self {
            CommandKind::Cat
            | CommandKind::Mkdir
            | CommandKind::Touch
            | CommandKind::Rm
            | CommandKind::Grep
            | CommandKind::Find
            | CommandKind::Man => 1,
            CommandKind::Cp | CommandKind::Mv => 2,
            _ => 0,
        }
    }

    /// message for "not enough operands", mirroring coreutils wording
    pub fn arity_error(self, args: &[String]) -> CommandError {
        let msg = match (self, args.first()) {
            (CommandKind::Cat, _) => "cat: missing operand".to_string(),
            (CommandKind::Mkdir, _) => "mkdir: missing operand".to_string(),
            (CommandKind::Touch, _) => "touch: missing file operand".to_string(),
            (CommandKind::Rm, _) => "rm: missing operand".to_string(),
            (CommandKind::Cp | CommandKind::Mv, Some(src)) => {
                format!("{}: missing destination file operand after '{}'", self.name(), src)
            }
            (CommandKind::Cp | CommandKind::Mv, None) => {
                format!("{}: missing file operand", self.name())
            }
            (CommandKind::Grep, _) => "grep: missing pattern".to_string(),
            (CommandKind::Find, _) => "find: missing path".to_string(),
            (CommandKind::Man, _) => "What manual page do you want?".to_string(),
            (other, _) => format!("Usage: {}", other.synopsis()),
        };
        CommandError::Usage(msg)
    }

    pub fn handler(self) -> Handler {
        match self {
            CommandKind::Help => commands::help::run,
            CommandKind::Clear => commands::clear::run,
            CommandKind::Ls => commands::ls::run,
            CommandKind::Ll => commands::ls::run_long,
            CommandKind::Cat => commands::cat::run,
            CommandKind::Pwd => commands::pwd::run,
            CommandKind::Mkdir => commands::mkdir::run,
            CommandKind::Touch => commands::touch::run,
            CommandKind::Rm => commands::rm::run,
            CommandKind::Cp => commands::cp::run_copy,
            CommandKind::Mv => commands::cp::run_move,
            CommandKind::Echo => commands::echo::run,
            CommandKind::Whoami => commands::sysinfo::whoami,
            CommandKind::Date => commands::sysinfo::date,
            CommandKind::Ps => commands::ps::run,
            CommandKind::Df => commands::sysinfo::df,
            CommandKind::Env => commands::env::run,
            CommandKind::Uname => commands::sysinfo::uname,
            CommandKind::Grep => commands::grep::run,
            CommandKind::Find => commands::find::run,
            CommandKind::Man => commands::man::run,
            CommandKind::History => commands::history::run,
            CommandKind::Chat => commands::chat::start,
            CommandKind::Exit => commands::chat::exit,
        }
    }

    /// Arity check, then the handler itself. Arguments are passed through
    /// untouched, flags included.
    pub fn invoke(self, args: &[String], ctx: &mut TerminalContext) -> CommandResult {
        if args.len() < self.min_args() {
            return Err(self.arity_error(args));
        }
        (self.handler())(args, ctx)
    }
}

/// One parsed line: lowercased command name plus positional args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandInvocation {
    pub fn parse(input: &str) -> Option<Self> {
        let mut tokens = tokenize(input).into_iter();
        let name = tokens.next()?.to_lowercase();
        Some(Self { name, args: tokens.collect() })
    }
}

/// Split on whitespace, but keep 'single' or "double" quoted text together
/// (quotes stripped). Pieces touching a quote join into one token and an
/// unterminated quote runs to the end of the line.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

/// result of running one line through the command table
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// blank line
    Empty,
    /// no such command, carries the lowercased name
    Unknown(String),
    Ran { kind: CommandKind, result: CommandResult },
}

pub fn run_command(input: &str, ctx: &mut TerminalContext) -> Dispatch {
    let Some(invocation) = CommandInvocation::parse(input) else {
        return Dispatch::Empty;
    };
    match CommandKind::from_name(&invocation.name) {
        Some(kind) => {
            log::debug!("[dispatch] {} {:?}", kind.name(), invocation.args);
            Dispatch::Ran { kind, result: kind.invoke(&invocation.args, ctx) }
        }
        None => Dispatch::Unknown(invocation.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerminalConfig;
    use crate::context::{SessionMode, SessionState};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ctx() -> TerminalContext {
        let cfg = TerminalConfig::default();
        let session = Rc::new(RefCell::new(SessionState::new(cfg.identity.cwd.clone())));
        TerminalContext::new(&cfg, session, true)
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(tokenize(r#"cp "a b.txt" c.txt"#), vec!["cp", "a b.txt", "c.txt"]);
        assert_eq!(tokenize("echo 'it is'   fine"), vec!["echo", "it is", "fine"]);
        assert_eq!(tokenize(r#"say "it's""#), vec!["say", "it's"]);
    }

    #[test]
    fn test_tokenize_edges() {
        assert!(tokenize("   \t ").is_empty());
        assert_eq!(tokenize(r#"a"b c"d"#), vec!["ab cd"]);
        assert_eq!(tokenize(r#"x """#), vec!["x", ""]);
        assert_eq!(tokenize(r#"grep "open ended"#), vec!["grep", "open ended"]);
    }

    #[test]
    fn test_invocation_lowercases_name_only() {
        let inv = CommandInvocation::parse("  CAT About.md ").unwrap();
        assert_eq!(inv.name, "cat");
        assert_eq!(inv.args, vec!["About.md"]);
        assert!(CommandInvocation::parse("   ").is_none());
    }

    #[test]
    fn test_every_kind_round_trips_its_name() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(CommandKind::from_name("xyz"), None);
    }

    #[test]
    fn test_missing_operands_give_one_error_and_change_nothing() {
        for kind in CommandKind::ALL.into_iter().filter(|k| k.min_args() > 0) {
            let mut ctx = ctx();
            let files_before = ctx.vfs.len();
            let args: Vec<String> = Vec::new();
            let err = kind.invoke(&args, &mut ctx).unwrap_err();
            assert!(matches!(err, CommandError::Usage(_)), "{:?}", kind);
            assert_eq!(err.to_line().spans.len(), 1);
            assert_eq!(err.style(), StyleTag::Error);
            assert_eq!(ctx.vfs.len(), files_before);
            assert_eq!(ctx.mode(), SessionMode::Normal);
        }
    }

    #[test]
    fn test_cp_with_one_operand() {
        let mut ctx = ctx();
        let err = CommandKind::Cp.invoke(&["a".to_string()], &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "cp: missing destination file operand after 'a'");
    }

    #[test]
    fn test_unknown_command() {
        let mut ctx = ctx();
        assert_eq!(run_command("XYZ now", &mut ctx), Dispatch::Unknown("xyz".to_string()));
        assert_eq!(run_command("  ", &mut ctx), Dispatch::Empty);
    }

    #[test]
    fn test_flags_reach_the_handler() {
        let mut ctx = crate::commands::testing::context(Some(&[("notes.txt", "see\nrun --help here")]));
        let reply = CommandKind::Echo.invoke(&["--help".to_string()], &mut ctx).unwrap();
        assert_eq!(reply.lines[0].plain_text(), "--help");

        let args = ["--help".to_string(), "notes.txt".to_string()];
        let reply = CommandKind::Grep.invoke(&args, &mut ctx).unwrap();
        let hits: Vec<String> = reply.lines.iter().map(|l| l.plain_text()).collect();
        assert_eq!(hits, vec!["notes.txt:2:run --help here"]);

        // still an arity error, not usage text
        assert!(CommandKind::Cp.invoke(&["--help".to_string()], &mut ctx).is_err());
    }
}
