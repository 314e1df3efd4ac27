use crate::command::{CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::StyledLine;

/// echo [STRING]...
pub fn run(args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
    Ok(Reply::line(StyledLine::plain(args.join(" "))))
}
