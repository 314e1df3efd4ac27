use crate::command::{CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::StyledLine;

/// Confirms only. The file table is read-only so nothing is created.
pub fn run(args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
    Ok(Reply::line(StyledLine::success(format!("Created directory {}", args[0]))))
}
