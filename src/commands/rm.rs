use crate::command::{CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::StyledLine;

pub fn run(args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
    Ok(Reply::line(StyledLine::success(format!("Removed {}", args[0]))))
}
