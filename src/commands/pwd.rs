use crate::command::{CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::StyledLine;

pub fn run(_args: &[String], ctx: &mut TerminalContext) -> CommandResult {
    Ok(Reply::line(StyledLine::info(ctx.cwd())))
}
