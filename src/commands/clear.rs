use crate::command::{CommandResult, Reply, SpecialAction};
use crate::context::TerminalContext;

/// The interpreter does the actual clearing and redraws the banner.
pub fn run(_args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
    Ok(Reply::action(SpecialAction::ClearScreen))
}
