use crate::command::{CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::{StyleTag, StyledLine};

/// NAME=value, in the order the context holds them
pub fn run(_args: &[String], ctx: &mut TerminalContext) -> CommandResult {
    let lines = ctx
        .env
        .iter()
        .map(|(key, value)| {
            StyledLine::styled(key.as_str(), StyleTag::Info)
                .push("=", StyleTag::Plain)
                .push(value.as_str(), StyleTag::Plain)
        })
        .collect();
    Ok(Reply::lines(lines))
}
