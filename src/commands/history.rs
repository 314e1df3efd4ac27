use crate::command::{CommandError, CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::StyledLine;

/// history [-c]
pub fn run(args: &[String], ctx: &mut TerminalContext) -> CommandResult {
    match args {
        [] => {
            let session = ctx.session.borrow();
            let lines = session
                .history
                .entries()
                .iter()
                .enumerate()
                .map(|(i, cmd)| StyledLine::plain(format!("{:>4}  {}", i + 1, cmd)))
                .collect();
            Ok(Reply::lines(lines))
        }
        [flag] if flag == "-c" => {
            ctx.session.borrow_mut().history.clear();
            Ok(Reply::line(StyledLine::success("History cleared")))
        }
        _ => Err(CommandError::Usage("history: usage: history [-c]".to_string())),
    }
}
