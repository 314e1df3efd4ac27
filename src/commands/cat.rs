use crate::command::{CommandError, CommandResult, Reply};
use crate::context::TerminalContext;
use crate::format;

/// Render a file as markdown. `./name` and `<cwd>/name` both work.
pub fn run(args: &[String], ctx: &mut TerminalContext) -> CommandResult {
    let path = &args[0];
    let cwd = ctx.cwd();
    let file = ctx
        .vfs
        .read_file(path, &cwd)
        .map_err(|e| CommandError::NotFound(format!("cat: {}", e)))?;
    Ok(Reply::lines(format::render(&file.content)))
}
