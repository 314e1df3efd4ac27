use crate::command::{CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::StyledLine;

pub fn run(args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
    Ok(Reply::line(StyledLine::success(format!("Created file {}", args[0]))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{args, context, texts};

    #[test]
    fn test_touch_does_not_add_a_file() {
        let mut ctx = context(None);
        let reply = run(&args(&["todo.txt"]), &mut ctx).unwrap();
        assert_eq!(texts(&reply.lines), vec!["Created file todo.txt"]);
        assert!(ctx.vfs.get("todo.txt").is_none());
    }
}
