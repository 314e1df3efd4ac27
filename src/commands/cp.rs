// cp and mv share everything but the verb
use crate::command::{CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::StyledLine;

fn confirm(verb: &str, args: &[String]) -> CommandResult {
    Ok(Reply::line(StyledLine::success(format!("{} {} to {}", verb, args[0], args[1]))))
}

pub fn run_copy(args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
    confirm("Copied", args)
}

pub fn run_move(args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
    confirm("Moved", args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandKind, run_command, Dispatch};
    use crate::commands::testing::{args, context, texts};

    #[test]
    fn test_copy_and_move() {
        let mut ctx = context(None);
        let reply = run_copy(&args(&["a", "b"]), &mut ctx).unwrap();
        assert_eq!(texts(&reply.lines), vec!["Copied a to b"]);
        let reply = run_move(&args(&["a", "b"]), &mut ctx).unwrap();
        assert_eq!(texts(&reply.lines), vec!["Moved a to b"]);
    }

    #[test]
    fn test_quoted_source() {
        let mut ctx = context(None);
        let Dispatch::Ran { kind, result } = run_command(r#"cp "a b.txt" c.txt"#, &mut ctx) else {
            panic!("cp should dispatch");
        };
        assert_eq!(kind, CommandKind::Cp);
        assert_eq!(texts(&result.unwrap().lines), vec!["Copied a b.txt to c.txt"]);
    }
}
