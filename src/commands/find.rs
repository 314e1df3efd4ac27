use crate::command::{CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::StyledLine;

/// Flat table, so whatever path is asked for we list everything.
pub fn run(_args: &[String], ctx: &mut TerminalContext) -> CommandResult {
    let lines = ctx
        .vfs
        .names()
        .map(|name| StyledLine::plain(format!("./{}", name)))
        .collect();
    Ok(Reply::lines(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{args, context, texts};

    #[test]
    fn test_find_prefixes_names() {
        let mut ctx = context(Some(&[("b.md", ""), ("a.md", "")]));
        let reply = run(&args(&["."]), &mut ctx).unwrap();
        assert_eq!(texts(&reply.lines), vec!["./a.md", "./b.md"]);
    }
}
