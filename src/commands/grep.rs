use crate::command::{CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::{StyleTag, StyledLine};

/// grep PATTERN [FILE]...
///
/// Literal substring match, no regex. Without files every file is searched.
/// Hits print as `file:line:text`; a missing file is reported inline and the
/// search carries on.
pub fn run(args: &[String], ctx: &mut TerminalContext) -> CommandResult {
    let pattern = args[0].as_str();
    let targets: Vec<String> = if args.len() > 1 {
        args[1..].to_vec()
    } else {
        ctx.vfs.names().map(str::to_string).collect()
    };

    let cwd = ctx.cwd();
    let mut lines = Vec::new();
    let mut found = false;
    for target in &targets {
        let file = match ctx.vfs.read_file(target, &cwd) {
            Ok(file) => file,
            Err(e) => {
                lines.push(StyledLine::error(format!("grep: {}", e)));
                continue;
            }
        };
        for (i, line) in file.content.lines().enumerate() {
            if !line.contains(pattern) {
                continue;
            }
            found = true;
            lines.push(
                StyledLine::styled(target.as_str(), StyleTag::Success)
                    .push(":", StyleTag::Plain)
                    .push((i + 1).to_string(), StyleTag::Warning)
                    .push(":", StyleTag::Plain)
                    .push(line, StyleTag::Plain),
            );
        }
    }

    if !found {
        lines.push(StyledLine::warning("No matches found"));
    }
    Ok(Reply::lines(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{args, context, texts};

    const FILES: &[(&str, &str)] = &[
        ("a.txt", "first\nhas foo here\nlast"),
        ("b.txt", "nothing\nto see"),
    ];

    #[test]
    fn test_single_hit_across_named_files() {
        let mut ctx = context(Some(FILES));
        let reply = run(&args(&["foo", "a.txt", "b.txt"]), &mut ctx).unwrap();
        assert_eq!(texts(&reply.lines), vec!["a.txt:2:has foo here"]);
        assert_eq!(reply.lines[0].spans[0].style, StyleTag::Success);
        assert_eq!(reply.lines[0].spans[2].style, StyleTag::Warning);
    }

    #[test]
    fn test_defaults_to_every_file() {
        let mut ctx = context(Some(FILES));
        let reply = run(&args(&["t"]), &mut ctx).unwrap();
        assert_eq!(
            texts(&reply.lines),
            vec!["a.txt:1:first", "a.txt:3:last", "b.txt:1:nothing", "b.txt:2:to see"]
        );
    }

    #[test]
    fn test_no_matches() {
        let mut ctx = context(Some(FILES));
        let reply = run(&args(&["zzz"]), &mut ctx).unwrap();
        assert_eq!(texts(&reply.lines), vec!["No matches found"]);
        assert_eq!(reply.lines[0].spans[0].style, StyleTag::Warning);
    }

    #[test]
    fn test_missing_file_is_reported_and_skipped() {
        let mut ctx = context(Some(FILES));
        let reply = run(&args(&["foo", "nope.txt", "a.txt"]), &mut ctx).unwrap();
        assert_eq!(
            texts(&reply.lines),
            vec!["grep: nope.txt: No such file or directory", "a.txt:2:has foo here"]
        );
    }

    #[test]
    fn test_pattern_is_literal() {
        let mut ctx = context(Some(&[("r.txt", "a.c\nabc")]));
        let reply = run(&args(&["a.c"]), &mut ctx).unwrap();
        assert_eq!(texts(&reply.lines), vec!["r.txt:1:a.c"]);
    }
}
