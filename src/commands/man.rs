use crate::command::{CommandError, CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::{StyleTag, StyledLine};

struct ManPage {
    name: &'static str,
    summary: &'static str,
    synopsis: &'static str,
    description: &'static str,
}

const PAGES: &[ManPage] = &[
    ManPage {
        name: "ls",
        summary: "list directory contents",
        synopsis: "ls",
        description: "List the files in the portfolio directory, one per line. See also ll.",
    },
    ManPage {
        name: "cat",
        summary: "concatenate files and print on the standard output",
        synopsis: "cat FILE",
        description: "Print FILE, rendering its markdown headers, lists and emphasis.",
    },
    ManPage {
        name: "grep",
        summary: "print lines that match patterns",
        synopsis: "grep PATTERN [FILE]...",
        description: "Search for PATTERN in each FILE, or in every file when none are named.",
    },
    ManPage {
        name: "help",
        summary: "display information about available commands",
        synopsis: "help [COMMAND]",
        description: "Display helpful information about builtin commands.",
    },
];

fn section(title: &str, body: &str) -> [StyledLine; 3] {
    [
        StyledLine::styled(title, StyleTag::Strong),
        StyledLine::plain(format!("    {}", body)),
        StyledLine::blank(),
    ]
}

pub fn run(args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
    let topic = args[0].to_lowercase();
    let page = PAGES
        .iter()
        .find(|p| p.name == topic)
        .ok_or_else(|| CommandError::NotFound(format!("No manual entry for {}", args[0])))?;

    let mut lines = vec![
        StyledLine::styled(format!("{}(1)", page.name.to_uppercase()), StyleTag::Heading(1)),
        StyledLine::blank(),
    ];
    lines.extend(section("NAME", &format!("{} - {}", page.name, page.summary)));
    lines.extend(section("SYNOPSIS", page.synopsis));
    lines.extend(section("DESCRIPTION", page.description));
    lines.pop();
    Ok(Reply::lines(lines))
}
