use crate::command::{Category, CommandError, CommandKind, CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::{StyleTag, StyledLine};

const CATEGORIES: [Category; 4] = [Category::Files, Category::System, Category::Search, Category::Control];

/// help [COMMAND]
pub fn run(args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
    match args.first() {
        Some(topic) => topic_help(topic),
        None => Ok(Reply::lines(overview())),
    }
}

fn topic_help(topic: &str) -> CommandResult {
    let kind = CommandKind::from_name(&topic.to_lowercase())
        .ok_or_else(|| CommandError::NotFound(format!("help: no help topics match '{}'", topic)))?;
    Ok(Reply::line(
        StyledLine::styled(kind.synopsis(), StyleTag::Info).push(format!(" - {}", kind.summary()), StyleTag::Plain),
    ))
}

// grouped by category, in declaration order within each
fn overview() -> Vec<StyledLine> {
    let mut lines = vec![StyledLine::styled("Available Commands", StyleTag::Heading(1))];
    for category in CATEGORIES {
        lines.push(StyledLine::blank());
        lines.push(StyledLine::styled(category.title(), StyleTag::Heading(2)));
        for kind in CommandKind::ALL.iter().filter(|k| k.category() == category) {
            lines.push(
                StyledLine::styled(format!("  {:<16}", kind.synopsis()), StyleTag::Info)
                    .push(format!(" - {}", kind.summary()), StyleTag::Plain),
            );
        }
    }
    lines.push(StyledLine::blank());
    lines.push(StyledLine::muted("Use 'help COMMAND' for a single command, or 'man COMMAND' for a manual page."));
    lines
}
