use crate::command::{CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::{StyleTag, StyledLine};
use crate::vfs::FileRecord;

// blocks reported per file in the `total` line
const BLOCKS_PER_FILE: usize = 4;

fn format_time(file: &FileRecord) -> String {
    file.modified.format("%b %d %H:%M").to_string()
}

/// `ls`: names only, one per line, alphabetical
pub fn run(_args: &[String], ctx: &mut TerminalContext) -> CommandResult {
    let lines = ctx.vfs.names().map(StyledLine::info).collect();
    Ok(Reply::lines(lines))
}

/// `ll`: long listing, permissions through name
pub fn run_long(_args: &[String], ctx: &mut TerminalContext) -> CommandResult {
    let mut lines = Vec::with_capacity(ctx.vfs.len() + 1);
    lines.push(StyledLine::plain(format!("total {}", ctx.vfs.len() * BLOCKS_PER_FILE)));
    for file in ctx.vfs.files() {
        let meta = format!(
            "{} {} {} {:>8} {} ",
            file.permissions,
            file.owner,
            file.group,
            file.size,
            format_time(file)
        );
        lines.push(StyledLine::plain(meta).push(file.name.as_str(), StyleTag::Info));
    }
    Ok(Reply::lines(lines))
}
