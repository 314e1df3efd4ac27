// whoami / date / df / uname: canned answers derived from the identity
use crate::command::{CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::StyledLine;
use chrono::Local;

pub fn whoami(_args: &[String], ctx: &mut TerminalContext) -> CommandResult {
    Ok(Reply::line(StyledLine::plain(ctx.identity.user.as_str())))
}

/// local wall clock, coreutils `date` layout
pub fn date(_args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
    let now = Local::now();
    Ok(Reply::line(StyledLine::plain(now.format("%a %b %e %H:%M:%S %Z %Y").to_string())))
}

pub fn df(_args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
    Ok(Reply::lines(vec![
        StyledLine::info("Filesystem    Size   Used  Avail Use% Mounted on"),
        StyledLine::plain(format!(
            "{:<12}{:>6} {:>6} {:>6} {:>4} {}",
            "/dev/root", "50G", "25G", "25G", "50%", "/"
        )),
    ]))
}

pub fn uname(_args: &[String], ctx: &mut TerminalContext) -> CommandResult {
    Ok(Reply::line(StyledLine::plain(format!(
        "Linux {} {} #1 SMP {}",
        ctx.identity.host, ctx.identity.kernel, ctx.identity.machine
    ))))
}
