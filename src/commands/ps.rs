use crate::command::{CommandResult, Reply};
use crate::context::TerminalContext;
use crate::style::StyledLine;

#[derive(Debug, Clone)]
pub struct VirtualProcess {
    pub pid: u32,
    pub cmd: &'static str,
    pub cpu: &'static str,
    pub mem: &'static str,
}

// the widget itself and the shell it pretends to be
const PROCESSES: &[VirtualProcess] = &[
    VirtualProcess { pid: 1, cmd: "terminal", cpu: "0.0", mem: "0.1" },
    VirtualProcess { pid: 2, cmd: "shell", cpu: "0.0", mem: "0.1" },
];

pub fn run(_args: &[String], _ctx: &mut TerminalContext) -> CommandResult {
    let mut lines = vec![StyledLine::info("  PID CMD          %CPU %MEM")];
    lines.extend(PROCESSES.iter().map(|p| {
        StyledLine::plain(format!("{:>5} {:<12} {:>4} {:>4}", p.pid, p.cmd, p.cpu, p.mem))
    }));
    Ok(Reply::lines(lines))
}
