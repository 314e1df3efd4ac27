// chat / exit only decide whether a mode switch is allowed; the chat
// session itself does the switching
use crate::command::{CommandError, CommandResult, Reply, SpecialAction};
use crate::context::{SessionMode, TerminalContext};

pub fn start(_args: &[String], ctx: &mut TerminalContext) -> CommandResult {
    if ctx.mode() == SessionMode::Chat {
        return Err(CommandError::AlreadyInMode);
    }
    if !ctx.backend_available {
        return Err(CommandError::BackendUnavailable);
    }
    Ok(Reply::action(SpecialAction::EnterChat))
}

pub fn exit(_args: &[String], ctx: &mut TerminalContext) -> CommandResult {
    match ctx.mode() {
        SessionMode::Chat => Ok(Reply::action(SpecialAction::ExitChat)),
        SessionMode::Normal => Err(CommandError::NotInMode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::context;
    use crate::style::StyleTag;

    #[test]
    fn test_chat_requests_the_switch() {
        let mut ctx = context(None);
        let reply = start(&[], &mut ctx).unwrap();
        assert_eq!(reply.action, Some(SpecialAction::EnterChat));
        // the handler alone never flips the mode
        assert_eq!(ctx.mode(), SessionMode::Normal);
    }

    #[test]
    fn test_chat_twice_is_informational() {
        let mut ctx = context(None);
        ctx.session.borrow_mut().mode = SessionMode::Chat;
        let err = start(&[], &mut ctx).unwrap_err();
        assert_eq!(err, CommandError::AlreadyInMode);
        assert_eq!(err.style(), StyleTag::Info);
    }

    #[test]
    fn test_chat_without_backend() {
        let mut ctx = context(None);
        ctx.backend_available = false;
        let err = start(&[], &mut ctx).unwrap_err();
        assert_eq!(err, CommandError::BackendUnavailable);
        assert_eq!(err.style(), StyleTag::Error);
    }

    #[test]
    fn test_exit_outside_chat() {
        let mut ctx = context(None);
        let err = exit(&[], &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "Not in chat mode.");
        assert_eq!(err.style(), StyleTag::Info);
    }
}
