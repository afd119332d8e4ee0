//! Slash-command parsing

use super::CommandRequest;

/// Commands the bot understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start`: greeting and control menu
    Start,
    /// `/settime <HH:MM> [<HH:MM>]`
    SetTime(Vec<String>),
    /// `/reset_used`
    ResetUsed,
    /// Anything else; ignored
    Unknown(String),
}

impl Command {
    pub fn parse(request: &CommandRequest) -> Self {
        match request.name.to_lowercase().as_str() {
            "start" => Self::Start,
            "settime" => Self::SetTime(request.args.clone()),
            "reset_used" => Self::ResetUsed,
            _ => Self::Unknown(request.name.clone()),
        }
    }
}
