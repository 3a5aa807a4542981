//! Status indicator driven by on/off commands received from the broker.

/// Tri-state summary of the last recognized command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusIndicator {
    #[default]
    Unknown,
    Active,
    Inactive,
}

/// Result of reading a payload as a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Recognized(StatusIndicator),
    Unrecognized,
}

/// `ON` and `OFF`, ASCII case-insensitive, nothing else.
pub fn parse_command(payload: &str) -> Command {
    if payload.eq_ignore_ascii_case("on") {
        Command::Recognized(StatusIndicator::Active)
    } else if payload.eq_ignore_ascii_case("off") {
        Command::Recognized(StatusIndicator::Inactive)
    } else {
        Command::Unrecognized
    }
}

impl StatusIndicator {
    pub fn apply(self, payload: &str) -> StatusIndicator {
        match parse_command(payload) {
            Command::Recognized(next) => next,
            Command::Unrecognized => self,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            StatusIndicator::Unknown => "⬜",
            StatusIndicator::Active => "🟩",
            StatusIndicator::Inactive => "🟥",
        }
    }
}
