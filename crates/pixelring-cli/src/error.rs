use std::fmt;

use pixelring_config::ConfigError;
use pixelring_layout::LayoutError;
use pixelring_pcb::BoardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Bad arguments or conflicting flags.
    Usage = 1,
    /// Unreadable board or config, or a layer/net/component/pad the board lacks.
    Input = 2,
    /// Failure while laying out (outline continuity, write errors).
    Processing = 3,
}

#[derive(Debug)]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Usage,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Input,
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Processing,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::input(format!("config: {err}"))
    }
}

impl From<BoardError> for CliError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::Io { action: "read", .. }
            | BoardError::Syntax(_)
            | BoardError::Format(_)
            | BoardError::UnknownLayer(_)
            | BoardError::UnknownNet(_) => CliError::input(err.to_string()),
            _ => CliError::processing(err.to_string()),
        }
    }
}

impl From<LayoutError> for CliError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::Board(err) => err.into(),
            LayoutError::EmptySupply { .. } | LayoutError::MissingPad { .. } => {
                CliError::input(err.to_string())
            }
            LayoutError::Outline(_) => CliError::processing(err.to_string()),
        }
    }
}
