use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("command `{0}` requires a value")]
    MissingValue(String),

    #[error("invalid value for `{command}`: {reason}")]
    InvalidValue { command: String, reason: String },

    #[error("invalid table size {rows}x{cols}")]
    InvalidTableSize { rows: i64, cols: i64 },

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("selection does not resolve: {0}")]
    InvalidSelection(String),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    pub(crate) fn invalid_value(command: &str, reason: impl Into<String>) -> Self {
        EditorError::InvalidValue {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
