use thiserror::Error;

#[derive(Error, Debug)]
pub enum JanitorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid glob '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Command '{command}' failed: {message}")]
    Command { command: String, message: String },

    #[error("Document error: {0}")]
    Document(String),

    #[error("File error: {0}")]
    File(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A failure that carries only a bare value, not a described error.
    #[error("Error: {0}")]
    Raw(String),

    /// A failure with nothing attached to it.
    #[error("Undefined error")]
    Undefined,
}

impl JanitorError {
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Whether this is a described error rather than a bare or missing value.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Raw(_) | Self::Undefined)
    }
}

impl From<String> for JanitorError {
    fn from(s: String) -> Self {
        JanitorError::Raw(s)
    }
}

pub type Result<T> = std::result::Result<T, JanitorError>;
