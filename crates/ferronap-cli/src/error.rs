use thiserror::Error;

use ferronap_core::{OnapError, OnapErrorKind};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ferronap_core::ValidationError),

    #[error(transparent)]
    Settings(#[from] ferronap_core::SettingsError),

    #[error(transparent)]
    Onap(#[from] OnapError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Command(_) => 2,
            Self::Onap(error) => match error.kind() {
                OnapErrorKind::Validation => 2,
                OnapErrorKind::NotFound => 3,
                OnapErrorKind::Configuration => 4,
                OnapErrorKind::Api => 5,
                OnapErrorKind::Lifecycle => 6,
            },
            Self::Settings(_) => 4,
            Self::Serialization(_) => 7,
            Self::Io(_) => 10,
        }
    }
}
