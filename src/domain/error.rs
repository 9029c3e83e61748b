//! Domain error types.

use crate::domain::universe::UniverseError;

/// Top-level error type for earnsight.
///
/// Missing data is never an error: absent closes, symbols without earnings
/// and empty universes are encoded as `None` or empty collections. These
/// variants cover collaborators that cannot be reached and bad configuration.
#[derive(Debug, thiserror::Error)]
pub enum EarnsightError {
    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error("sink error ({sink}): {reason}")]
    Sink { sink: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Tickers(#[from] UniverseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EarnsightError {
    pub fn data(reason: impl Into<String>) -> Self {
        Self::Data {
            reason: reason.into(),
        }
    }

    pub fn sink(sink: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Sink {
            sink: sink.into(),
            reason: reason.into(),
        }
    }
}

impl From<&EarnsightError> for std::process::ExitCode {
    fn from(err: &EarnsightError) -> Self {
        let code: u8 = match err {
            EarnsightError::Io(_) => 1,
            EarnsightError::ConfigParse { .. }
            | EarnsightError::ConfigMissing { .. }
            | EarnsightError::ConfigInvalid { .. } => 2,
            EarnsightError::Data { .. } => 3,
            EarnsightError::Sink { .. } => 4,
            EarnsightError::Tickers(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
