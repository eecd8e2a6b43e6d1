use thiserror::Error;

/// Result alias for setup operations (config loading, transport construction).
pub type ResetflowResult<T> = Result<T, ResetflowError>;

/// Errors raised while wiring a reset client together.
///
/// Flow submissions never produce this type; their results are reported as
/// [`crate::flow::FlowOutcome`] and [`crate::validation::FieldErrors`] values.
#[derive(Error, Debug)]
pub enum ResetflowError {
    #[error("[RF1000] io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("[RF1001] toml config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("[RF1002] yaml config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("[RF1100] configuration error: {0}")]
    InvalidConfig(String),

    #[error("[RF2000] transport setup error: {0}")]
    Transport(String),
}

impl ResetflowError {
    pub fn code(&self) -> &'static str {
        match self {
            ResetflowError::Io(_) => "RF1000",
            ResetflowError::Toml(_) => "RF1001",
            ResetflowError::Yaml(_) => "RF1002",
            ResetflowError::InvalidConfig(_) => "RF1100",
            ResetflowError::Transport(_) => "RF2000",
        }
    }
}
