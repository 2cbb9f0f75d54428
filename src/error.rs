use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetroviewError {
    /// History requested for an input that is not in the tracked set
    #[error("input '{0}' is not tracked")]
    UntrackedInput(String),

    #[error("unknown controller format: {0}")]
    UnknownFormat(String),

    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

pub type Result<T> = std::result::Result<T, RetroviewError>;
