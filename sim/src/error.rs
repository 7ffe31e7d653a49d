use neat::NeatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid course configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Neat(#[from] NeatError),
}

pub type Result<T> = std::result::Result<T, SimError>;
