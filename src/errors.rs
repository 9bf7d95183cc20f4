use thiserror::Error;

use crate::client::FetchError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}
