use thiserror::Error;

use crate::model::ModelError;

/// Hard failures that abort a turn.
#[derive(Debug, Error)]
pub enum Error {
    /// The model endpoint call failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, Error>;
