use alloc::string::{String, ToString};

use thiserror::Error;

use crate::GameKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("Unknown game identifier: {0:?}")]
    UnknownGame(String),
    #[error("No factory registered for {0:?}")]
    MissingFactory(GameKind),
    #[error("Invalid color token: {0:?}")]
    InvalidColor(String),
    #[error("Invalid save data: {0}")]
    InvalidSaveData(String),
    #[error("Unknown button: {0:?}")]
    UnknownButton(String),
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidSaveData(err.to_string())
    }
}

pub type Result<T> = core::result::Result<T, ConsoleError>;
