use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContagionError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContagionError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown node: {0}")]
    UnknownNode(String),
    #[error("duplicate node label: {0}")]
    DuplicateNode(String),
}

impl ContagionError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ContagionError::InvalidConfig(msg.into())
    }
}
