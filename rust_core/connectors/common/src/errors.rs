use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectorError {
    #[error("network error: {0}")]
    Network(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("unexpected status: {status}")]
    UnexpectedStatus { status: u16 },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("parse error: {0}")]
    Parse(String),
}
