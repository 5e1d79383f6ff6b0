use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Input `{0}` is not registered")]
    UnregisteredInput(String),
    #[error("Output `{0}` is not registered")]
    UnregisteredOutput(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("GPIO I/O error: {0}")]
    Io(String),
}
