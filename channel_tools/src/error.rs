use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
}
