use thiserror::Error;

#[derive(Debug, Error)]
pub enum WpError {
    #[error("WordPress request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("WordPress returned status {status}")]
    Status { status: u16 },

    #[error("WordPress client construction failed: {0}")]
    Client(String),
}
