use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemosError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Conversation error: {0}")]
    Conversation(String),

    #[error("Memory retrieval error: {0}")]
    Retrieval(String),

    #[error("Memory persistence error: {0}")]
    Persistence(String),

    #[error("Memory client error: {0}")]
    Client(String),

    #[error("Invalid message origin: {0}")]
    InvalidOrigin(String),

    #[error("Logging setup error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MemosError>;
