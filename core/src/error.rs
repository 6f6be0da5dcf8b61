use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Storage is not available")]
    StorageUnavailable,

    #[error("Stock '{name}' already exists")]
    DuplicateStock { name: String },

    #[error("Price series for '{name}' already exists")]
    DuplicateSeries { name: String },

    #[error("No stock named '{name}'")]
    UnknownStock { name: String },

    #[error("No price series for '{name}'")]
    UnknownSeries { name: String },

    #[error("Rows in '{table}' failed validation")]
    ValidationFailed { table: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
