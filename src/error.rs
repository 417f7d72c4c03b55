use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::Level;

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("Database already open")]
    AlreadyOpen,

    #[error("Database already closed")]
    AlreadyClosed,

    #[error("Database closed")]
    ClosedStore,

    #[error("Storage engine error: {0}")]
    StorageEngine(#[from] SqlxError),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Level for the diagnostics log. A lookup miss is not a storage failure.
    pub fn diagnostic_level(&self) -> Level {
        match self {
            StoreError::NotFound { .. } => Level::DEBUG,
            _ => Level::ERROR,
        }
    }
}

impl From<figment::Error> for StoreError {
    fn from(e: figment::Error) -> Self {
        StoreError::Config(Box::new(e))
    }
}
