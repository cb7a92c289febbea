use thiserror::Error;

/// Common error type shared by the pageforge crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
}
