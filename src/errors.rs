use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised by a document store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document not found: {0}")]
    NoSuchDocument(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported aggregation stage: {0}")]
    UnsupportedStage(String),

    #[error("Invalid aggregation stage: {0}")]
    InvalidStage(String),
}

/// Failures of the query engine. Every variant maps onto one [`ErrorKind`].
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid query name format: '{0}'. Expected: 'entity.operation'")]
    InvalidQueryName(String),

    #[error("Entity not found: {0}")]
    UnknownEntity(String),

    #[error("Operation not found: {operation} for entity: {entity}")]
    UnknownOperation { entity: String, operation: String },

    #[error("Query not found: {0}")]
    QueryNotFound(String),

    #[error("Query is not active: {0}")]
    QueryInactive(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Unsupported query type: {0}")]
    UnsupportedOperation(String),

    #[error("Store operation failed: {0}")]
    StoreOperation(#[from] StoreError),

    #[error("Query already exists with name: {0}")]
    QueryAlreadyExists(String),

    #[error("Invalid query definition: {0}")]
    InvalidDefinition(String),

    #[error("Failed to load query configuration: {0}")]
    CatalogueLoad(String),

    #[error("Failed to load settings: {0}")]
    ConfigLoad(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializable error tag carried by failed execution results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidQueryName,
    UnknownQuery,
    QueryNotFound,
    MissingParameter,
    MalformedFilter,
    UnsupportedOperation,
    StoreOperation,
    QueryAlreadyExists,
    InvalidDefinition,
    CatalogueLoad,
    ConfigLoad,
    Io,
}

impl QueryError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQueryName(_) => ErrorKind::InvalidQueryName,
            Self::UnknownEntity(_) | Self::UnknownOperation { .. } => ErrorKind::UnknownQuery,
            Self::QueryNotFound(_) | Self::QueryInactive(_) => ErrorKind::QueryNotFound,
            Self::MissingParameter(_) => ErrorKind::MissingParameter,
            Self::MalformedFilter(_) => ErrorKind::MalformedFilter,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::StoreOperation(_) => ErrorKind::StoreOperation,
            Self::QueryAlreadyExists(_) => ErrorKind::QueryAlreadyExists,
            Self::InvalidDefinition(_) => ErrorKind::InvalidDefinition,
            Self::CatalogueLoad(_) => ErrorKind::CatalogueLoad,
            Self::ConfigLoad(_) => ErrorKind::ConfigLoad,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidQueryName => "InvalidQueryNameError",
            Self::UnknownQuery => "UnknownQueryError",
            Self::QueryNotFound => "QueryNotFoundError",
            Self::MissingParameter => "MissingParameterError",
            Self::MalformedFilter => "MalformedFilterError",
            Self::UnsupportedOperation => "UnsupportedOperationError",
            Self::StoreOperation => "StoreOperationError",
            Self::QueryAlreadyExists => "QueryAlreadyExistsError",
            Self::InvalidDefinition => "InvalidDefinitionError",
            Self::CatalogueLoad => "CatalogueLoadError",
            Self::ConfigLoad => "ConfigLoadError",
            Self::Io => "IoError",
        };
        f.write_str(s)
    }
}
