use thiserror::Error;

/// Errors raised by query construction, materialization, and execution.
///
/// Construction-time failures (`TypeMismatch`, `Configuration`, the
/// projection variants) are detected before any store round trip. Store
/// failures are passed through unmodified in `Store`.
#[derive(Debug, Error)]
pub enum Error {
    /// Operand types are incompatible with the operator being applied
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Selection column count does not match the target constructor
    #[error("projection arity mismatch: target takes {expected} values, selection has {actual}")]
    ProjectionArity { expected: usize, actual: usize },

    /// A selected value cannot be assigned to its target field
    #[error("projection type mismatch: {0}")]
    ProjectionType(String),

    /// Tuple access by a position or label the row does not carry
    #[error("unknown projection key: {0}")]
    UnknownProjectionKey(String),

    /// `fetch_one` matched no rows
    #[error("no rows found")]
    NotFound,

    /// `fetch_one` matched more than one row
    #[error("more than one row returned")]
    TooManyResults,

    /// Malformed spec: unknown field, empty update assignment list,
    /// unresolved projection label, invalid page request
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A row value could not be mapped into the crate's value model
    #[error("mapping error: {0}")]
    Mapping(String),

    /// Opaque passthrough from the store collaborator
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Duplicate a recorded construction-time error so a builder can
    /// surface it at every submission attempt without giving it up. The
    /// `Store` variant is not duplicable and collapses to its message;
    /// builders only ever record construction-time variants.
    pub(crate) fn duplicate(&self) -> Error {
        match self {
            Error::TypeMismatch(msg) => Error::TypeMismatch(msg.clone()),
            Error::ProjectionArity { expected, actual } => Error::ProjectionArity {
                expected: *expected,
                actual: *actual,
            },
            Error::ProjectionType(msg) => Error::ProjectionType(msg.clone()),
            Error::UnknownProjectionKey(msg) => Error::UnknownProjectionKey(msg.clone()),
            Error::NotFound => Error::NotFound,
            Error::TooManyResults => Error::TooManyResults,
            Error::Configuration(msg) => Error::Configuration(msg.clone()),
            Error::Mapping(msg) => Error::Mapping(msg.clone()),
            Error::Store(source) => Error::Configuration(source.to_string()),
        }
    }
}

#[cfg(feature = "rusqlite")]
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(Box::new(err))
    }
}

/// Result type for query operations
pub type Result<T> = std::result::Result<T, Error>;
