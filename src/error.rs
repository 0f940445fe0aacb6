//! Error taxonomy shared across the pipeline.
//!
//! Parse and consistency errors are fatal to a fetch, a missing root is fatal to a
//! single rebuild, and layout errors leave the previous diagram in place. None of
//! them are retried automatically.

use crate::config::ConfigError;
use crate::layout::LayoutError;
use crate::provider::ProviderError;
use thiserror::Error;

/// The payload is not a usable introspection result.
#[derive(Debug, Error)]
pub enum SchemaParseError {
    #[error("introspection payload has no `__schema` descriptor")]
    MissingSchema,

    #[error("introspection query returned errors: {0}")]
    QueryErrors(String),

    #[error("type `{0}` is declared more than once")]
    DuplicateType(String),

    #[error("malformed type reference in `{0}`")]
    MalformedTypeRef(String),

    #[error("invalid introspection payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// A type reference names a type the payload never declares.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("type `{missing}` referenced from `{referenced_from}` is not declared in the schema")]
pub struct SchemaConsistencyError {
    pub missing: String,
    pub referenced_from: String,
}

/// Neither the requested root nor the schema's query type exists.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RootNotFoundError {
    #[error("root type `{0}` is not declared in the schema")]
    Unknown(String),

    #[error("schema declares no query type and no root type was given")]
    NoQueryType,
}

/// Failure of [`crate::introspection::normalize`].
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error(transparent)]
    Parse(#[from] SchemaParseError),

    #[error(transparent)]
    Consistency(#[from] SchemaConsistencyError),
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Parse(SchemaParseError::Json(err))
    }
}

/// Umbrella error for library callers and CLI commands.
#[derive(Debug, Error)]
pub enum SchemamapError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    RootNotFound(#[from] RootNotFoundError),

    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("could not fetch introspection: {0}")]
    Provider(#[from] ProviderError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SchemaParseError> for SchemamapError {
    fn from(err: SchemaParseError) -> Self {
        SchemamapError::Schema(err.into())
    }
}

impl From<SchemaConsistencyError> for SchemamapError {
    fn from(err: SchemaConsistencyError) -> Self {
        SchemamapError::Schema(err.into())
    }
}
