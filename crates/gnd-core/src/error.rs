//! Error types for gnd operations.
//!
//! This module provides the error hierarchy shared by the normalizer, the
//! reconciliation engine and the index backends, with structured error codes
//! and suggestions for resolution.

use thiserror::Error;

/// Result type alias for gnd operations.
pub type GndResult<T> = Result<T, GndError>;

/// Main error type for all gnd operations.
#[derive(Error, Debug)]
pub enum GndError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation { message: String, code: ErrorCode },

    /// Entity not found.
    #[error("Entity not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        entity_id: Option<String>,
    },

    /// Search index operation failed.
    #[error("Index error: {message}")]
    Index {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Ontology description could not be loaded.
    #[error("Ontology error: {message}")]
    Ontology {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON-LD context could not be loaded.
    #[error("Context error: {message}")]
    Context { message: String, code: ErrorCode },

    /// A source record could not be converted.
    #[error("Conversion error: {message}")]
    Conversion {
        message: String,
        code: ErrorCode,
        entity_id: Option<String>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network error.
    #[error("Network error: {message}")]
    Network {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,

    // Entities (ENT_xxx)
    EntNotFound,

    // Index (IDX_xxx)
    IdxOperationFailed,
    IdxQueryFailed,

    // Ontology (ONT_xxx)
    OntLoadFailed,
    OntEmpty,

    // Context (CTX_xxx)
    CtxLoadFailed,
    CtxInvalid,

    // Conversion (CONV_xxx)
    ConvMissingId,
    ConvMissingNode,
    ConvMalformedNode,

    // Network (NET_xxx)
    NetTimeout,
    NetConnectionFailed,

    // Parse (PARSE_xxx)
    ParseInvalidJson,
    ParseInvalidRdf,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::EntNotFound => "ENT_001",
            ErrorCode::IdxOperationFailed => "IDX_002",
            ErrorCode::IdxQueryFailed => "IDX_003",
            ErrorCode::OntLoadFailed => "ONT_001",
            ErrorCode::OntEmpty => "ONT_002",
            ErrorCode::CtxLoadFailed => "CTX_001",
            ErrorCode::CtxInvalid => "CTX_002",
            ErrorCode::ConvMissingId => "CONV_001",
            ErrorCode::ConvMissingNode => "CONV_002",
            ErrorCode::ConvMalformedNode => "CONV_003",
            ErrorCode::NetTimeout => "NET_001",
            ErrorCode::NetConnectionFailed => "NET_002",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::ParseInvalidRdf => "PARSE_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl GndError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
        }
    }

    /// Create a not found error.
    pub fn not_found(entity_id: impl Into<String>) -> Self {
        let id = entity_id.into();
        Self::NotFound {
            message: format!("Entity with id '{}' not found", id),
            code: ErrorCode::EntNotFound,
            entity_id: Some(id),
        }
    }

    /// Create an index error.
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index {
            message: message.into(),
            code: ErrorCode::IdxOperationFailed,
            source: None,
        }
    }

    /// Create an index error for a rejected search query.
    pub fn index_query(message: impl Into<String>) -> Self {
        Self::Index {
            message: message.into(),
            code: ErrorCode::IdxQueryFailed,
            source: None,
        }
    }

    /// Create an ontology error.
    pub fn ontology(message: impl Into<String>) -> Self {
        Self::Ontology {
            message: message.into(),
            code: ErrorCode::OntLoadFailed,
            source: None,
        }
    }

    /// Create a context error.
    pub fn context(message: impl Into<String>) -> Self {
        Self::Context {
            message: message.into(),
            code: ErrorCode::CtxInvalid,
        }
    }

    /// Create a conversion error for a given entity.
    pub fn conversion(entity_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
            code: ErrorCode::ConvMalformedNode,
            entity_id: Some(entity_id.into()),
        }
    }

    /// Create a conversion error for a missing entity node.
    pub fn missing_node(entity_id: impl Into<String>) -> Self {
        let id = entity_id.into();
        Self::Conversion {
            message: format!("No node for '{}' in source graph", id),
            code: ErrorCode::ConvMissingNode,
            entity_id: Some(id),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Create an RDF parse error.
    pub fn rdf_parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidRdf,
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            code: ErrorCode::NetConnectionFailed,
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::Index { code, .. } => *code,
            Self::Ontology { code, .. } => *code,
            Self::Context { code, .. } => *code,
            Self::Conversion { code, .. } => *code,
            Self::Network { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::NotFound { .. } => Some("Please check the entity ID and ensure it is indexed"),
            Self::Index { .. } => Some("Please check your search index connection settings"),
            Self::Ontology { .. } => Some("Please check the ontology description file"),
            Self::Context { .. } => Some("Please check the JSON-LD context file"),
            _ => None,
        }
    }

    /// Convert from HTTP status code (for index backend errors).
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            400 => Self::Index {
                message: body.to_string(),
                code: ErrorCode::IdxQueryFailed,
                source: None,
            },
            404 => Self::NotFound {
                message: body.to_string(),
                code: ErrorCode::EntNotFound,
                entity_id: None,
            },
            408 | 504 => Self::Network {
                message: body.to_string(),
                code: ErrorCode::NetTimeout,
                source: None,
            },
            _ => Self::Index {
                message: format!("HTTP {}: {}", status, body),
                code: ErrorCode::IdxOperationFailed,
                source: None,
            },
        }
    }
}
