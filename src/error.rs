//! Error types for indexing/merging and for query-time retrieval.
//!
//! Split mirrors the two failure domains of the engine: building the index
//! (fatal, surfaced) versus answering a query (data-dependent "no match"
//! conditions are not errors at all).

use thiserror::Error;

/// Errors that can occur while building, writing, reading or merging an index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed postings stream: {0}")]
    MalformedPostings(String),

    #[error("index integrity error: {0}")]
    IndexIntegrity(String),

    #[error("merge order violation: term {got} seen after term {current}")]
    MergeOrderViolation { current: u32, got: u32 },

    #[error("duplicate term append: termID {0} was already written")]
    DuplicateTermAppend(u32),

    #[error("encoding overflow while encoding postings")]
    EncodingOverflow,
}

/// Errors that can occur while answering a query.
///
/// Unknown query terms and empty queries are *not* represented here: they are
/// legitimate "no match" outcomes and surface as an empty result list.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index integrity error: {0}")]
    IndexIntegrity(String),

    #[error("malformed postings stream: {0}")]
    MalformedPostings(String),
}

impl From<IndexError> for QueryError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Io(e) => QueryError::Io(e),
            IndexError::IndexIntegrity(s) => QueryError::IndexIntegrity(s),
            IndexError::MalformedPostings(s) => QueryError::MalformedPostings(s),
            other => QueryError::IndexIntegrity(other.to_string()),
        }
    }
}
