//! Store failure taxonomy.

use thiserror::Error;

use khata_core::DomainError;

/// Failure at the persistence collaborator boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A read failed (network/HTTP/deserialization).
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// A write failed.
    #[error("update failed: {0}")]
    Update(String),

    /// The referenced record does not exist.
    #[error("record not found")]
    NotFound,

    /// The store rejected the request for a domain reason
    /// (validation, conflict, protected record).
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl StoreError {
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update(msg.into())
    }
}
