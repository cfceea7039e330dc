//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent container misuse and catalog rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("container is empty")]
    EmptyContainer,

    #[error("category not found: {0}")]
    CategoryNotFound(String),

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("borrower not found: {name} (ID: {id})")]
    BorrowerNotFound { name: String, id: String },

    #[error("category node no longer exists")]
    StaleNode,

    #[error("item no longer exists")]
    StaleItem,

    #[error("cannot remove or rename the root category")]
    RootViolation,

    #[error("category already exists: {0}")]
    DuplicateCategory(String),

    #[error("invalid category name: '{0}'")]
    InvalidCategoryName(String),

    #[error("cannot move category '{from}' into its own subtree '{to}'")]
    InvalidMove { from: String, to: String },

    #[error("no copies of '{0}' available")]
    NoCopiesAvailable(String),

    #[error("{name} (ID: {id}) is not a current borrower of '{title}'")]
    NotBorrowedBy {
        title: String,
        name: String,
        id: String,
    },

    #[error("'{title}': {available} available plus {on_loan} on loan exceeds {total} total copies")]
    InvalidCopies {
        title: String,
        available: u32,
        on_loan: u32,
        total: u32,
    },

    #[error("aggregate count {count} cannot take delta {delta}")]
    CountUnderflow { count: usize, delta: isize },

    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
