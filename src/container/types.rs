//! Container types
//!
//! In-memory records for the index map plus the container error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for container operations
pub type Result<T> = std::result::Result<T, ContainerError>;

// ============================================================================
// Index Types
// ============================================================================

/// One page's location inside a container
///
/// Ephemeral: owned by the reader for the lifetime of one call, or by the
/// writer while the map is assembled. Never persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    /// Absolute byte offset of the page's first byte, from file start
    pub offset: u64,

    /// Page length in bytes
    pub size: u64,
}

/// Parsed and validated index map of a container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerIndex {
    /// Number of pages in the container
    pub page_count: u64,

    /// Per-page entries, in page order
    pub entries: Vec<PageEntry>,
}

/// Summary of a completed container write
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WriteSummary {
    /// Pages written
    pub page_count: u64,

    /// Payload bytes streamed after the header and map
    pub payload_bytes: u64,

    /// Total container size on disk
    pub file_size: u64,
}

// ============================================================================
// Error Types
// ============================================================================

/// Container error types
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Invalid container magic")]
    BadMagic,

    #[error("Unsupported container version: {0}")]
    UnsupportedVersion(u8),

    #[error("Invalid index map size: {0}")]
    InvalidMapSize(u64),

    #[error("Malformed index map: map size {map_size} does not match page count {page_count}")]
    MalformedIndexMap { map_size: u64, page_count: u64 },

    #[error("Invalid page range: start {start} is past end {end}")]
    InvalidRange { start: u64, end: u64 },

    #[error("Page {page} not found (container has {page_count} pages)")]
    PageNotFound { page: u64, page_count: u64 },

    #[error("Page {page} is not addressable on this platform ({size} bytes)")]
    PageTooLarge { page: u64, size: u64 },

    #[error("Payload accounting mismatch: expected {expected} bytes, wrote {actual}")]
    PayloadMismatch { expected: u64, actual: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
