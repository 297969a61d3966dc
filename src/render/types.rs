//! Render pipeline types

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::container::ContainerError;

/// Result type alias for render operations
pub type Result<T> = std::result::Result<T, RenderError>;

// ============================================================================
// Constants
// ============================================================================

/// Default rasterizer worker count
pub const DEFAULT_WORKERS: usize = 8;

// ============================================================================
// Job Types
// ============================================================================

/// Inclusive, 1-based page range assigned to one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u64,
    pub end: u64,
}

impl PageRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of pages in the range
    pub fn page_count(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// One rasterization job: a worker, its page range, and the private
/// output directory it alone writes into
///
/// Created once per pipeline run, consumed by exactly one worker, and
/// discarded after its output files are collected.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// 1-based worker id, used in errors and logs
    pub worker: usize,

    /// Pages this worker owns
    pub pages: PageRange,

    /// Exclusive output directory; no two jobs share one
    pub output_dir: PathBuf,
}

// ============================================================================
// Error Types
// ============================================================================

/// Render pipeline error types
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render worker {worker} failed for pages {start}-{end}: {message}")]
    WorkerFailed {
        worker: usize,
        start: u64,
        end: u64,
        message: String,
    },

    #[error("Rendered page count mismatch: expected {expected}, got {actual}")]
    PageCountMismatch { expected: u64, actual: u64 },

    #[error("Document has no pages")]
    EmptyDocument,

    #[error("Render cancelled")]
    Cancelled,

    #[error("Rasterizer error: {0}")]
    Rasterizer(String),

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
