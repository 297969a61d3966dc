//! Page container format
//!
//! A container persists the rendered pages of one document as a single
//! binary file: a fixed header, an up-front index map of per-page
//! `(offset, size)` entries, then the concatenated page payload. The map
//! is what makes page access O(1): every read goes through the offset
//! table, never a scan.
//!
//! # Architecture
//!
//! - [`layout`]: On-disk layout constants and the invariants binding them
//! - [`reader`]: Header/index validation and positional page reads
//! - [`writer`]: Index computation and streamed container assembly

pub mod layout;
pub mod reader;
pub mod types;
pub mod writer;

pub use types::{ContainerError, ContainerIndex, PageEntry, Result, WriteSummary};
pub use writer::ContainerWriter;
