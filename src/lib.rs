//! Folio
//!
//! Page-indexed binary containers for rendered document pages, plus the
//! concurrent pipeline that produces them from a source document.
//!
//! A container holds one ordered sequence of opaque page blobs behind an
//! up-front offset table, so any page or contiguous page range can be
//! served with positional reads and no scanning. Containers are immutable
//! once written; regeneration produces a new file.
//!
//! # Modules
//!
//! - `container`: On-disk layout, reader, and writer for container files
//! - `render`: Page partitioning, the rasterizer capability, and the
//!   worker pipeline that assembles containers
//! - `config`: Environment-backed configuration

pub mod config;
pub mod container;
pub mod render;

pub use config::Config;
pub use container::{ContainerError, ContainerIndex, ContainerWriter, PageEntry, WriteSummary};
pub use render::{GhostscriptRasterizer, PageRange, Rasterizer, RenderError, RenderPipeline};
