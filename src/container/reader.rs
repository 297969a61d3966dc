//! Container reader
//!
//! Validates the header and index map, then serves pages through
//! positional reads against the offset table. The map is fully
//! materialized before the first page read; no call ever scans the
//! payload. Each call surfaces at most one error and never returns a
//! partial result.
//!
//! Containers are immutable once published, so concurrent readers need no
//! locking; every call opens its own file handle.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use super::layout;
use super::types::{ContainerError, ContainerIndex, PageEntry, Result};

/// Read an entire container file verbatim
///
/// No header interpretation; used when the raw container is wanted for
/// transport rather than page access.
pub fn read_full(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

/// Read the page count without parsing the entry table
pub fn read_page_count(path: impl AsRef<Path>) -> Result<u64> {
    let mut file = File::open(path)?;
    let map_size = read_header(&mut file)?;

    let mut count = [0u8; layout::PAGE_COUNT_LEN];
    file.read_exact(&mut count)?;
    let page_count = u64::from_le_bytes(count);

    if !map_matches(map_size, page_count) {
        return Err(ContainerError::MalformedIndexMap {
            map_size,
            page_count,
        });
    }
    Ok(page_count)
}

/// Read and validate the full index map
pub fn read_index(path: impl AsRef<Path>) -> Result<ContainerIndex> {
    let mut file = File::open(path)?;
    read_index_from(&mut file)
}

/// Read one page's raw bytes (0-based), without framing
pub fn read_page(path: impl AsRef<Path>, page: u64) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let index = read_index_from(&mut file)?;

    if page >= index.page_count {
        return Err(ContainerError::PageNotFound {
            page,
            page_count: index.page_count,
        });
    }
    read_entry(&mut file, page, index.entries[page as usize])
}

/// Read an inclusive 0-based page range
///
/// Output framing: for each selected page, an 8-byte big-endian size
/// header followed by the page's raw bytes, in page order. `end` is
/// clamped to the last page; a `start` at or past the page count is an
/// error.
pub fn read_range(path: impl AsRef<Path>, start: u64, end: u64) -> Result<Vec<u8>> {
    if end < start {
        return Err(ContainerError::InvalidRange { start, end });
    }

    let mut file = File::open(path)?;
    let index = read_index_from(&mut file)?;

    if start >= index.page_count {
        return Err(ContainerError::PageNotFound {
            page: start,
            page_count: index.page_count,
        });
    }
    let end = end.min(index.page_count - 1);

    let mut out = Vec::new();
    for page in start..=end {
        let entry = index.entries[page as usize];
        let bytes = read_entry(&mut file, page, entry)?;
        out.extend_from_slice(&entry.size.to_be_bytes());
        out.extend_from_slice(&bytes);
    }
    Ok(out)
}

// ============================================================================
// Parsing
// ============================================================================

/// Validate magic and version, returning the declared map size
fn read_header(file: &mut File) -> Result<u64> {
    file.seek(SeekFrom::Start(0))?;

    let mut magic = [0u8; layout::MAGIC_LEN];
    file.read_exact(&mut magic)?;
    if magic != layout::MAGIC {
        return Err(ContainerError::BadMagic);
    }

    let mut version = [0u8; layout::VERSION_LEN];
    file.read_exact(&mut version)?;
    if version[0] != layout::FORMAT_VERSION {
        return Err(ContainerError::UnsupportedVersion(version[0]));
    }

    let mut map_size = [0u8; layout::MAP_SIZE_LEN];
    file.read_exact(&mut map_size)?;
    let map_size = u64::from_le_bytes(map_size);

    if map_size < layout::PAGE_COUNT_LEN as u64 || map_size > i64::MAX as u64 {
        return Err(ContainerError::InvalidMapSize(map_size));
    }
    Ok(map_size)
}

/// Parse the whole index map, verifying the declared map size against the
/// declared page count before trusting any offset
fn read_index_from(file: &mut File) -> Result<ContainerIndex> {
    let map_size = read_header(file)?;

    let mut map = vec![0u8; map_size as usize];
    file.read_exact(&mut map)?;

    let page_count = u64_le(&map[..layout::PAGE_COUNT_LEN]);
    if !map_matches(map_size, page_count) {
        return Err(ContainerError::MalformedIndexMap {
            map_size,
            page_count,
        });
    }

    let mut entries = Vec::with_capacity(page_count as usize);
    let mut pos = layout::PAGE_COUNT_LEN;
    for _ in 0..page_count {
        let offset = u64_le(&map[pos..pos + 8]);
        let size = u64_le(&map[pos + 8..pos + 16]);
        entries.push(PageEntry { offset, size });
        pos += layout::INDEX_ENTRY_LEN;
    }

    Ok(ContainerIndex {
        page_count,
        entries,
    })
}

/// Positional read of exactly one entry; a short read is an error
fn read_entry(file: &mut File, page: u64, entry: PageEntry) -> Result<Vec<u8>> {
    if entry.offset > i64::MAX as u64
        || entry.size > i64::MAX as u64
        || entry.offset.checked_add(entry.size).is_none()
    {
        return Err(ContainerError::PageTooLarge {
            page,
            size: entry.size,
        });
    }
    let size = usize::try_from(entry.size).map_err(|_| ContainerError::PageTooLarge {
        page,
        size: entry.size,
    })?;

    let mut buf = vec![0u8; size];
    file.seek(SeekFrom::Start(entry.offset))?;
    file.read_exact(&mut buf)?;
    Ok(buf)
}

/// `map_size == 8 + page_count * 16`, checked without overflow
fn map_matches(map_size: u64, page_count: u64) -> bool {
    let body = map_size - layout::PAGE_COUNT_LEN as u64;
    body % layout::INDEX_ENTRY_LEN as u64 == 0
        && body / layout::INDEX_ENTRY_LEN as u64 == page_count
}

fn u64_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

// ============================================================================
// Tests
// ============================================================================
