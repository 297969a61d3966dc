//! On-disk layout
//!
//! Single source of truth for the container header and index map sizes.
//! Any change to these values is a format-breaking change and must bump
//! [`FORMAT_VERSION`].

/// File signature: `FOL\n`
pub const MAGIC: [u8; 4] = [0x46, 0x4F, 0x4C, 0x0A];

/// Current (and only supported) format version
pub const FORMAT_VERSION: u8 = 0x01;

/// Width of the magic signature
pub const MAGIC_LEN: usize = 4;

/// Width of the version byte
pub const VERSION_LEN: usize = 1;

/// Width of the little-endian map-size field
pub const MAP_SIZE_LEN: usize = 8;

/// Fixed bytes before the index map: magic + version + map-size field
pub const HEADER_LEN: usize = MAGIC_LEN + VERSION_LEN + MAP_SIZE_LEN;

/// Width of the leading page-count field of the index map
pub const PAGE_COUNT_LEN: usize = 8;

/// Width of one `(offset, size)` index entry
pub const INDEX_ENTRY_LEN: usize = 16;

/// Byte length of the index map for `page_count` pages
pub fn map_size(page_count: u64) -> u64 {
    PAGE_COUNT_LEN as u64 + page_count * INDEX_ENTRY_LEN as u64
}

/// Absolute offset of the first payload byte, given the map size
pub fn payload_start(map_size: u64) -> u64 {
    HEADER_LEN as u64 + map_size
}
