//! Container writer
//!
//! Assembles a container from an ordered list of page files. A stat pass
//! sizes the index map up front, then header, map, and payload are
//! streamed in one pass. The running payload offset is checked against
//! the precomputed end-of-payload sentinel after the last page; on any
//! mismatch the destination must not be treated as valid.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::layout;
use super::types::{ContainerError, PageEntry, Result, WriteSummary};

/// Streams ordered page files into a container at a fixed destination
pub struct ContainerWriter {
    dest: PathBuf,
}

impl ContainerWriter {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self { dest: dest.into() }
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Write all pages, in the given order, as one container
    ///
    /// Each source page file is removed as soon as its bytes have been
    /// copied, bounding transient disk use for documents with many pages.
    /// The destination is only valid if this returns `Ok`.
    pub fn write_pages(&self, pages: &[PathBuf]) -> Result<WriteSummary> {
        let page_count = pages.len() as u64;

        let mut sizes = Vec::with_capacity(pages.len());
        for page in pages {
            sizes.push(fs::metadata(page)?.len());
        }

        let map_size = layout::map_size(page_count);
        let payload_start = layout::payload_start(map_size);

        let mut entries = Vec::with_capacity(pages.len());
        let mut next_offset = payload_start;
        for &size in &sizes {
            entries.push(PageEntry {
                offset: next_offset,
                size,
            });
            next_offset += size;
        }
        // Where the payload must end if every page writes exactly its
        // statted size.
        let payload_end = next_offset;

        let mut out = BufWriter::new(File::create(&self.dest)?);

        out.write_all(&layout::MAGIC)?;
        out.write_all(&[layout::FORMAT_VERSION])?;
        out.write_all(&map_size.to_le_bytes())?;
        out.write_all(&page_count.to_le_bytes())?;
        for entry in &entries {
            out.write_all(&entry.offset.to_le_bytes())?;
            out.write_all(&entry.size.to_le_bytes())?;
        }

        let mut payload_bytes: u64 = 0;
        for (page, entry) in pages.iter().zip(&entries) {
            let mut src = File::open(page)?;
            let copied = io::copy(&mut src, &mut out)?;
            drop(src);

            if copied != entry.size {
                return Err(ContainerError::PayloadMismatch {
                    expected: entry.size,
                    actual: copied,
                });
            }
            fs::remove_file(page)?;
            payload_bytes += copied;
        }
        out.flush()?;

        if payload_start + payload_bytes != payload_end {
            return Err(ContainerError::PayloadMismatch {
                expected: payload_end,
                actual: payload_start + payload_bytes,
            });
        }

        Ok(WriteSummary {
            page_count,
            payload_bytes,
            file_size: payload_end,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::reader;
    use tempfile::TempDir;

    fn page_body(page: u64) -> Vec<u8> {
        format!("page-{page}-{}", "y".repeat(page as usize * 7)).into_bytes()
    }

    /// Write page files 1..=n into `dir`, returning their ordered paths
    fn write_page_files(dir: &TempDir, n: u64) -> Vec<PathBuf> {
        (1..=n)
            .map(|page| {
                let path = dir.path().join(format!("page_{page:05}.png"));
                fs::write(&path, page_body(page)).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_round_trip_preserves_page_bytes() {
        let dir = TempDir::new().unwrap();
        let pages = write_page_files(&dir, 6);
        let dest = dir.path().join("doc.folio");

        let summary = ContainerWriter::new(&dest).write_pages(&pages).unwrap();
        assert_eq!(summary.page_count, 6);

        let out = reader::read_range(&dest, 0, 5).unwrap();
        let mut expected = Vec::new();
        for page in 1..=6u64 {
            let body = page_body(page);
            expected.extend_from_slice(&(body.len() as u64).to_be_bytes());
            expected.extend_from_slice(&body);
        }
        assert_eq!(out, expected);
    }

    #[test]
    fn test_written_map_satisfies_layout_invariants() {
        let dir = TempDir::new().unwrap();
        let pages = write_page_files(&dir, 5);
        let dest = dir.path().join("doc.folio");

        ContainerWriter::new(&dest).write_pages(&pages).unwrap();

        let index = reader::read_index(&dest).unwrap();
        assert_eq!(index.page_count, 5);
        assert_eq!(
            index.entries[0].offset,
            layout::payload_start(layout::map_size(5))
        );
        for pair in index.entries.windows(2) {
            assert_eq!(pair[0].offset + pair[0].size, pair[1].offset);
        }

        let file_size = fs::metadata(&dest).unwrap().len();
        let payload: u64 = index.entries.iter().map(|e| e.size).sum();
        assert_eq!(
            file_size,
            layout::payload_start(layout::map_size(5)) + payload
        );
    }

    #[test]
    fn test_source_pages_are_removed_after_copy() {
        let dir = TempDir::new().unwrap();
        let pages = write_page_files(&dir, 3);
        let dest = dir.path().join("doc.folio");

        ContainerWriter::new(&dest).write_pages(&pages).unwrap();

        for page in &pages {
            assert!(!page.exists(), "{} should be consumed", page.display());
        }
    }

    #[test]
    fn test_summary_accounts_for_every_byte() {
        let dir = TempDir::new().unwrap();
        let pages = write_page_files(&dir, 4);
        let expected_payload: u64 = (1..=4u64).map(|p| page_body(p).len() as u64).sum();
        let dest = dir.path().join("doc.folio");

        let summary = ContainerWriter::new(&dest).write_pages(&pages).unwrap();

        assert_eq!(summary.payload_bytes, expected_payload);
        assert_eq!(summary.file_size, fs::metadata(&dest).unwrap().len());
    }

    #[test]
    fn test_missing_source_page_fails() {
        let dir = TempDir::new().unwrap();
        let mut pages = write_page_files(&dir, 2);
        pages.push(dir.path().join("page_99999.png"));
        let dest = dir.path().join("doc.folio");

        let err = ContainerWriter::new(&dest).write_pages(&pages).unwrap_err();
        assert!(matches!(err, ContainerError::Io(_)));
    }
}
