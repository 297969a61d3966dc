//! Rasterizer capability
//!
//! External page rasterization behind a trait, so the pipeline can be
//! exercised without a renderer binary on the host. The production
//! implementation shells out to Ghostscript, one process per page range.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::GhostscriptConfig;

use super::types::{PageRange, RenderError, Result};

/// A renderer that produces one image file per page of a range
///
/// Output files must carry fixed-width, zero-padded page numbers so that
/// lexical order within the output directory equals page order.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Short name for logs and errors
    fn name(&self) -> &str;

    /// Whether the backing renderer can run on this host
    async fn is_available(&self) -> bool;

    /// Render the inclusive 1-based `pages` of `input` into `output_dir`
    ///
    /// Returns the number of page files produced.
    async fn render_range(
        &self,
        input: &Path,
        pages: PageRange,
        output_dir: &Path,
    ) -> Result<usize>;
}

/// Ghostscript-backed rasterizer producing grayscale PNG thumbnails
#[derive(Debug, Clone)]
pub struct GhostscriptRasterizer {
    binary: String,
    resolution: u32,
    downscale_factor: u32,
}

impl GhostscriptRasterizer {
    pub fn new(binary: impl Into<String>, resolution: u32, downscale_factor: u32) -> Self {
        Self {
            binary: binary.into(),
            resolution,
            downscale_factor,
        }
    }

    pub fn from_config(config: &GhostscriptConfig) -> Self {
        Self::new(
            config.binary.clone(),
            config.resolution,
            config.downscale_factor,
        )
    }

    fn build_args(&self, input: &Path, pages: PageRange, output_pattern: &Path) -> Vec<OsString> {
        let mut output_file = OsString::from("-sOutputFile=");
        output_file.push(output_pattern);

        vec![
            OsString::from("-sDEVICE=pnggray"),
            OsString::from(format!("-r{}", self.resolution)),
            OsString::from(format!("-dDownScaleFactor={}", self.downscale_factor)),
            OsString::from("-dTextAlphaBits=4"),
            OsString::from("-dGraphicsAlphaBits=4"),
            OsString::from(format!("-dFirstPage={}", pages.start)),
            OsString::from(format!("-dLastPage={}", pages.end)),
            OsString::from("-dBATCH"),
            OsString::from("-dNOPAUSE"),
            output_file,
            input.as_os_str().to_os_string(),
        ]
    }
}

#[async_trait]
impl Rasterizer for GhostscriptRasterizer {
    fn name(&self) -> &str {
        "ghostscript"
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn render_range(
        &self,
        input: &Path,
        pages: PageRange,
        output_dir: &Path,
    ) -> Result<usize> {
        let pattern = output_dir.join("page_%05d.png");

        let output = Command::new(&self.binary)
            .args(self.build_args(input, pages, &pattern))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                RenderError::Rasterizer(format!("failed to spawn {}: {}", self.binary, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Rasterizer(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        let mut produced = 0usize;
        let mut entries = tokio::fs::read_dir(output_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().is_some_and(|ext| ext == "png") {
                produced += 1;
            }
        }
        Ok(produced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_args_bind_the_page_range() {
        let gs = GhostscriptRasterizer::new("gs", 100, 4);
        let args = gs.build_args(
            Path::new("/books/doc.pdf"),
            PageRange::new(5, 7),
            &PathBuf::from("/tmp/w02/page_%05d.png"),
        );

        assert!(args.contains(&OsString::from("-dFirstPage=5")));
        assert!(args.contains(&OsString::from("-dLastPage=7")));
        assert!(args.contains(&OsString::from("-sOutputFile=/tmp/w02/page_%05d.png")));
        assert_eq!(args.last(), Some(&OsString::from("/books/doc.pdf")));
    }

    #[test]
    fn test_args_carry_render_settings() {
        let gs = GhostscriptRasterizer::new("gs", 150, 2);
        let args = gs.build_args(
            Path::new("in.pdf"),
            PageRange::new(1, 1),
            &PathBuf::from("out/page_%05d.png"),
        );

        assert!(args.contains(&OsString::from("-r150")));
        assert!(args.contains(&OsString::from("-dDownScaleFactor=2")));
        assert!(args.contains(&OsString::from("-dBATCH")));
        assert!(args.contains(&OsString::from("-dNOPAUSE")));
    }
}
