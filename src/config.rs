//! Configuration for the render pipeline

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::render::types::DEFAULT_WORKERS;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub render: RenderConfig,
    pub ghostscript: GhostscriptConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Maximum concurrent rasterizer workers
    pub workers: usize,
    /// Root for per-run scratch directories; system temp dir when unset
    pub scratch_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GhostscriptConfig {
    /// Ghostscript binary name or path
    pub binary: String,
    /// Render resolution in dpi
    pub resolution: u32,
    /// Integer downscale factor applied after rendering
    pub downscale_factor: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            render: RenderConfig {
                workers: DEFAULT_WORKERS,
                scratch_dir: None,
            },
            ghostscript: GhostscriptConfig {
                binary: "gs".to_string(),
                resolution: 100,
                downscale_factor: 4,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            render: RenderConfig {
                workers: env::var("RENDER_WORKERS")
                    .unwrap_or_else(|_| DEFAULT_WORKERS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_WORKERS),
                scratch_dir: env::var("RENDER_SCRATCH_DIR").ok().map(PathBuf::from),
            },
            ghostscript: GhostscriptConfig {
                binary: env::var("GS_BINARY").unwrap_or_else(|_| "gs".to_string()),
                resolution: env::var("GS_RESOLUTION")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()
                    .unwrap_or(100),
                downscale_factor: env::var("GS_DOWNSCALE_FACTOR")
                    .unwrap_or_else(|_| "4".to_string())
                    .parse()
                    .unwrap_or(4),
            },
        }
    }
}
