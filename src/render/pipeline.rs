//! Render pipeline
//!
//! Drives a bounded pool of rasterizer workers over disjoint page ranges,
//! then reassembles their output into a single container. Rasterization
//! is concurrent; collection, ordering, and assembly are strictly
//! sequential because global page order is a correctness invariant, not a
//! performance concern.
//!
//! The pipeline is all-or-nothing: the container is staged under a
//! temporary name and only renamed onto the destination after the
//! writer's payload integrity check passes, so no failure mode leaves a
//! file at the destination claiming to be valid.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::Config;
use crate::container::ContainerWriter;

use super::partition::partition;
use super::rasterizer::Rasterizer;
use super::types::{RenderError, RenderJob, Result};

/// Concurrent page-render pipeline over a [`Rasterizer`]
pub struct RenderPipeline {
    workers: usize,
    scratch_dir: Option<PathBuf>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl RenderPipeline {
    pub fn new(config: &Config, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            workers: config.render.workers,
            scratch_dir: config.render.scratch_dir.clone(),
            rasterizer,
        }
    }

    /// Render every page of `input` and publish a container at `dest`
    ///
    /// `page_count` comes from the caller's page-count probe. On success
    /// the returned path equals `dest`; on any error nothing exists at
    /// `dest`.
    pub async fn render_to_container(
        &self,
        input: &Path,
        page_count: u64,
        dest: &Path,
    ) -> Result<PathBuf> {
        if page_count == 0 {
            return Err(RenderError::EmptyDocument);
        }

        let run_id = Uuid::new_v4();
        let started = Instant::now();
        tracing::info!(
            run_id = %run_id,
            input = %input.display(),
            page_count,
            rasterizer = self.rasterizer.name(),
            "render run started"
        );

        let scratch = self.create_scratch()?;
        let jobs = plan_jobs(scratch.path(), page_count, self.workers);
        tracing::debug!(run_id = %run_id, jobs = jobs.len(), "pages partitioned");

        self.run_jobs(input, &jobs).await?;

        let pages = collect_job_output(&jobs).await?;
        if pages.len() as u64 != page_count {
            return Err(RenderError::PageCountMismatch {
                expected: page_count,
                actual: pages.len() as u64,
            });
        }

        let staging = staging_path(dest);
        let writer = ContainerWriter::new(&staging);
        let summary = match tokio::task::spawn_blocking(move || writer.write_pages(&pages))
            .await
            .map_err(|e| RenderError::Io(std::io::Error::other(e)))?
        {
            Ok(summary) => summary,
            Err(err) => {
                // Never leave a half-written staging file next to the
                // destination.
                let _ = tokio::fs::remove_file(&staging).await;
                return Err(err.into());
            }
        };

        if let Err(err) = tokio::fs::rename(&staging, dest).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err.into());
        }

        tracing::info!(
            run_id = %run_id,
            dest = %dest.display(),
            pages = summary.page_count,
            payload_bytes = summary.payload_bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "render run complete"
        );
        Ok(dest.to_path_buf())
    }

    fn create_scratch(&self) -> Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("folio-");
        let dir = match &self.scratch_dir {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    /// Run every job to completion, reporting the first failure
    ///
    /// Errors are aggregated through a channel bounded by the job count,
    /// so sends never block; the first error cancels the token and wins.
    /// Every task is joined before returning, so a failure never leaks
    /// running workers.
    async fn run_jobs(&self, input: &Path, jobs: &[RenderJob]) -> Result<()> {
        let cancel = CancellationToken::new();
        let (err_tx, mut err_rx) = mpsc::channel::<RenderError>(jobs.len());

        let mut pool = JoinSet::new();
        for job in jobs {
            let job = job.clone();
            let input = input.to_path_buf();
            let rasterizer = Arc::clone(&self.rasterizer);
            let cancel = cancel.clone();
            let err_tx = err_tx.clone();

            pool.spawn(async move {
                let result = tokio::select! {
                    _ = cancel.cancelled() => Err(RenderError::Cancelled),
                    result = run_job(rasterizer.as_ref(), &input, &job) => result,
                };
                if let Err(err) = result {
                    if !matches!(err, RenderError::Cancelled) {
                        tracing::warn!(
                            worker = job.worker,
                            pages = %job.pages,
                            error = %err,
                            "render worker failed"
                        );
                        let _ = err_tx.try_send(err);
                        cancel.cancel();
                    }
                }
            });
        }
        drop(err_tx);

        while pool.join_next().await.is_some() {}

        match err_rx.recv().await {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Turn the page partition into jobs with exclusive output directories
fn plan_jobs(scratch: &Path, page_count: u64, workers: usize) -> Vec<RenderJob> {
    partition(page_count, workers)
        .into_iter()
        .enumerate()
        .map(|(i, pages)| RenderJob {
            worker: i + 1,
            pages,
            output_dir: scratch.join(format!("w{:02}", i + 1)),
        })
        .collect()
}

/// Rasterize one job's range into its own directory
async fn run_job(rasterizer: &dyn Rasterizer, input: &Path, job: &RenderJob) -> Result<()> {
    tokio::fs::create_dir_all(&job.output_dir)
        .await
        .map_err(|e| worker_error(job, format!("failed to create worker dir: {e}")))?;

    let expected = job.pages.page_count();
    let produced = rasterizer
        .render_range(input, job.pages, &job.output_dir)
        .await
        .map_err(|err| worker_error(job, err.to_string()))?;

    if produced as u64 != expected {
        return Err(worker_error(
            job,
            format!("produced {produced} page files, expected {expected}"),
        ));
    }
    Ok(())
}

fn worker_error(job: &RenderJob, message: String) -> RenderError {
    RenderError::WorkerFailed {
        worker: job.worker,
        start: job.pages.start,
        end: job.pages.end,
        message,
    }
}

/// Gather every job's output into one globally ordered page list
///
/// Lexical order equals page order within one worker's directory, and
/// worker ranges are monotonic by construction, so appending per-worker
/// sorted listings yields the global page order without a numeric sort.
async fn collect_job_output(jobs: &[RenderJob]) -> Result<Vec<PathBuf>> {
    let mut pages = Vec::new();
    for job in jobs {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&job.output_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.path());
            }
        }
        names.sort();
        pages.extend(names);
    }
    Ok(pages)
}

/// Staging name beside the destination, so the final publish is a rename
/// on the same filesystem
fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    dest.with_file_name(name)
}

// ============================================================================
// Tests
// ============================================================================
