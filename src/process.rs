//! Run an [`IoPlan`] through the transform pipeline.
//!
//! Files are handled one at a time, in plan order:
//!
//! ```text
//! exists + Skip? ──yes──▶ Skipped
//!      │ no
//!      ▼
//! decode ─▶ standardize ─▶ encode (in memory) ─▶ write ─▶ Processed
//!    └────────────── any error ──────────────────────────▶ Failed
//! ```
//!
//! A failure is reported and the run moves on to the next file. Writes under
//! [`OverwritePolicy::Skip`] use `create_new`, so an output that appears
//! between the existence check and the write is still never replaced.

use crate::config::{ConfigError, ProcessingConfig, StyleConfig};
use crate::imaging::density::read_dpi;
use crate::imaging::{
    BackendError, EncodeParams, ImageBackend, RustBackend, TransformError, TransformParams,
    plan_encode, plan_transform, standardize,
};
use crate::plan::{IoPlan, OverwritePolicy, PlannedFile};
use image::GenericImageView;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{Level, debug, info, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Imaging(#[from] BackendError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// What happened to one planned file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Processed {
        input: PathBuf,
        output: PathBuf,
        width: u32,
        height: u32,
    },
    /// The output already existed and overwriting was not allowed.
    Skipped { input: PathBuf, output: PathBuf },
    Failed { input: PathBuf, error: String },
}

/// Outcomes of a run, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub outcomes: Vec<FileOutcome>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Processed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    /// True when nothing failed. Skips are not failures.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Result of a guarded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    /// The file existed and the policy was [`OverwritePolicy::Skip`].
    AlreadyExists,
}

/// Process a plan with the production backend.
///
/// Configuration errors abort before any file is touched; per-file errors are
/// reported through `report` and collected in the summary.
pub fn process(
    plan: &IoPlan,
    config: &ProcessingConfig,
    style: &StyleConfig,
    report: impl FnMut(&FileOutcome),
) -> Result<RunSummary, ConfigError> {
    process_with_backend(&RustBackend::new(), plan, config, style, report)
}

/// Process a plan using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    plan: &IoPlan,
    config: &ProcessingConfig,
    style: &StyleConfig,
    mut report: impl FnMut(&FileOutcome),
) -> Result<RunSummary, ConfigError> {
    config.validate()?;
    style.validate()?;
    let transform = plan_transform(config, style)?;
    let encode = plan_encode(config, style);

    let mut summary = RunSummary::default();
    for file in &plan.files {
        let outcome = process_file(backend, file, plan.overwrite, &transform, &encode);
        report(&outcome);
        summary.outcomes.push(outcome);
    }
    info!(
        processed = summary.processed(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        "run complete"
    );
    Ok(summary)
}

fn process_file(
    backend: &impl ImageBackend,
    file: &PlannedFile,
    overwrite: OverwritePolicy,
    transform: &TransformParams,
    encode: &EncodeParams,
) -> FileOutcome {
    let skipped = || FileOutcome::Skipped {
        input: file.input.clone(),
        output: file.output.clone(),
    };

    if overwrite == OverwritePolicy::Skip && file.output.exists() {
        info!(output = %file.output.display(), "output exists, skipping");
        return skipped();
    }

    info!(input = %file.input.display(), output = %file.output.display(), "processing");
    match standardize_file(backend, file, overwrite, transform, encode) {
        Ok((WriteStatus::Written, (width, height))) => FileOutcome::Processed {
            input: file.input.clone(),
            output: file.output.clone(),
            width,
            height,
        },
        Ok((WriteStatus::AlreadyExists, _)) => {
            info!(output = %file.output.display(), "output appeared during processing, skipping");
            skipped()
        }
        Err(e) => {
            warn!(input = %file.input.display(), error = %e, "failed to process");
            FileOutcome::Failed {
                input: file.input.clone(),
                error: e.to_string(),
            }
        }
    }
}

fn standardize_file(
    backend: &impl ImageBackend,
    file: &PlannedFile,
    overwrite: OverwritePolicy,
    transform: &TransformParams,
    encode: &EncodeParams,
) -> Result<(WriteStatus, (u32, u32)), ProcessError> {
    let image = backend.decode(&file.input)?;
    debug!(
        dimensions = ?image.dimensions(),
        color = ?image.color(),
        "decoded"
    );

    let standardized = standardize(&image, transform)?;
    drop(image);
    let dimensions = standardized.dimensions();

    let bytes = backend.encode(&standardized, encode)?;
    if tracing::enabled!(Level::DEBUG) {
        debug!(
            bytes = bytes.len(),
            format = %encode.format,
            dpi = ?read_dpi(&bytes, encode.format),
            "encoded"
        );
    }

    let status = write_output(&file.output, &bytes, overwrite)?;
    Ok((status, dimensions))
}

/// Write `bytes` to `path`, creating the parent directory.
///
/// Under [`OverwritePolicy::Skip`] the file is opened with `create_new`, so an
/// existing file is never truncated or touched.
pub fn write_output(
    path: &Path,
    bytes: &[u8],
    overwrite: OverwritePolicy,
) -> Result<WriteStatus, std::io::Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut options = OpenOptions::new();
    options.write(true);
    match overwrite {
        OverwritePolicy::Skip => options.create_new(true),
        OverwritePolicy::Overwrite => options.create(true).truncate(true),
    };

    let mut file = match options.open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Ok(WriteStatus::AlreadyExists);
        }
        Err(e) => return Err(e),
    };
    file.write_all(bytes)?;
    file.flush()?;
    Ok(WriteStatus::Written)
}
