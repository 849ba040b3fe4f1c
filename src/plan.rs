//! Resolve the I/O plan for a run.
//!
//! Turns the `--input/--output/--outdir` choices into a list of
//! `(input, output)` pairs plus an overwrite policy. Nothing here touches
//! pixel data, and nothing is written; the output directory is created by the
//! runner when the first file lands in it.
//!
//! ## Naming
//!
//! ```text
//! screenshots/login.png  --size medium --format png
//!   → processed-screenshots/login_medium.png
//! screenshots/chart.jpeg --size large --format jpg
//!   → processed-screenshots/chart_large.jpg
//! ```
//!
//! Inputs that would land on the same output (`a.jpg` and `a.png`) keep their
//! source extension in the name instead: `a_jpg_medium.png`, `a_png_medium.png`.
//! Names are compared case-insensitively.

use crate::config::{ConfigError, OutputFormat, SizePreset};
use crate::imaging::is_supported_input;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub const DEFAULT_OUTDIR: &str = "processed-screenshots";

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("input not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("no image files found in directory: {}", .0.display())]
    NoImages(PathBuf),
    #[error("{} and {} would both be written to {}", .first.display(), .second.display(), .output.display())]
    OutputCollision {
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
    },
}

/// What to do when an output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Leave the existing file alone and report a skip.
    #[default]
    Skip,
    /// Replace it (`--force`).
    Overwrite,
}

impl OverwritePolicy {
    pub fn from_force(force: bool) -> Self {
        if force {
            OverwritePolicy::Overwrite
        } else {
            OverwritePolicy::Skip
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Resolved list of files to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoPlan {
    pub files: Vec<PlannedFile>,
    pub overwrite: OverwritePolicy,
}

/// Raw path choices from the command line.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub input: PathBuf,
    /// Explicit output file; single-file input only.
    pub output: Option<PathBuf>,
    pub outdir: PathBuf,
    pub size: SizePreset,
    pub format: OutputFormat,
    pub force: bool,
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// `<stem>_<preset>.<ext>`
pub fn output_file_name(input: &Path, size: SizePreset, format: OutputFormat) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| "image".into());
    format!("{}_{}.{}", stem, size.name(), format.extension())
}

/// `<stem>_<source ext>_<preset>.<ext>`, for inputs whose plain names collide.
pub fn disambiguated_file_name(input: &Path, size: SizePreset, format: OutputFormat) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| "image".into());
    let source_ext = input
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    format!("{}_{}_{}.{}", stem, source_ext, size.name(), format.extension())
}

/// Pair every input with an output in `outdir`, keeping outputs distinct.
fn assign_outputs(
    inputs: Vec<PathBuf>,
    outdir: &Path,
    size: SizePreset,
    format: OutputFormat,
) -> Result<Vec<PlannedFile>, PlanError> {
    let plain: Vec<String> = inputs
        .iter()
        .map(|input| output_file_name(input, size, format))
        .collect();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for name in &plain {
        *counts.entry(name.to_lowercase()).or_default() += 1;
    }

    let mut claimed: HashMap<String, PathBuf> = HashMap::new();
    let mut files = Vec::with_capacity(inputs.len());
    for (input, name) in inputs.into_iter().zip(plain) {
        let name = if counts[&name.to_lowercase()] > 1 {
            disambiguated_file_name(&input, size, format)
        } else {
            name
        };
        let output = outdir.join(&name);
        if let Some(first) = claimed.insert(name.to_lowercase(), input.clone()) {
            return Err(PlanError::OutputCollision {
                first,
                second: input,
                output,
            });
        }
        files.push(PlannedFile { input, output });
    }
    Ok(files)
}

/// Supported image files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>, PlanError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && is_supported_input(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Build the plan for a request.
pub fn resolve_plan(request: &PlanRequest) -> Result<IoPlan, PlanError> {
    let input = expand_home(&request.input);
    let outdir = expand_home(&request.outdir);
    let overwrite = OverwritePolicy::from_force(request.force);

    if input.is_dir() {
        if request.output.is_some() {
            return Err(ConfigError::Validation(
                "--output can only be used with a single input file; use --outdir for directories"
                    .into(),
            )
            .into());
        }
        let inputs = discover_images(&input)?;
        if inputs.is_empty() {
            return Err(PlanError::NoImages(input));
        }
        let files = assign_outputs(inputs, &outdir, request.size, request.format)?;
        return Ok(IoPlan { files, overwrite });
    }

    if !input.is_file() {
        return Err(PlanError::NotFound(input));
    }
    let output = match &request.output {
        Some(path) => expand_home(path),
        None => outdir.join(output_file_name(&input, request.size, request.format)),
    };
    Ok(IoPlan {
        files: vec![PlannedFile { input, output }],
        overwrite,
    })
}
