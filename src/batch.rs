use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::{BatchConfig, PipelineConfig};
use crate::detection::OrientationOutcome;
use crate::error::{PipelineError, Result};
use crate::frame::{load_image, save_image};
use crate::pipeline::{preprocess, NoopObserver};

/// One input file and where its result goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// A file or directory that could not be handled
#[derive(Debug, Clone)]
pub struct Failure {
    pub path: PathBuf,
    pub kind: &'static str,
    pub message: String,
}

impl Failure {
    fn from_error(path: &Path, err: &PipelineError) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: usize,
    /// Written unrotated because the detected tilt was too large
    pub needs_review: Vec<PathBuf>,
    pub failures: Vec<Failure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Mirrored output location: `<output_root>/<label>/<stem>.jpg`, the stem
/// being the file name up to its first dot.
pub fn output_path_for(output_root: &Path, label: &str, input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    output_root.join(label).join(format!("{}.jpg", stem))
}

/// List the files of every class directory, in file-name order.
///
/// Unreadable or missing class directories are returned as failures.
pub fn plan_jobs(batch: &BatchConfig) -> (Vec<Job>, Vec<Failure>) {
    let mut jobs = Vec::new();
    let mut failures = Vec::new();

    for label in &batch.class_labels {
        let class_dir = batch.input_root.join(label);
        let walker = WalkDir::new(&class_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    let input = entry.into_path();
                    let output = output_path_for(&batch.output_root, label, &input);
                    jobs.push(Job { input, output });
                }
                Ok(_) => {}
                Err(err) => {
                    let path = err.path().unwrap_or(&class_dir).to_path_buf();
                    failures.push(Failure {
                        path,
                        kind: "IOError",
                        message: err.to_string(),
                    });
                }
            }
        }
    }

    (jobs, failures)
}

/// Load, normalize and write a single image.
pub fn process_file(job: &Job, config: &PipelineConfig) -> Result<OrientationOutcome> {
    let frame = load_image(&job.input)?;
    let normalized = preprocess(&frame, config, &mut NoopObserver)?;

    if let Some(parent) = job.output.parent() {
        fs::create_dir_all(parent).map_err(|source| PipelineError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    save_image(&job.output, &normalized.frame)?;

    Ok(normalized.orientation)
}

/// Process every image of the dataset; a failing image never stops the run.
pub fn run_batch(batch: &BatchConfig, config: &PipelineConfig) -> BatchReport {
    let (jobs, failures) = plan_jobs(batch);
    let mut report = BatchReport {
        failures,
        ..BatchReport::default()
    };
    for failure in &report.failures {
        warn!(path = %failure.path.display(), kind = failure.kind, "{}", failure.message);
    }

    info!(images = jobs.len(), classes = batch.class_labels.len(), "Starting batch");

    for job in &jobs {
        match process_file(job, config) {
            Ok(outcome) => {
                info!(
                    input = %job.input.display(),
                    output = %job.output.display(),
                    ?outcome,
                    "Processed"
                );
                report.processed += 1;
                if outcome.needs_review() {
                    report.needs_review.push(job.input.clone());
                }
            }
            Err(err) => {
                warn!(path = %job.input.display(), kind = err.kind(), "{}", err);
                report.failures.push(Failure::from_error(&job.input, &err));
            }
        }
    }

    report
}
