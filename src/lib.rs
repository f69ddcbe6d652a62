pub mod batch;
pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod pipeline;
pub mod transform;

#[cfg(test)]
mod test_utils;

pub use batch::{plan_jobs, process_file, run_batch, BatchReport, Failure, Job};
pub use cli::Cli;
pub use config::{BatchConfig, PipelineConfig, SquareBasis};
pub use detection::{extract_contours, OrientationOutcome, OrientationVote};
pub use error::PipelineError;
pub use frame::{load_image, save_image, Frame};
pub use geometry::{estimate_orientation, BoundingBox, CropRegion, OrientationEstimate};
pub use pipeline::{
    correct_orientation, center_on_shape, preprocess, process, process_with_observer,
    Normalized, NoopObserver, PipelineObserver, Stage,
};
