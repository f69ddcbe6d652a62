use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::detection::{
    decide_orientation, extract_contours, orientation_votes, shape_bounds, OrientationOutcome,
    OrientationVote,
};
use crate::error::{PipelineError, Result};
use crate::frame::Frame;
use crate::geometry::{derive_crop_region, BoundingBox, CropRegion};
use crate::transform::{apply_gamma, clahe, crop, resize_exact, rotate_same_canvas};

/// Which stage extracted a contour set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Orientation,
    Centering,
}

/// Optional hook for inspecting intermediate results, e.g. to draw them.
///
/// Every method has an empty default, so an observer only implements what it needs.
pub trait PipelineObserver {
    fn contours_found(&mut self, _stage: Stage, _count: usize) {}
    fn orientation_estimated(&mut self, _vote: &OrientationVote) {}
    fn orientation_decided(&mut self, _outcome: OrientationOutcome) {}
    fn crop_derived(&mut self, _bounds: &BoundingBox, _region: &CropRegion) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Result of normalizing one image
#[derive(Debug, Clone)]
pub struct Normalized {
    pub frame: Frame,
    pub orientation: OrientationOutcome,
    /// Region cut out of the rotated image
    pub crop: CropRegion,
}

/// Level the dominant shape when its tilt is small enough to trust.
pub fn correct_orientation(
    frame: &Frame,
    config: &PipelineConfig,
    observer: &mut dyn PipelineObserver,
) -> (Frame, OrientationOutcome) {
    let contours = extract_contours(frame, config.threshold_floor);
    observer.contours_found(Stage::Orientation, contours.len());

    let votes = orientation_votes(&contours, config);
    for vote in &votes {
        observer.orientation_estimated(vote);
    }
    debug!(
        contours = contours.len(),
        angles = ?votes.iter().map(OrientationVote::degrees).collect::<Vec<_>>(),
        "Orientation votes"
    );

    let outcome = decide_orientation(&votes, config.max_correction_degrees);
    observer.orientation_decided(outcome);

    let corrected = match outcome {
        OrientationOutcome::Rotated { degrees } if degrees != 0 => {
            rotate_same_canvas(frame, degrees as f64)
        }
        OrientationOutcome::NeedsReview { degrees } => {
            warn!(degrees, "Tilt too large to correct, leaving unrotated");
            frame.clone()
        }
        _ => frame.clone(),
    };

    (corrected, outcome)
}

/// Crop to the shapes' bounding box, padded toward a square.
///
/// Fails with [`PipelineError::EmptyShape`] when the frame has no contours.
pub fn center_on_shape(
    frame: &Frame,
    config: &PipelineConfig,
    observer: &mut dyn PipelineObserver,
) -> Result<(Frame, CropRegion)> {
    let contours = extract_contours(frame, config.threshold_floor);
    observer.contours_found(Stage::Centering, contours.len());

    let (bounds, basis) =
        shape_bounds(&contours, config.square_basis).ok_or(PipelineError::EmptyShape)?;

    let (width, height) = frame.dimensions();
    let region = derive_crop_region(&bounds, basis, width, height);
    observer.crop_derived(&bounds, &region);
    debug!(?bounds, ?region, "Crop region");

    Ok((crop(frame, &region), region))
}

/// Orientation correction followed by square centering.
pub fn process(frame: &Frame, config: &PipelineConfig) -> Result<Normalized> {
    process_with_observer(frame, config, &mut NoopObserver)
}

pub fn process_with_observer(
    frame: &Frame,
    config: &PipelineConfig,
    observer: &mut dyn PipelineObserver,
) -> Result<Normalized> {
    let (rotated, orientation) = correct_orientation(frame, config, observer);
    let (frame, crop) = center_on_shape(&rotated, config, observer)?;
    Ok(Normalized {
        frame,
        orientation,
        crop,
    })
}

/// The whole per-image chain: brighten, CLAHE, [`process`], resize.
pub fn preprocess(
    frame: &Frame,
    config: &PipelineConfig,
    observer: &mut dyn PipelineObserver,
) -> Result<Normalized> {
    let brightened = apply_gamma(frame, config.gamma);
    let equalized = Frame::Gray(clahe(
        &brightened.to_gray(),
        config.clahe_clip_limit,
        config.clahe_tiles,
    ));

    let normalized = process_with_observer(&equalized, config, observer)?;
    let size = config.output_size;
    Ok(Normalized {
        frame: resize_exact(&normalized.frame, size, size),
        ..normalized
    })
}
