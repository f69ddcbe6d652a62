use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, Contour};
use imageproc::contrast::otsu_level;
use imageproc::point::Point;

use crate::config::{PipelineConfig, SquareBasis};
use crate::frame::Frame;
use crate::geometry::{estimate_orientation, BoundingBox, OrientationEstimate};

/// Binarize with Otsu's level, never below `floor`. Foreground is 255.
pub fn binarize(gray: &GrayImage, floor: u8) -> GrayImage {
    let level = otsu_level(gray).max(floor);
    let mut bw = gray.clone();
    for p in bw.pixels_mut() {
        *p = if p[0] > level { Luma([255]) } else { Luma([0]) };
    }
    bw
}

/// Every outer and hole border of the frame's foreground, full point lists,
/// in raster discovery order
pub fn extract_contours(frame: &Frame, threshold_floor: u8) -> Vec<Contour<i32>> {
    let bw = binarize(&frame.to_gray(), threshold_floor);
    find_contours::<i32>(&bw)
}

/// Area enclosed by a closed polyline (shoelace formula)
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();

    twice.abs() as f64 / 2.0
}

/// One contour that took part in orientation voting
#[derive(Debug, Clone)]
pub struct OrientationVote {
    /// Position of the contour in extraction order
    pub index: usize,
    pub area: f64,
    pub estimate: OrientationEstimate,
}

impl OrientationVote {
    pub fn degrees(&self) -> i32 {
        self.estimate.whole_degrees()
    }
}

/// Estimate the orientation of every contour whose area is in range
pub fn orientation_votes(contours: &[Contour<i32>], config: &PipelineConfig) -> Vec<OrientationVote> {
    contours
        .iter()
        .enumerate()
        .filter_map(|(index, contour)| {
            let area = contour_area(&contour.points);
            if !config.accepts_area(area) {
                return None;
            }
            estimate_orientation(&contour.points).map(|estimate| OrientationVote {
                index,
                area,
                estimate,
            })
        })
        .collect()
}

/// Smallest-magnitude angle; among equal magnitudes the earliest wins
pub fn select_rotation(angles: &[i32]) -> Option<i32> {
    let mut sorted = angles.to_vec();
    // stable sort keeps extraction order for +a / -a ties
    sorted.sort_by_key(|a| a.abs());
    sorted.first().copied()
}

/// What the orientation stage decided for one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationOutcome {
    /// No contour passed the area filter
    NoCandidates,
    /// The image was rotated by this many degrees
    Rotated { degrees: i32 },
    /// The smallest angle was too large to correct; left as-is for manual review
    NeedsReview { degrees: i32 },
}

impl OrientationOutcome {
    pub fn needs_review(&self) -> bool {
        matches!(self, OrientationOutcome::NeedsReview { .. })
    }
}

pub fn decide_orientation(votes: &[OrientationVote], max_correction_degrees: i32) -> OrientationOutcome {
    let angles: Vec<i32> = votes.iter().map(OrientationVote::degrees).collect();
    match select_rotation(&angles) {
        None => OrientationOutcome::NoCandidates,
        Some(degrees) if degrees.abs() < max_correction_degrees => {
            OrientationOutcome::Rotated { degrees }
        }
        Some(degrees) => OrientationOutcome::NeedsReview { degrees },
    }
}

/// Union box of all contours plus the (width, height) that picks the padded axis.
///
/// `None` when there are no contours.
pub fn shape_bounds(contours: &[Contour<i32>], basis: SquareBasis) -> Option<(BoundingBox, (i64, i64))> {
    let boxes: Vec<BoundingBox> = contours
        .iter()
        .filter_map(|c| BoundingBox::of_points(&c.points))
        .collect();

    let last = boxes.last()?;
    let union = boxes.iter().fold(*last, |acc, b| acc.union(b));

    let dims = match basis {
        SquareBasis::Union => (union.width(), union.height()),
        SquareBasis::LastContour => (last.width(), last.height()),
    };

    Some((union, dims))
}
