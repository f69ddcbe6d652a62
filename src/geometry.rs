use imageproc::point::Point;
use nalgebra::{Matrix2, SymmetricEigen, Vector2};

/// Principal-axis description of a point set.
#[derive(Debug, Clone)]
pub struct OrientationEstimate {
    /// Angle of the dominant axis in radians, image coordinates (y down)
    pub angle: f64,
    /// Centroid of the points
    pub mean: Vector2<f64>,
    /// Unit eigenvectors, dominant axis first
    pub eigenvectors: [Vector2<f64>; 2],
    /// Covariance eigenvalues, descending
    pub eigenvalues: [f64; 2],
}

impl OrientationEstimate {
    pub fn degrees(&self) -> f64 {
        self.angle.to_degrees()
    }

    /// Angle rounded to the nearest whole degree, the unit used for voting
    pub fn whole_degrees(&self) -> i32 {
        self.degrees().round() as i32
    }
}

/// Flip an eigenvector so that it points into the right half-plane.
///
/// The eigen solver may return either sign; fixing one keeps angles in (-90, 90].
fn canonical_direction(v: Vector2<f64>) -> Vector2<f64> {
    if v.x < 0.0 || (v.x == 0.0 && v.y < 0.0) {
        -v
    } else {
        v
    }
}

/// Estimate the elongation axis of a contour with PCA.
///
/// Returns `None` when the contour has fewer than two distinct points.
/// The result cannot tell a shape from its own half-turn.
pub fn estimate_orientation(points: &[Point<i32>]) -> Option<OrientationEstimate> {
    let first = points.first()?;
    if points.iter().all(|p| p == first) {
        return None;
    }

    let n = points.len() as f64;
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc: Vector2<f64>, p| {
            acc + Vector2::new(p.x as f64, p.y as f64)
        });
    let mean = sum / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for p in points {
        let dx = p.x as f64 - mean.x;
        let dy = p.y as f64 - mean.y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    let covariance = Matrix2::new(sxx / n, sxy / n, sxy / n, syy / n);

    let eigen = SymmetricEigen::new(covariance);
    let (major, minor) = if eigen.eigenvalues[0] >= eigen.eigenvalues[1] {
        (0, 1)
    } else {
        (1, 0)
    };

    let v1 = canonical_direction(eigen.eigenvectors.column(major).into_owned());
    let v2 = canonical_direction(eigen.eigenvectors.column(minor).into_owned());

    Some(OrientationEstimate {
        angle: v1.y.atan2(v1.x),
        mean,
        eigenvectors: [v1, v2],
        eigenvalues: [eigen.eigenvalues[major], eigen.eigenvalues[minor]],
    })
}

/// Axis-aligned box in pixel coordinates, max edges exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl BoundingBox {
    /// Smallest box covering every point, `None` for an empty slice
    pub fn of_points(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let seed = BoundingBox {
            min_x: first.x as i64,
            min_y: first.y as i64,
            max_x: first.x as i64 + 1,
            max_y: first.y as i64 + 1,
        };

        Some(points.iter().fold(seed, |b, p| BoundingBox {
            min_x: b.min_x.min(p.x as i64),
            min_y: b.min_y.min(p.y as i64),
            max_x: b.max_x.max(p.x as i64 + 1),
            max_y: b.max_y.max(p.y as i64 + 1),
        }))
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> i64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i64 {
        self.max_y - self.min_y
    }
}

/// Rectangle to cut out of the image, `to_*` edges exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub from_x: u32,
    pub from_y: u32,
    pub to_x: u32,
    pub to_y: u32,
}

impl CropRegion {
    pub fn width(&self) -> u32 {
        self.to_x - self.from_x
    }

    pub fn height(&self) -> u32 {
        self.to_y - self.from_y
    }

    pub fn is_square(&self) -> bool {
        self.width() == self.height()
    }
}

/// Pad the short side of `bbox` toward a square.
///
/// `basis` is the (width, height) pair that picks the padded axis. The margin
/// added to each side is the smaller of half the deficit and the free space
/// on either side of the box, so the region never leaves the image. Near a
/// border this leaves the region only approximately square.
pub fn derive_crop_region(
    bbox: &BoundingBox,
    basis: (i64, i64),
    image_width: u32,
    image_height: u32,
) -> CropRegion {
    let (w, h) = basis;
    let width = image_width as i64;
    let height = image_height as i64;

    let (from_x, from_y, to_x, to_y) = if w > h {
        let delta = ((w - h) / 2).min(height - bbox.max_y).min(bbox.min_y);
        (bbox.min_x, bbox.min_y - delta, bbox.max_x, bbox.max_y + delta)
    } else {
        let delta = ((h - w) / 2).min(width - bbox.max_x).min(bbox.min_x);
        (bbox.min_x - delta, bbox.min_y, bbox.max_x + delta, bbox.max_y)
    };

    CropRegion {
        from_x: from_x.clamp(0, width) as u32,
        from_y: from_y.clamp(0, height) as u32,
        to_x: to_x.clamp(0, width) as u32,
        to_y: to_y.clamp(0, height) as u32,
    }
}
