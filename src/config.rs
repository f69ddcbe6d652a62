use std::path::PathBuf;

/// Class sub-directories visited when none are given explicitly.
pub const DEFAULT_CLASS_LABELS: [&str; 5] = [
    "L1 SUPERIOR",
    "L2 SUPERIOR",
    "L3 SUPERIOR",
    "L4 SUPERIOR",
    "L5 SUPERIOR",
];

/// Which rectangle decides whether the crop is padded vertically or horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SquareBasis {
    /// Width and height of the union bounding box.
    #[default]
    Union,
    /// Width and height of the last extracted contour's own rectangle.
    /// Reproduces the output of the first generation of the dataset.
    LastContour,
}

/// Every tunable of the per-image chain.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // -- Enhancement --
    /// Gamma exponent for the brightness lookup table. Below 1.0 brightens.
    pub gamma: f64,
    /// CLAHE clip limit, relative to a uniform histogram.
    pub clahe_clip_limit: f64,
    /// CLAHE tile grid (columns, rows).
    pub clahe_tiles: (u32, u32),

    // -- Contours --
    /// Lower bound applied to the Otsu level.
    pub threshold_floor: u8,

    // -- Orientation --
    /// Contours with area at or below this are ignored.
    pub min_contour_area: f64,
    /// Contours with area at or above this are ignored.
    pub max_contour_area: f64,
    /// Angles with magnitude at or above this are not corrected.
    pub max_correction_degrees: i32,

    // -- Centering --
    pub square_basis: SquareBasis,

    // -- Output --
    /// Side of the square output image in pixels.
    pub output_size: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gamma: 0.4,
            clahe_clip_limit: 2.0,
            clahe_tiles: (8, 8),
            threshold_floor: 10,
            min_contour_area: 3700.0,
            max_contour_area: 100_000.0,
            max_correction_degrees: 10,
            square_basis: SquareBasis::Union,
            output_size: 240,
        }
    }
}

impl PipelineConfig {
    /// True when a contour of this area takes part in orientation voting.
    pub fn accepts_area(&self, area: f64) -> bool {
        area > self.min_contour_area && area < self.max_contour_area
    }
}

/// Dataset layout handed to the batch driver.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub class_labels: Vec<String>,
}

impl BatchConfig {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            class_labels: DEFAULT_CLASS_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_class_labels(mut self, labels: Vec<String>) -> Self {
        if !labels.is_empty() {
            self.class_labels = labels;
        }
        self
    }
}
