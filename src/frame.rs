use std::path::Path;

use image::{DynamicImage, GrayImage, ImageReader, RgbImage};

use crate::error::{PipelineError, Result};

/// An image with a validated 8-bit pixel layout.
///
/// Decoders hand back many layouts (16-bit, float, with alpha). All of them are
/// coerced into one of these two variants at construction so the rest of the
/// pipeline only deals with `u8` samples.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Gray(GrayImage),
    Color(RgbImage),
}

impl Frame {
    /// Validate and coerce a decoded image.
    pub fn from_dynamic(img: DynamicImage) -> Result<Self> {
        if img.width() == 0 || img.height() == 0 {
            return Err(PipelineError::Format(format!(
                "image has no pixels ({}x{})",
                img.width(),
                img.height()
            )));
        }

        let frame = match img {
            DynamicImage::ImageLuma8(gray) => Frame::Gray(gray),
            DynamicImage::ImageRgb8(rgb) => Frame::Color(rgb),
            DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => Frame::Gray(img.to_luma8()),
            DynamicImage::ImageRgba8(_)
            | DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgba16(_)
            | DynamicImage::ImageRgb32F(_)
            | DynamicImage::ImageRgba32F(_) => Frame::Color(img.to_rgb8()),
            other => {
                return Err(PipelineError::Format(format!(
                    "cannot coerce {:?} samples to 8-bit",
                    other.color()
                )))
            }
        };

        Ok(frame)
    }

    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Frame::Gray(img) => img.dimensions(),
            Frame::Color(img) => img.dimensions(),
        }
    }

    pub fn channels(&self) -> u8 {
        match self {
            Frame::Gray(_) => 1,
            Frame::Color(_) => 3,
        }
    }

    /// Single-channel luminance view. Gray frames are copied as-is.
    pub fn to_gray(&self) -> GrayImage {
        match self {
            Frame::Gray(img) => img.clone(),
            Frame::Color(img) => image::imageops::grayscale(img),
        }
    }
}

impl From<GrayImage> for Frame {
    fn from(img: GrayImage) -> Self {
        Frame::Gray(img)
    }
}

impl From<RgbImage> for Frame {
    fn from(img: RgbImage) -> Self {
        Frame::Color(img)
    }
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> Result<Frame> {
    let img = ImageReader::open(path)
        .map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .decode()
        .map_err(|source| PipelineError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    Frame::from_dynamic(img)
}

/// Encode a frame, the format chosen from the file extension.
pub fn save_image(path: &Path, frame: &Frame) -> Result<()> {
    let result = match frame {
        Frame::Gray(img) => img.save(path),
        Frame::Color(img) => img.save(path),
    };

    result.map_err(|source| match source {
        image::ImageError::IoError(io) => PipelineError::Io {
            path: path.to_path_buf(),
            source: io,
        },
        other => PipelineError::Encode {
            path: path.to_path_buf(),
            source: other,
        },
    })
}
