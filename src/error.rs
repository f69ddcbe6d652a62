use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while normalizing a single image.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("unsupported pixel format: {0}")]
    Format(String),

    #[error("no shape found to center on")]
    EmptyShape,

    #[error("i/o error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl PipelineError {
    /// Short name of the error kind, used in batch reports.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Format(_) => "FormatError",
            PipelineError::EmptyShape => "EmptyShapeError",
            PipelineError::Io { .. } | PipelineError::Decode { .. } | PipelineError::Encode { .. } => {
                "IOError"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
