use clap::Parser;
use std::path::PathBuf;

use crate::config::{BatchConfig, PipelineConfig, SquareBasis};

#[derive(Parser, Debug)]
#[command(name = "vertebra-norm")]
#[command(version, about = "Normalize vertebra images: brighten, equalize, level and center them")]
pub struct Cli {
    /// Dataset root holding one sub-directory per class
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output root [default: <input parent>/processed/<input name>]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Class sub-directory to process (repeatable) [default: L1..L5 SUPERIOR]
    #[arg(short, long = "class")]
    pub classes: Vec<String>,

    /// Side of the square output image in pixels
    #[arg(short, long, default_value = "240")]
    pub size: u32,

    /// Gamma exponent for brightening
    #[arg(long, default_value = "0.4")]
    pub gamma: f64,

    /// Tilts of this many degrees or more are left for manual review
    #[arg(long, default_value = "10")]
    pub max_correction: i32,

    /// Rectangle deciding the padded axis ("union" or "last-contour")
    #[arg(long, default_value = "union", value_parser = parse_square_basis)]
    pub square_basis: SquareBasis,

    /// List input and output paths without processing
    #[arg(long)]
    pub dry_run: bool,

    /// Show per-stage details
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    pub fn output_root(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let name = self.input.file_name().unwrap_or_default();
            let parent = self.input.parent().unwrap_or(std::path::Path::new("."));
            parent.join("processed").join(name)
        })
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig::new(&self.input, self.output_root()).with_class_labels(self.classes.clone())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            gamma: self.gamma,
            max_correction_degrees: self.max_correction,
            square_basis: self.square_basis,
            output_size: self.size,
            ..PipelineConfig::default()
        }
    }
}

fn parse_square_basis(s: &str) -> Result<SquareBasis, String> {
    match s {
        "union" => Ok(SquareBasis::Union),
        "last-contour" => Ok(SquareBasis::LastContour),
        other => Err(format!(
            "Invalid square basis '{}', expected 'union' or 'last-contour'",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["vertebra-norm", "/data/train"]);
        assert_eq!(cli.output_root(), PathBuf::from("/data/processed/train"));
        let config = cli.pipeline_config();
        assert_eq!(config.output_size, 240);
        assert_eq!(config.square_basis, SquareBasis::Union);
        assert_eq!(cli.batch_config().class_labels.len(), 5);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "vertebra-norm",
            "/data/test",
            "-o",
            "/tmp/out",
            "--class",
            "L1 SUPERIOR",
            "--class",
            "L2 SUPERIOR",
            "--square-basis",
            "last-contour",
            "--size",
            "128",
        ]);
        let batch = cli.batch_config();
        assert_eq!(batch.output_root, PathBuf::from("/tmp/out"));
        assert_eq!(batch.class_labels, vec!["L1 SUPERIOR", "L2 SUPERIOR"]);
        assert_eq!(cli.pipeline_config().square_basis, SquareBasis::LastContour);
        assert_eq!(cli.pipeline_config().output_size, 128);
    }

    #[test]
    fn test_bad_basis_rejected() {
        assert!(Cli::try_parse_from(["vertebra-norm", "in", "--square-basis", "diagonal"]).is_err());
    }
}
