use std::fs;
use std::path::Path;

use image::{GrayImage, Luma};
use vertebra_norm::{run_batch, BatchConfig, PipelineConfig};

fn write_ellipse(path: &Path, degrees: f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let img = GrayImage::from_fn(260, 200, |x, y| {
        let dx = x as f64 - 130.0;
        let dy = y as f64 - 100.0;
        let u = dx * cos + dy * sin;
        let v = -dx * sin + dy * cos;
        if (u / 70.0).powi(2) + (v / 30.0).powi(2) <= 1.0 {
            Luma([180])
        } else {
            Luma([0])
        }
    });
    img.save(path).unwrap();
}

#[test]
fn test_batch_mirrors_tree_and_isolates_failures() {
    let root = tempfile::tempdir().unwrap();
    let input = root.path().join("train");
    let output = root.path().join("processed");

    let class_dir = input.join("L1 SUPERIOR");
    fs::create_dir_all(&class_dir).unwrap();
    write_ellipse(&class_dir.join("vert_a.png"), 4.0);
    write_ellipse(&class_dir.join("vert_b.v2.png"), 25.0);
    fs::write(class_dir.join("notes.txt"), b"not an image").unwrap();
    fs::write(class_dir.join("blank.png"), Vec::<u8>::new()).unwrap();

    let batch = BatchConfig::new(&input, &output)
        .with_class_labels(vec!["L1 SUPERIOR".to_string(), "L2 SUPERIOR".to_string()]);
    let report = run_batch(&batch, &PipelineConfig::default());

    assert_eq!(report.processed, 2);
    assert_eq!(report.needs_review.len(), 1);
    assert!(report.needs_review[0].ends_with("vert_b.v2.png"));

    // blank.png, notes.txt and the missing L2 directory
    assert_eq!(report.failures.len(), 3);
    assert!(report.failures.iter().all(|f| f.kind == "IOError"));

    let written = output.join("L1 SUPERIOR").join("vert_a.jpg");
    let img = image::open(&written).unwrap();
    assert_eq!((img.width(), img.height()), (240, 240));
    assert!(output.join("L1 SUPERIOR").join("vert_b.jpg").exists());
}

#[test]
fn test_blank_image_reports_empty_shape() {
    let root = tempfile::tempdir().unwrap();
    let class_dir = root.path().join("in").join("L5 SUPERIOR");
    fs::create_dir_all(&class_dir).unwrap();
    GrayImage::from_pixel(400, 400, Luma([0]))
        .save(class_dir.join("dark.png"))
        .unwrap();

    let batch = BatchConfig::new(root.path().join("in"), root.path().join("out"))
        .with_class_labels(vec!["L5 SUPERIOR".to_string()]);
    let report = run_batch(&batch, &PipelineConfig::default());

    assert_eq!(report.processed, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, "EmptyShapeError");
    assert!(!root.path().join("out").join("L5 SUPERIOR").join("dark.jpg").exists());
}
