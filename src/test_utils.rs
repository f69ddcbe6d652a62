use image::{GrayImage, Luma};

/// Fill an ellipse whose major axis sits at `degrees` (image coordinates, y down)
pub(crate) fn draw_ellipse(img: &mut GrayImage, cx: f64, cy: f64, a: f64, b: f64, degrees: f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (width, height) = img.dimensions();
    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            if (u / a).powi(2) + (v / b).powi(2) <= 1.0 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }
}

/// Black canvas with white ellipses `(cx, cy, a, b, degrees)`
pub(crate) fn ellipse_canvas(width: u32, height: u32, ellipses: &[(f64, f64, f64, f64, f64)]) -> GrayImage {
    let mut img = GrayImage::new(width, height);
    for &(cx, cy, a, b, degrees) in ellipses {
        draw_ellipse(&mut img, cx, cy, a, b, degrees);
    }
    img
}
