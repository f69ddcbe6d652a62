use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

use crate::frame::Frame;
use crate::geometry::CropRegion;

/// Build the 256-entry brightness table for `gamma`
pub fn gamma_table(gamma: f64) -> [u8; 256] {
    let mut table = [0u8; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let v = (i as f64 / 255.0).powf(gamma) * 255.0;
        *entry = v.clamp(0.0, 255.0) as u8;
    }
    table
}

/// Apply gamma correction to every channel
pub fn apply_gamma(frame: &Frame, gamma: f64) -> Frame {
    let table = gamma_table(gamma);
    match frame {
        Frame::Gray(img) => {
            let mut out = img.clone();
            out.iter_mut().for_each(|v| *v = table[*v as usize]);
            Frame::Gray(out)
        }
        Frame::Color(img) => {
            let mut out = img.clone();
            out.iter_mut().for_each(|v| *v = table[*v as usize]);
            Frame::Color(out)
        }
    }
}

/// Start of tile `index` when `len` pixels are split into `count` tiles
fn tile_start(index: u32, len: u32, count: u32) -> u32 {
    (index as u64 * len as u64 / count as u64) as u32
}

/// Clip a tile histogram at `limit` and spread the excess over all bins
fn clip_histogram(hist: &mut [u32; 256], limit: u32) {
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let share = excess / 256;
    let residual = excess % 256;
    for bin in hist.iter_mut() {
        *bin += share;
    }
    if residual > 0 {
        let step = (256 / residual).max(1) as usize;
        for bin in hist.iter_mut().step_by(step).take(residual as usize) {
            *bin += 1;
        }
    }
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into `tiles.0 × tiles.1` regions, each gets its own
/// clipped equalization table, and every pixel blends the tables of the four
/// nearest tile centers. A `clip_limit` of zero or less disables clipping.
pub fn clahe(gray: &GrayImage, clip_limit: f64, tiles: (u32, u32)) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tiles_x = tiles.0.clamp(1, width);
    let tiles_y = tiles.1.clamp(1, height);

    let mut tables = vec![[0u8; 256]; (tiles_x * tiles_y) as usize];
    for ty in 0..tiles_y {
        let (y0, y1) = (tile_start(ty, height, tiles_y), tile_start(ty + 1, height, tiles_y));
        for tx in 0..tiles_x {
            let (x0, x1) = (tile_start(tx, width, tiles_x), tile_start(tx + 1, width, tiles_x));

            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[gray.get_pixel(x, y)[0] as usize] += 1;
                }
            }

            let area = (x1 - x0) * (y1 - y0);
            if clip_limit > 0.0 {
                let limit = ((clip_limit * area as f64 / 256.0) as u32).max(1);
                clip_histogram(&mut hist, limit);
            }

            let scale = 255.0 / area as f64;
            let table = &mut tables[(ty * tiles_x + tx) as usize];
            let mut cdf = 0u32;
            for (value, count) in hist.iter().enumerate() {
                cdf += count;
                table[value] = (cdf as f64 * scale).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    let tile_w = width as f64 / tiles_x as f64;
    let tile_h = height as f64 / tiles_y as f64;

    // Fractional tile coordinate of a pixel and its two neighbouring tiles
    let locate = |pos: u32, size: f64, count: u32| -> (usize, usize, f64) {
        let f = ((pos as f64 + 0.5) / size - 0.5).clamp(0.0, (count - 1) as f64);
        let i0 = f.floor() as usize;
        let i1 = (i0 + 1).min(count as usize - 1);
        (i0, i1, f - i0 as f64)
    };

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let (ty0, ty1, ay) = locate(y, tile_h, tiles_y);
        for x in 0..width {
            let (tx0, tx1, ax) = locate(x, tile_w, tiles_x);
            let v = gray.get_pixel(x, y)[0] as usize;
            let at = |tx: usize, ty: usize| tables[ty * tiles_x as usize + tx][v] as f64;

            let top = at(tx0, ty0) * (1.0 - ax) + at(tx1, ty0) * ax;
            let bottom = at(tx0, ty1) * (1.0 - ax) + at(tx1, ty1) * ax;
            let blended = top * (1.0 - ay) + bottom * ay;
            out.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
    }

    out
}

/// Rotate about the image center, keeping the canvas size.
///
/// Positive `degrees` turn the content counter-clockwise on screen. Corners
/// leaving the canvas are lost and uncovered areas are black.
pub fn rotate_same_canvas(frame: &Frame, degrees: f64) -> Frame {
    // imageproc rotates clockwise for positive theta
    let theta = -(degrees.to_radians()) as f32;
    match frame {
        Frame::Gray(img) => {
            Frame::Gray(rotate_about_center(img, theta, Interpolation::Bilinear, Luma([0])))
        }
        Frame::Color(img) => Frame::Color(rotate_about_center(
            img,
            theta,
            Interpolation::Bilinear,
            Rgb([0, 0, 0]),
        )),
    }
}

/// Cut `region` out of the frame
pub fn crop(frame: &Frame, region: &CropRegion) -> Frame {
    let (x, y, w, h) = (region.from_x, region.from_y, region.width(), region.height());
    match frame {
        Frame::Gray(img) => Frame::Gray(imageops::crop_imm(img, x, y, w, h).to_image()),
        Frame::Color(img) => Frame::Color(imageops::crop_imm(img, x, y, w, h).to_image()),
    }
}

/// Resize to exactly `width × height` with linear interpolation
pub fn resize_exact(frame: &Frame, width: u32, height: u32) -> Frame {
    match frame {
        Frame::Gray(img) => Frame::Gray(imageops::resize(img, width, height, FilterType::Triangle)),
        Frame::Color(img) => {
            Frame::Color(imageops::resize(img, width, height, FilterType::Triangle))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_gamma_table_endpoints() {
        let table = gamma_table(0.4);
        assert_eq!(table[0], 0);
        assert_eq!(table[255], 255);
        // brightening: mid grey moves up
        assert!(table[64] > 64);
        assert_eq!(gamma_table(1.0)[100], 100);
    }

    #[test]
    fn test_gamma_applies_per_channel() {
        let img = RgbImage::from_pixel(2, 2, Rgb([0, 64, 255]));
        let table = gamma_table(0.4);
        match apply_gamma(&Frame::from(img), 0.4) {
            Frame::Color(out) => assert_eq!(out.get_pixel(1, 1).0, [0, table[64], 255]),
            Frame::Gray(_) => panic!("channel layout changed"),
        }
    }

    #[test]
    fn test_clahe_uniform_stays_uniform() {
        let gray = GrayImage::from_pixel(64, 48, Luma([90]));
        let out = clahe(&gray, 2.0, (8, 8));
        assert_eq!(out.dimensions(), (64, 48));
        let first = out.get_pixel(0, 0)[0];
        assert!(out.pixels().all(|p| p[0] == first));
    }

    #[test]
    fn test_clahe_stretches_low_contrast() {
        let gray = GrayImage::from_fn(64, 64, |x, _| Luma([if x < 32 { 120 } else { 130 }]));
        let out = clahe(&gray, 40.0, (1, 1));
        let left = out.get_pixel(0, 0)[0] as i32;
        let right = out.get_pixel(63, 0)[0] as i32;
        assert!(right - left > 20, "left={} right={}", left, right);
    }

    #[test]
    fn test_clahe_small_image_more_tiles_than_pixels() {
        let gray = GrayImage::from_fn(3, 2, |x, y| Luma([(x * 40 + y * 10) as u8]));
        let out = clahe(&gray, 2.0, (8, 8));
        assert_eq!(out.dimensions(), (3, 2));
    }

    #[test]
    fn test_rotate_keeps_canvas() {
        let img = GrayImage::from_pixel(40, 30, Luma([200]));
        let out = rotate_same_canvas(&Frame::from(img), 5.0);
        assert_eq!(out.dimensions(), (40, 30));
        match out {
            Frame::Gray(g) => {
                assert!(g.get_pixel(20, 15)[0] >= 199);
                // top-left corner swings out of the source
                assert_eq!(g.get_pixel(0, 0)[0], 0);
            }
            Frame::Color(_) => panic!("channel layout changed"),
        }
    }

    #[test]
    fn test_rotate_color_counter_clockwise() {
        // red block right of center ends up above it after a quarter turn
        let img = RgbImage::from_fn(41, 41, |x, y| {
            if (30..35).contains(&x) && (18..23).contains(&y) {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 0])
            }
        });
        match rotate_same_canvas(&Frame::from(img), 90.0) {
            Frame::Color(out) => {
                assert_eq!(out.dimensions(), (41, 41));
                let moved = out.get_pixel(20, 9);
                assert!(moved[0] > 200 && moved[1] < 50, "{:?}", moved);
                assert!(out.get_pixel(32, 20)[0] < 50);
                assert!(out.get_pixel(20, 32)[0] < 50);
            }
            Frame::Gray(_) => panic!("channel layout changed"),
        }
    }

    #[test]
    fn test_crop_and_resize() {
        let img = RgbImage::from_fn(20, 10, |x, y| Rgb([x as u8, y as u8, 0]));
        let region = CropRegion { from_x: 5, from_y: 2, to_x: 15, to_y: 8 };
        let cropped = crop(&Frame::from(img), &region);
        assert_eq!(cropped.dimensions(), (10, 6));
        if let Frame::Color(c) = &cropped {
            assert_eq!(c.get_pixel(0, 0).0, [5, 2, 0]);
        }
        assert_eq!(resize_exact(&cropped, 240, 240).dimensions(), (240, 240));
    }
}
