// ============================================================
// Layer 6 — Image I/O
// ============================================================
// Reading source images into the square working resolution the
// renderer expects, and writing composites back out.

use std::path::Path;

use image::{imageops, imageops::FilterType, Rgb, RgbImage};

use crate::error::{Error, Result};

/// Load an image from disk as 8-bit RGB.
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let img = image::open(path)?;
    Ok(img.to_rgb8())
}

/// Pad an image to a centred square with black borders, then
/// resize it to `size` x `size`.
pub fn pad_and_resize(img: &RgbImage, size: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let side   = w.max(h).max(1);

    let mut square = RgbImage::from_pixel(side, side, Rgb([0, 0, 0]));
    imageops::overlay(
        &mut square,
        img,
        i64::from((side - w) / 2),
        i64::from((side - h) / 2),
    );

    if side == size {
        square
    } else {
        imageops::resize(&square, size, size, FilterType::Triangle)
    }
}

/// Place images side by side, top-aligned, on a black canvas.
pub fn hconcat(images: &[&RgbImage]) -> RgbImage {
    let width  = images.iter().map(|i| i.width()).sum::<u32>();
    let height = images.iter().map(|i| i.height()).max().unwrap_or(0);

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    let mut x = 0i64;
    for img in images {
        imageops::overlay(&mut canvas, *img, x, 0);
        x += i64::from(img.width());
    }
    canvas
}

/// Write an image, choosing the encoder from the file extension.
pub fn save(img: &RgbImage, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    img.save(path)?;
    Ok(())
}
