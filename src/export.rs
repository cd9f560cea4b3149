// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use image::codecs::ico::{IcoEncoder, IcoFrame};

use crate::error::Error;
use crate::Image;

/// Icon sizes considered for `.ico` files.
///
/// Only entries strictly smaller than the exported image in both dimensions
/// end up in the icon.
pub const ICO_SIZES: &[u32] = &[16, 32, 48, 64, 256];

/// Writes `image` to `{stem}.{format}` for every requested format.
///
/// `ico` produces a single multi-resolution icon. Other formats are written
/// directly; when a format rejects the RGBA buffer the image is converted
/// to RGB and retried once. A format that still fails is skipped with a
/// warning while the remaining formats are written.
///
/// The destination directory must exist; nothing is written otherwise.
pub fn export<P: AsRef<Path>>(image: &Image, stem: P, formats: &[String]) -> Result<(), Error> {
    let stem = stem.as_ref();

    let dir = match stem.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir));
    }

    for format in formats {
        let mut file = stem.as_os_str().to_os_string();
        file.push(".");
        file.push(format);
        let path = PathBuf::from(file);

        if format.as_str() == "ico" {
            if let Err(e) = save_ico(image, &path) {
                log::warn!("Failed to save {:?} cause {}.", path, e);
            }
        } else {
            save_with_fallback(image, &path);
        }
    }

    Ok(())
}

/// Writes every image via [`export`], suffixing the stem with `_{width}_{height}`.
pub fn export_multi<P: AsRef<Path>>(
    images: &[Image],
    stem: P,
    formats: &[String],
) -> Result<(), Error> {
    for image in images {
        let mut file = stem.as_ref().as_os_str().to_os_string();
        file.push(format!("_{}_{}", image.width(), image.height()));
        export(image, PathBuf::from(file), formats)?;
    }

    Ok(())
}

fn save_with_fallback(image: &Image, path: &Path) {
    let rgba = image::DynamicImage::ImageRgba8(image.as_rgba().clone());
    if rgba.save(path).is_ok() {
        return;
    }

    // Formats without an alpha channel reject RGBA buffers. JPEG is the
    // usual case.
    let rgb = image::DynamicImage::ImageRgb8(rgba.to_rgb8());
    if let Err(e) = rgb.save(path) {
        log::warn!("Failed to save {:?} cause {}.", path, e);
    }
}

fn save_ico(image: &Image, path: &Path) -> Result<(), Error> {
    let mut thumbs: Vec<image::RgbaImage> = ICO_SIZES
        .iter()
        .filter(|&&candidate| candidate < image.width() && candidate < image.height())
        .map(|&candidate| ico_thumbnail(image, candidate))
        .collect();

    // Tiny images have no strictly smaller candidate.
    // They become the only icon entry themselves.
    if thumbs.is_empty() {
        thumbs.push(image.as_rgba().clone());
    }

    let mut frames = Vec::with_capacity(thumbs.len());
    for thumb in &thumbs {
        let frame = IcoFrame::as_png(
            thumb.as_raw(),
            thumb.width(),
            thumb.height(),
            image::ColorType::Rgba8,
        )
        .map_err(|_| Error::WriteFailed(path.to_path_buf()))?;
        frames.push(frame);
    }

    let file =
        std::fs::File::create(path).map_err(|_| Error::WriteFailed(path.to_path_buf()))?;
    let writer = std::io::BufWriter::new(file);

    IcoEncoder::new(writer)
        .encode_images(&frames)
        .map_err(|_| Error::WriteFailed(path.to_path_buf()))
}

// Downscales into a `size` x `size` box, keeping the aspect ratio.
fn ico_thumbnail(image: &Image, size: u32) -> image::RgbaImage {
    let scale = f64::from(size) / f64::from(image.width().max(image.height()));
    let width = (f64::from(image.width()) * scale).round().max(1.0) as u32;
    let height = (f64::from(image.height()) * scale).round().max(1.0) as u32;

    image::imageops::resize(
        image.as_rgba(),
        width,
        height,
        image::imageops::FilterType::Lanczos3,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> Image {
        let pixels = image::RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 0, 0])
            }
        });
        Image::from_rgba(pixels)
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("nope").join("image");

        let res = export(&checkerboard(16, 16), &stem, &["png".to_string()]);
        assert!(matches!(res, Err(Error::DirectoryNotFound(_))));
    }

    #[test]
    fn alpha_incompatible_format_falls_back_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("image");

        export(&checkerboard(16, 16), &stem, &["jpg".to_string()]).unwrap();
        assert!(dir.path().join("image.jpg").is_file());
    }

    #[test]
    fn ico_export_writes_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("icon");

        export(&checkerboard(100, 50), &stem, &["ico".to_string()]).unwrap();

        let path = dir.path().join("icon.ico");
        assert!(path.is_file());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn multi_export_suffixes_the_stem() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("image");
        let images = [checkerboard(20, 10), checkerboard(10, 5)];

        export_multi(&images, &stem, &["png".to_string()]).unwrap();

        assert!(dir.path().join("image_20_10.png").is_file());
        assert!(dir.path().join("image_10_5.png").is_file());
    }

    #[test]
    fn thumbnails_keep_aspect() {
        let thumb = ico_thumbnail(&checkerboard(100, 50), 16);
        assert_eq!((thumb.width(), thumb.height()), (16, 8));
    }
}
