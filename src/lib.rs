// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`svg2img` converts SVG files into raster images at one or more resolutions.

The pipeline derives the document's intrinsic size, resolves the requested
DPI values and sizes into concrete pixel dimensions, renders the document
with either the embedded rasterizer or an external vector tool, and writes
the results into the requested formats. When several sizes are requested,
a single render at the maximal bounding size is downscaled with the chosen
resampling filter instead of paying for a rasterization per size.
*/

#![warn(missing_docs)]

mod document;
mod error;
mod export;
mod geom;
mod options;
mod render;
mod units;

pub use crate::document::Document;
pub use crate::error::Error;
pub use crate::export::{export, export_multi, ICO_SIZES};
pub use crate::geom::{max_bounding_size, plan_sizes, ScreenSize, SizeRequest};
pub use crate::options::{base_dpi, Area, Options};
pub use crate::render::{
    render_all, renderer_by_name, EmbeddedRenderer, ExternalRenderer, Filter, Render,
};
pub use crate::units::{Length, Unit};

/// A raster image that contains rendering results.
///
/// Unpremultiplied RGBA color type is used.
#[derive(Clone, Debug)]
pub struct Image {
    pixels: image::RgbaImage,
}

impl Image {
    pub(crate) fn from_rgba(pixels: image::RgbaImage) -> Self {
        Image { pixels }
    }

    pub(crate) fn from_pixmap(pixmap: tiny_skia::Pixmap) -> Self {
        let width = pixmap.width();
        let height = pixmap.height();

        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        // Unwrap is safe, because the buffer length matches the pixmap size.
        Image { pixels: image::RgbaImage::from_raw(width, height, data).unwrap() }
    }

    /// Returns the image width.
    ///
    /// Never zero.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Returns the image height.
    ///
    /// Never zero.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Returns the image size.
    pub fn size(&self) -> ScreenSize {
        // Unwrap is safe, because rendered images are never empty.
        ScreenSize::new(self.width(), self.height()).unwrap()
    }

    /// Returns the image content as an RGBA byte slice.
    pub fn data(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Saves the image as PNG at the provided path.
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Error> {
        self.pixels
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|_| Error::WriteFailed(path.as_ref().to_path_buf()))
    }

    pub(crate) fn resize(&self, size: ScreenSize, filter: image::imageops::FilterType) -> Image {
        Image {
            pixels: image::imageops::resize(&self.pixels, size.width(), size.height(), filter),
        }
    }

    pub(crate) fn as_rgba(&self) -> &image::RgbaImage {
        &self.pixels
    }
}
