// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::str::FromStr;

use crate::document::Document;
use crate::error::Error;
use crate::geom::{max_bounding_size, ScreenSize};
use crate::options::{Area, Options};
use crate::Image;

/// A resampling filter used when downscaling the bounding render.
///
/// Every filter except `Rerender` renders the document once at the maximal
/// bounding size and scales that bitmap down to each requested size.
/// `Rerender` rasterizes every requested size from scratch instead.
///
/// The `image` crate ships no box or Hamming kernels, so `Box` resolves to
/// the triangle kernel and `Hamming` to the Gaussian one.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Filter {
    Nearest,
    Lanczos,
    Bilinear,
    Bicubic,
    Box,
    Hamming,
    Rerender,
}

impl Default for Filter {
    fn default() -> Self {
        Filter::Lanczos
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Error> {
        match text {
            "nearest" => Ok(Filter::Nearest),
            "lanczos" => Ok(Filter::Lanczos),
            "bilinear" => Ok(Filter::Bilinear),
            "bicubic" => Ok(Filter::Bicubic),
            "box" => Ok(Filter::Box),
            "hamming" => Ok(Filter::Hamming),
            "rerender" => Ok(Filter::Rerender),
            _ => Err(Error::InvalidFilter(text.to_string())),
        }
    }
}

impl Filter {
    fn resample_kind(self) -> Option<image::imageops::FilterType> {
        use image::imageops::FilterType;

        match self {
            Filter::Nearest => Some(FilterType::Nearest),
            Filter::Lanczos => Some(FilterType::Lanczos3),
            Filter::Bilinear | Filter::Box => Some(FilterType::Triangle),
            Filter::Bicubic => Some(FilterType::CatmullRom),
            Filter::Hamming => Some(FilterType::Gaussian),
            Filter::Rerender => None,
        }
    }
}

/// A rendering backend.
///
/// Produces one raster image at one requested pixel size.
pub trait Render {
    /// Renders `doc` at exactly `size` pixels.
    ///
    /// Width and height scale independently, so `size` does not have to
    /// preserve the document's aspect ratio.
    fn render(&self, doc: &Document, size: ScreenSize, opt: &Options) -> Result<Image, Error>;
}

/// Returns the backend registered under `name`.
///
/// `embedded` rasterizes in-process, `external` shells out to Inkscape.
pub fn renderer_by_name(name: &str) -> Result<Box<dyn Render>, Error> {
    match name {
        "embedded" => Ok(Box::new(EmbeddedRenderer)),
        "external" => Ok(Box::new(ExternalRenderer::default())),
        _ => Err(Error::UnsupportedRenderer(name.to_string())),
    }
}

/// The in-process rasterizer.
///
/// The document is decoded into a scene graph once and painted directly at
/// the target size.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedRenderer;

impl Render for EmbeddedRenderer {
    fn render(&self, doc: &Document, size: ScreenSize, opt: &Options) -> Result<Image, Error> {
        // Serialize the current attribute record so edits made through the
        // document setters affect the rendering.
        let text = doc.to_string()?;

        let usvg_opt = usvg::Options { dpi: opt.dpi, ..usvg::Options::default() };
        let tree =
            usvg::Tree::from_str(&text, &usvg_opt).map_err(|e| Error::Render(e.to_string()))?;

        let mut pixmap =
            tiny_skia::Pixmap::new(size.width(), size.height()).ok_or(Error::InvalidSize)?;

        // Scale both axes independently instead of fitting: the target size
        // is allowed to change the aspect ratio.
        let sx = (f64::from(size.width()) / tree.size.width()) as f32;
        let sy = (f64::from(size.height()) / tree.size.height()) as f32;

        resvg::render(
            &tree,
            usvg::FitTo::Original,
            tiny_skia::Transform::from_scale(sx, sy),
            pixmap.as_mut(),
        )
        .ok_or_else(|| Error::Render("target size is zero".to_string()))?;

        if opt.margin.is_some() {
            log::warn!("Margins are not supported by the embedded renderer.");
        }

        let pixmap = match opt.area {
            Area::Page => pixmap,
            Area::Drawing => {
                let (_, _, trimmed) = resvg::trim_transparency(pixmap)
                    .ok_or_else(|| Error::Render("the drawing is fully transparent".to_string()))?;
                trimmed
            }
            Area::Custom { .. } => {
                log::warn!(
                    "Explicit areas are not supported by the embedded renderer. \
                     Rendering the page instead."
                );
                pixmap
            }
        };

        Ok(Image::from_pixmap(pixmap))
    }
}

/// The Inkscape subprocess backend.
///
/// Inkscape prints two status lines on stdout before the PNG stream.
/// Skipping them is behavior observed on Inkscape 1.x and has to be
/// re-verified when the pinned tool version changes.
#[derive(Clone, Debug)]
pub struct ExternalRenderer {
    program: PathBuf,
}

impl Default for ExternalRenderer {
    fn default() -> Self {
        ExternalRenderer { program: PathBuf::from("inkscape") }
    }
}

impl ExternalRenderer {
    /// Creates a backend backed by a specific executable.
    pub fn with_program<P: Into<PathBuf>>(program: P) -> Self {
        ExternalRenderer { program: program.into() }
    }
}

impl Render for ExternalRenderer {
    fn render(&self, doc: &Document, size: ScreenSize, opt: &Options) -> Result<Image, Error> {
        let path = doc.path().ok_or(Error::NoBackingFile)?;
        if !path.exists() {
            return Err(Error::Render(format!("{:?} does not exist", path)));
        }

        let mut cmd = Command::new(&self.program);
        cmd.arg("--export-filename=-").arg("--export-type=png");

        match opt.area {
            Area::Page => {
                cmd.arg("--export-area-page");
            }
            Area::Drawing => {
                cmd.arg("--export-area-drawing");
            }
            Area::Custom { x, y, width, height } => {
                cmd.arg(format!("--export-area={}:{}:{}:{}", x, y, x + width, y + height));
            }
        }

        cmd.arg(format!("--export-width={}", size.width()));
        cmd.arg(format!("--export-height={}", size.height()));

        if let Some(margin) = opt.margin {
            cmd.arg(format!("--export-margin={}", margin));
        }

        cmd.arg(path);
        cmd.stdin(Stdio::null());

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ToolNotFound(self.program.display().to_string())
            } else {
                Error::Render(e.to_string())
            }
        })?;

        if !output.status.success() {
            return Err(Error::Render(format!(
                "'{}' exited with {}",
                self.program.display(),
                output.status
            )));
        }

        let data = skip_status_lines(&output.stdout);
        let decoded = image::load_from_memory_with_format(data, image::ImageFormat::Png)
            .map_err(|e| Error::Render(e.to_string()))?;

        Ok(Image::from_rgba(decoded.to_rgba8()))
    }
}

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

// Drops the two status lines Inkscape prints before the image data,
// unless the stream already starts with a PNG signature.
fn skip_status_lines(data: &[u8]) -> &[u8] {
    let mut rest = data;
    for _ in 0..2 {
        if rest.starts_with(PNG_MAGIC) {
            break;
        }

        match rest.iter().position(|&b| b == b'\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => break,
        }
    }

    rest
}

/// Renders the document at every requested size.
///
/// With [`Filter::Rerender`] each size is rasterized from scratch. Any
/// other filter renders once at the maximal bounding size and downscales.
/// The result order matches `sizes` either way. A single requested size is
/// always one direct backend call with no resampling involved.
pub fn render_all(
    doc: &Document,
    sizes: &[ScreenSize],
    filter: Filter,
    backend: &dyn Render,
    opt: &Options,
) -> Result<Vec<Image>, Error> {
    if sizes.is_empty() {
        return Ok(Vec::new());
    }

    if sizes.len() == 1 {
        return Ok(vec![backend.render(doc, sizes[0], opt)?]);
    }

    let kind = match filter.resample_kind() {
        Some(kind) => kind,
        None => {
            let mut images = Vec::with_capacity(sizes.len());
            for size in sizes {
                images.push(backend.render(doc, *size, opt)?);
            }
            return Ok(images);
        }
    };

    let intrinsic = doc.size(opt)?;
    let bounding = max_bounding_size(intrinsic, sizes);
    let image = backend.render(doc, bounding, opt)?;

    Ok(sizes.iter().map(|size| image.resize(*size, kind)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingRenderer(Cell<usize>);

    impl Render for CountingRenderer {
        fn render(&self, _: &Document, size: ScreenSize, _: &Options) -> Result<Image, Error> {
            self.0.set(self.0.get() + 1);
            Ok(Image::from_rgba(image::RgbaImage::new(size.width(), size.height())))
        }
    }

    fn doc() -> Document {
        Document::from_str(
            "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 50'/>",
        )
        .unwrap()
    }

    fn size(width: u32, height: u32) -> ScreenSize {
        ScreenSize::new(width, height).unwrap()
    }

    #[test]
    fn filter_names() {
        assert_eq!(Filter::from_str("nearest").unwrap(), Filter::Nearest);
        assert_eq!(Filter::from_str("lanczos").unwrap(), Filter::Lanczos);
        assert_eq!(Filter::from_str("bilinear").unwrap(), Filter::Bilinear);
        assert_eq!(Filter::from_str("bicubic").unwrap(), Filter::Bicubic);
        assert_eq!(Filter::from_str("box").unwrap(), Filter::Box);
        assert_eq!(Filter::from_str("hamming").unwrap(), Filter::Hamming);
        assert_eq!(Filter::from_str("rerender").unwrap(), Filter::Rerender);
        assert!(Filter::from_str("sinc").is_err());
        assert!(Filter::from_str("Lanczos").is_err());
    }

    #[test]
    fn unknown_renderer_is_rejected() {
        assert!(renderer_by_name("embedded").is_ok());
        assert!(renderer_by_name("external").is_ok());
        assert!(renderer_by_name("cairo").is_err());
    }

    #[test]
    fn rerender_invokes_backend_per_size() {
        let backend = CountingRenderer(Cell::new(0));
        let sizes = [size(100, 50), size(50, 25), size(10, 5)];

        let images =
            render_all(&doc(), &sizes, Filter::Rerender, &backend, &Options::default()).unwrap();

        assert_eq!(backend.0.get(), 3);
        let rendered: Vec<_> = images.iter().map(|i| i.size()).collect();
        assert_eq!(rendered, sizes);
    }

    #[test]
    fn resampling_renders_once() {
        let backend = CountingRenderer(Cell::new(0));
        let sizes = [size(200, 100), size(64, 64)];

        let images =
            render_all(&doc(), &sizes, Filter::Lanczos, &backend, &Options::default()).unwrap();

        assert_eq!(backend.0.get(), 1);
        let rendered: Vec<_> = images.iter().map(|i| i.size()).collect();
        assert_eq!(rendered, sizes);
    }

    #[test]
    fn single_size_is_a_direct_call() {
        let backend = CountingRenderer(Cell::new(0));

        let images =
            render_all(&doc(), &[size(30, 15)], Filter::Lanczos, &backend, &Options::default())
                .unwrap();

        assert_eq!(backend.0.get(), 1);
        assert_eq!(images[0].size(), size(30, 15));
    }

    #[test]
    fn status_lines_are_skipped() {
        let stream = b"one\ntwo\n\x89PNGrest";
        assert_eq!(skip_status_lines(stream), b"\x89PNGrest");
    }

    #[test]
    fn clean_png_stream_is_untouched() {
        let stream = b"\x89PNGrest";
        assert_eq!(skip_status_lines(stream), b"\x89PNGrest");
    }
}
