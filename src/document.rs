// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use svgtypes::ViewBox;
use xmlwriter::XmlWriter;

use crate::error::Error;
use crate::geom::ScreenSize;
use crate::options::Options;
use crate::units::Length;

const DEFAULT_WIDTH: &str = "100vw";
const DEFAULT_HEIGHT: &str = "100vh";

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

fn default_view_box() -> ViewBox {
    ViewBox::new(0.0, 0.0, 300.0, 150.0)
}

/// An SVG document with editable root attributes.
///
/// Only the attributes the conversion pipeline cares about are modeled:
/// `width`, `height` and `viewBox`. Everything else round-trips through
/// [`save`](Self::save) untouched.
#[derive(Clone, Debug)]
pub struct Document {
    text: String,
    path: Option<PathBuf>,
    width: Option<String>,
    height: Option<String>,
    view_box: Option<ViewBox>,
}

impl Document {
    /// Loads a document from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let text =
            std::fs::read_to_string(&path).map_err(|_| Error::LoadFailed(path.clone()))?;
        Self::from_parts(text, Some(path))
    }

    /// Parses a document from a string.
    ///
    /// Such a document has no backing file: it cannot be saved in place and
    /// cannot be rendered by the external backend.
    pub fn from_str(text: &str) -> Result<Self, Error> {
        Self::from_parts(text.to_string(), None)
    }

    fn from_parts(text: String, path: Option<PathBuf>) -> Result<Self, Error> {
        let (width, height, view_box) = {
            let xml = roxmltree::Document::parse(&text)?;
            let root = xml.root_element();

            if root.tag_name().name() != "svg" {
                return Err(Error::NotAnSvg);
            }

            let view_box = match root.attribute("viewBox") {
                Some(text) => Some(ViewBox::from_str(text).map_err(|_| {
                    Error::InvalidAttribute { name: "viewBox", value: text.to_string() }
                })?),
                None => None,
            };

            (
                root.attribute("width").map(|v| v.to_string()),
                root.attribute("height").map(|v| v.to_string()),
                view_box,
            )
        };

        Ok(Document { text, path, width, height, view_box })
    }

    /// Returns the path the document was loaded from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the document's `viewBox`.
    ///
    /// A missing attribute is materialized as the `0 0 300 150` default.
    pub fn view_box(&mut self) -> ViewBox {
        *self.view_box.get_or_insert_with(default_view_box)
    }

    /// Sets the `viewBox` attribute.
    ///
    /// The value is serialized as four space-separated integers.
    pub fn set_view_box(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.view_box = Some(ViewBox::new(
            f64::from(x),
            f64::from(y),
            f64::from(width),
            f64::from(height),
        ));
    }

    /// Returns the `width` attribute. Defaults to `100vw`.
    pub fn width(&mut self) -> &str {
        self.width.get_or_insert_with(|| DEFAULT_WIDTH.to_string())
    }

    /// Returns the `height` attribute. Defaults to `100vh`.
    pub fn height(&mut self) -> &str {
        self.height.get_or_insert_with(|| DEFAULT_HEIGHT.to_string())
    }

    /// Sets the `width` attribute.
    ///
    /// Accepts a positive integer optionally followed by `px`,
    /// or a positive number followed by `vw`, `vh` or `%`.
    pub fn set_width(&mut self, value: &str) -> Result<(), Error> {
        if !is_valid_dimension(value) {
            return Err(Error::InvalidAttribute { name: "width", value: value.to_string() });
        }

        self.width = Some(value.to_string());
        Ok(())
    }

    /// Sets the `height` attribute.
    ///
    /// Same format as [`set_width`](Self::set_width).
    pub fn set_height(&mut self, value: &str) -> Result<(), Error> {
        if !is_valid_dimension(value) {
            return Err(Error::InvalidAttribute { name: "height", value: value.to_string() });
        }

        self.height = Some(value.to_string());
        Ok(())
    }

    /// Returns the document size in pixels. Defaults to 300x150.
    ///
    /// The size is derived from the `viewBox`. When the `width`/`height`
    /// attribute carries a physical unit, the matching dimension is
    /// converted through it; the fractional part is truncated.
    pub fn size(&self, opt: &Options) -> Result<ScreenSize, Error> {
        let view_box = self.view_box.unwrap_or_else(default_view_box);

        let mut w = view_box.w;
        let mut h = view_box.h;

        let width = self.width.as_deref().unwrap_or(DEFAULT_WIDTH);
        let height = self.height.as_deref().unwrap_or(DEFAULT_HEIGHT);

        if let Ok(length) = Length::from_str(width) {
            if length.unit.is_physical() {
                w = Length::new(w, length.unit).to_pixels(opt.dpi, None)?;
            }
        }

        if let Ok(length) = Length::from_str(height) {
            if length.unit.is_physical() {
                h = Length::new(h, length.unit).to_pixels(opt.dpi, None)?;
            }
        }

        ScreenSize::new(w as u32, h as u32).ok_or(Error::InvalidSize)
    }

    /// Serializes the document back to SVG text.
    ///
    /// The root attribute record replaces the original `width`, `height`
    /// and `viewBox`; the rest of the tree is emitted as parsed.
    pub fn to_string(&self) -> Result<String, Error> {
        let xml = roxmltree::Document::parse(&self.text)?;
        let mut writer = XmlWriter::new(xmlwriter::Options::default());
        self.write_element(xml.root_element(), true, &mut writer);
        Ok(writer.end_document())
    }

    /// Overwrites the source file.
    pub fn save(&self) -> Result<(), Error> {
        match self.path.clone() {
            Some(path) => self.save_as(path),
            None => Err(Error::NoBackingFile),
        }
    }

    /// Writes the document to a file.
    pub fn save_as<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let text = self.to_string()?;
        std::fs::write(&path, text).map_err(|_| Error::WriteFailed(path.as_ref().to_path_buf()))
    }

    fn write_element(&self, node: roxmltree::Node, is_root: bool, xml: &mut XmlWriter) {
        xml.start_element(node.tag_name().name());

        if is_root {
            for ns in node.namespaces() {
                match ns.name() {
                    Some(prefix) => xml.write_attribute_fmt(
                        &format!("xmlns:{}", prefix),
                        format_args!("{}", ns.uri()),
                    ),
                    None => xml.write_attribute("xmlns", ns.uri()),
                }
            }

            if let Some(vb) = self.view_box {
                xml.write_attribute_fmt(
                    "viewBox",
                    format_args!("{} {} {} {}", vb.x as i64, vb.y as i64, vb.w as i64, vb.h as i64),
                );
            }

            if let Some(ref width) = self.width {
                xml.write_attribute("width", width);
            }

            if let Some(ref height) = self.height {
                xml.write_attribute("height", height);
            }
        }

        for attr in node.attributes() {
            if is_root && matches!(attr.name(), "width" | "height" | "viewBox") {
                continue;
            }

            // Only the xlink prefix survives the round-trip; other prefixed
            // attributes are emitted with their local name.
            if attr.namespace() == Some(XLINK_NS) {
                xml.write_attribute_fmt(
                    &format!("xlink:{}", attr.name()),
                    format_args!("{}", attr.value()),
                );
            } else {
                xml.write_attribute(attr.name(), attr.value());
            }
        }

        for child in node.children() {
            if child.is_element() {
                self.write_element(child, false, xml);
            } else if child.is_text() {
                if let Some(text) = child.text() {
                    if !text.trim().is_empty() {
                        xml.write_text(text.trim());
                    }
                }
            }
        }

        xml.end_element();
    }
}

// Accepts `10`, `10px`, `10.5vw`, `33%`. No signs, no leading zeros.
fn is_valid_dimension(value: &str) -> bool {
    let idx = value
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or_else(|| value.len());
    let (number, unit) = value.split_at(idx);

    if !number.starts_with(|c: char| ('1'..='9').contains(&c)) {
        return false;
    }

    match unit {
        "" | "px" => number.bytes().all(|b| b.is_ascii_digit()),
        "vw" | "vh" | "%" => number.bytes().filter(|b| *b == b'.').count() <= 1,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt() -> Options {
        Options { dpi: 96.0, ..Options::default() }
    }

    #[test]
    fn size_defaults_to_300x150() {
        let doc = Document::from_str("<svg xmlns='http://www.w3.org/2000/svg'/>").unwrap();
        assert_eq!(doc.size(&opt()).unwrap().dimensions(), (300, 150));
    }

    #[test]
    fn size_follows_view_box() {
        let doc = Document::from_str(
            "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 640 480'/>",
        )
        .unwrap();
        assert_eq!(doc.size(&opt()).unwrap().dimensions(), (640, 480));
    }

    #[test]
    fn physical_units_are_converted() {
        let doc = Document::from_str(
            "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 50' width='100mm'/>",
        )
        .unwrap();

        // 100 * 96 / 25.4, truncated.
        assert_eq!(doc.size(&opt()).unwrap().dimensions(), (377, 50));
    }

    #[test]
    fn view_box_round_trip() {
        let mut doc = Document::from_str("<svg xmlns='http://www.w3.org/2000/svg'/>").unwrap();
        doc.set_view_box(0, 0, 400, 300);
        assert_eq!(doc.view_box(), ViewBox::new(0.0, 0.0, 400.0, 300.0));
    }

    #[test]
    fn view_box_default_is_materialized() {
        let mut doc = Document::from_str("<svg xmlns='http://www.w3.org/2000/svg'/>").unwrap();
        assert_eq!(doc.view_box(), ViewBox::new(0.0, 0.0, 300.0, 150.0));
        assert!(doc.to_string().unwrap().contains("viewBox=\"0 0 300 150\""));
    }

    #[test]
    fn dimension_validation() {
        let mut doc = Document::from_str("<svg xmlns='http://www.w3.org/2000/svg'/>").unwrap();

        assert!(doc.set_width("10").is_ok());
        assert!(doc.set_width("10px").is_ok());
        assert!(doc.set_width("33.3vw").is_ok());
        assert!(doc.set_width("50%").is_ok());

        assert!(doc.set_width("abc").is_err());
        assert!(doc.set_width("0").is_err());
        assert!(doc.set_width("-5").is_err());
        assert!(doc.set_width("10.5px").is_err());
        assert!(doc.set_width("07vw").is_err());
        assert!(doc.set_width("10mm").is_err());
    }

    #[test]
    fn attributes_default_lazily() {
        let mut doc = Document::from_str("<svg xmlns='http://www.w3.org/2000/svg'/>").unwrap();
        assert_eq!(doc.width(), "100vw");
        assert_eq!(doc.height(), "100vh");
    }

    #[test]
    fn serialization_keeps_children() {
        let doc = Document::from_str(
            "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 10 10'>\
                 <rect x='1' y='1' width='8' height='8' fill='green'/>\
             </svg>",
        )
        .unwrap();

        let text = doc.to_string().unwrap();
        assert!(text.contains("<rect"));
        assert!(text.contains("fill=\"green\""));

        // The output must still be a valid document.
        let reparsed = Document::from_str(&text).unwrap();
        assert_eq!(reparsed.size(&opt()).unwrap().dimensions(), (10, 10));
    }

    #[test]
    fn set_width_survives_serialization() {
        let mut doc = Document::from_str(
            "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 10 10' width='10'/>",
        )
        .unwrap();
        doc.set_width("25px").unwrap();

        let text = doc.to_string().unwrap();
        assert!(text.contains("width=\"25px\""));
        assert!(!text.contains("width=\"10\""));
    }

    #[test]
    fn non_svg_root_is_rejected() {
        assert!(Document::from_str("<html xmlns='http://www.w3.org/1999/xhtml'/>").is_err());
    }
}
