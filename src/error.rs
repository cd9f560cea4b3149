// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

/// List of all errors.
#[derive(Debug)]
pub enum Error {
    /// A length string is not a positive number followed by a known unit.
    InvalidLength(String),

    /// Relative units (`vw`, `vh`, `%`) cannot be resolved without a viewport.
    MissingViewport(&'static str),

    /// An attribute value does not match the format the attribute requires.
    InvalidAttribute {
        /// The attribute name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// SVG doesn't have a valid size.
    ///
    /// Occurs when width, height or viewBox resolve to zero pixels.
    InvalidSize,

    /// Only `embedded` and `external` renderers are supported.
    UnsupportedRenderer(String),

    /// An unknown resampling filter was requested.
    InvalidFilter(String),

    /// The external vector tool is not present on the search path.
    ToolNotFound(String),

    /// Rendering failed.
    Render(String),

    /// The export destination directory does not exist.
    DirectoryNotFound(PathBuf),

    /// The document was parsed from a string and has no backing file.
    NoBackingFile,

    /// The document has no `svg` root element.
    NotAnSvg,

    /// Failed to read the source file.
    LoadFailed(PathBuf),

    /// Failed to write an output file.
    WriteFailed(PathBuf),

    /// Failed to parse an SVG data.
    ParsingFailed(roxmltree::Error),
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::ParsingFailed(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::InvalidLength(ref value) => {
                write!(f, "'{}' is not a valid length", value)
            }
            Error::MissingViewport(unit) => {
                write!(f, "a viewport is required to resolve '{}' units", unit)
            }
            Error::InvalidAttribute { name, ref value } => {
                write!(f, "'{}' is not a valid '{}' value", value, name)
            }
            Error::InvalidSize => {
                write!(f, "SVG has an invalid size")
            }
            Error::UnsupportedRenderer(ref name) => {
                write!(f, "'{}' is not a supported renderer", name)
            }
            Error::InvalidFilter(ref name) => {
                write!(f, "'{}' is not a supported resampling filter", name)
            }
            Error::ToolNotFound(ref program) => {
                write!(f, "'{}' was not found on the search path", program)
            }
            Error::Render(ref msg) => {
                write!(f, "rendering failed cause {}", msg)
            }
            Error::DirectoryNotFound(ref dir) => {
                write!(f, "the directory {:?} does not exist", dir)
            }
            Error::NoBackingFile => {
                write!(f, "the document has no backing file")
            }
            Error::NotAnSvg => {
                write!(f, "the document has no 'svg' root element")
            }
            Error::LoadFailed(ref path) => {
                write!(f, "failed to read {:?}", path)
            }
            Error::WriteFailed(ref path) => {
                write!(f, "failed to write {:?}", path)
            }
            Error::ParsingFailed(ref e) => {
                write!(f, "SVG data parsing failed cause {}", e)
            }
        }
    }
}

impl std::error::Error for Error {}
