// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use crate::error::Error;

/// The document area to render.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Area {
    /// The full page/canvas.
    Page,

    /// The tight bounding box of the visible content.
    Drawing,

    /// An explicit rectangle in document coordinates.
    Custom {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Rectangle width.
        width: f64,
        /// Rectangle height.
        height: f64,
    },
}

impl Default for Area {
    fn default() -> Self {
        Area::Page
    }
}

impl FromStr for Area {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Error> {
        match text {
            "page" => Ok(Area::Page),
            "drawing" => Ok(Area::Drawing),
            _ => {
                let invalid = || Error::InvalidAttribute {
                    name: "area",
                    value: text.to_string(),
                };

                let mut numbers = Vec::with_capacity(4);
                for part in text.split_whitespace() {
                    numbers.push(part.parse::<f64>().map_err(|_| invalid())?);
                }

                if numbers.len() != 4 || numbers[2] <= 0.0 || numbers[3] <= 0.0 {
                    return Err(invalid());
                }

                Ok(Area::Custom {
                    x: numbers[0],
                    y: numbers[1],
                    width: numbers[2],
                    height: numbers[3],
                })
            }
        }
    }
}

/// Processing options.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// Target DPI.
    ///
    /// Impacts the resolution of physical units and DPI-based size planning.
    ///
    /// Default: 72 on macOS, 96 everywhere else.
    pub dpi: f64,

    /// The document area to render.
    ///
    /// Explicit rectangles are only supported by the external renderer.
    ///
    /// Default: page.
    pub area: Area,

    /// An additional margin around the rendered area, in pixels.
    ///
    /// Only supported by the external renderer.
    ///
    /// Default: none.
    pub margin: Option<u32>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            dpi: base_dpi(),
            area: Area::default(),
            margin: None,
        }
    }
}

/// Returns the base DPI of the host platform.
pub fn base_dpi() -> f64 {
    if cfg!(target_os = "macos") {
        72.0
    } else {
        96.0
    }
}
