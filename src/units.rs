// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use crate::error::Error;

/// A unit that can be normalized into pixels.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Unit {
    Px,
    Mm,
    Cm,
    In,
    Pt,
    Pc,
    Vw,
    Vh,
    Percent,
}

impl Unit {
    /// Returns the unit name.
    pub fn to_str(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::In => "in",
            Unit::Pt => "pt",
            Unit::Pc => "pc",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
            Unit::Percent => "%",
        }
    }

    /// Checks that the unit is an absolute physical one.
    pub fn is_physical(self) -> bool {
        matches!(self, Unit::Mm | Unit::Cm | Unit::In)
    }
}

/// A number with a unit, like `10mm` or `50vw`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Length {
    /// The magnitude. Always positive.
    pub number: f64,
    /// The unit.
    pub unit: Unit,
}

impl Length {
    /// Creates a new `Length` from values.
    pub fn new(number: f64, unit: Unit) -> Self {
        Length { number, unit }
    }

    /// Converts the length into pixels.
    ///
    /// `viewport` is a `(width, height)` pair required to resolve `vw`,
    /// `vh` and percentage lengths. Percentages resolve against the
    /// viewport width.
    pub fn to_pixels(&self, dpi: f64, viewport: Option<(f64, f64)>) -> Result<f64, Error> {
        let n = self.number;
        match self.unit {
            Unit::Px => Ok(n),
            Unit::Mm => Ok(n * dpi / 25.4),
            Unit::Cm => Ok(n * dpi / 2.54),
            Unit::In => Ok(n * dpi),
            Unit::Pt => Ok(n * dpi / 72.0),
            Unit::Pc => Ok(n * dpi / 6.0),
            Unit::Vw | Unit::Percent => match viewport {
                Some((width, _)) => Ok(n * width / 100.0),
                None => Err(Error::MissingViewport(self.unit.to_str())),
            },
            Unit::Vh => match viewport {
                Some((_, height)) => Ok(n * height / 100.0),
                None => Err(Error::MissingViewport(self.unit.to_str())),
            },
        }
    }
}

impl FromStr for Length {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Error> {
        let text = text.trim();

        // `vw` and `vh` are CSS viewport units. SVG lengths don't have them,
        // so they are peeled off before falling back to the SVG grammar.
        let viewport_unit = if let Some(number) = text.strip_suffix("vw") {
            Some((number, Unit::Vw))
        } else if let Some(number) = text.strip_suffix("vh") {
            Some((number, Unit::Vh))
        } else {
            None
        };

        if let Some((number, unit)) = viewport_unit {
            let number: f64 = number
                .trim_end()
                .parse()
                .map_err(|_| Error::InvalidLength(text.to_string()))?;

            if number > 0.0 && number.is_finite() {
                return Ok(Length::new(number, unit));
            }

            return Err(Error::InvalidLength(text.to_string()));
        }

        let length = svgtypes::Length::from_str(text)
            .map_err(|_| Error::InvalidLength(text.to_string()))?;

        let unit = match length.unit {
            svgtypes::LengthUnit::None | svgtypes::LengthUnit::Px => Unit::Px,
            svgtypes::LengthUnit::Mm => Unit::Mm,
            svgtypes::LengthUnit::Cm => Unit::Cm,
            svgtypes::LengthUnit::In => Unit::In,
            svgtypes::LengthUnit::Pt => Unit::Pt,
            svgtypes::LengthUnit::Pc => Unit::Pc,
            svgtypes::LengthUnit::Percent => Unit::Percent,
            svgtypes::LengthUnit::Em | svgtypes::LengthUnit::Ex => {
                return Err(Error::InvalidLength(text.to_string()));
            }
        };

        if length.number > 0.0 && length.number.is_finite() {
            Ok(Length::new(length.number, unit))
        } else {
            Err(Error::InvalidLength(text.to_string()))
        }
    }
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_p {
        ($name:ident, $text:expr, $result:expr) => (
            #[test]
            fn $name() {
                assert_eq!(Length::from_str($text).unwrap(), $result);
            }
        )
    }

    macro_rules! test_err {
        ($name:ident, $text:expr) => (
            #[test]
            fn $name() {
                assert!(Length::from_str($text).is_err());
            }
        )
    }

    test_p!(parse_1, "1",      Length::new(1.0, Unit::Px));
    test_p!(parse_2, "10px",   Length::new(10.0, Unit::Px));
    test_p!(parse_3, "25.4mm", Length::new(25.4, Unit::Mm));
    test_p!(parse_4, "2cm",    Length::new(2.0, Unit::Cm));
    test_p!(parse_5, "1in",    Length::new(1.0, Unit::In));
    test_p!(parse_6, "100vw",  Length::new(100.0, Unit::Vw));
    test_p!(parse_7, "100vh",  Length::new(100.0, Unit::Vh));
    test_p!(parse_8, "33.3%",  Length::new(33.3, Unit::Percent));
    test_p!(parse_9, "12pt",   Length::new(12.0, Unit::Pt));

    test_err!(err_1, "abc");
    test_err!(err_2, "-5mm");
    test_err!(err_3, "");
    test_err!(err_4, "0");
    test_err!(err_5, "1em");
    test_err!(err_6, "px");

    #[test]
    fn one_inch_is_dpi() {
        let px = Length::new(1.0, Unit::In).to_pixels(96.0, None).unwrap();
        assert_eq!(px, 96.0);
    }

    #[test]
    fn one_inch_of_millimeters() {
        let px = Length::new(25.4, Unit::Mm).to_pixels(96.0, None).unwrap();
        assert_eq!(px, 96.0);
    }

    #[test]
    fn percent_resolves_against_width() {
        let px = Length::new(50.0, Unit::Percent)
            .to_pixels(96.0, Some((200.0, 100.0)))
            .unwrap();
        assert_eq!(px, 100.0);
    }

    #[test]
    fn vh_resolves_against_height() {
        let px = Length::new(50.0, Unit::Vh)
            .to_pixels(96.0, Some((200.0, 100.0)))
            .unwrap();
        assert_eq!(px, 50.0);
    }

    #[test]
    fn relative_units_require_viewport() {
        assert!(Length::new(50.0, Unit::Vw).to_pixels(96.0, None).is_err());
        assert!(Length::new(50.0, Unit::Percent).to_pixels(96.0, None).is_err());
    }
}
