// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt;

/// A 2D screen size representation.
///
/// Width and height are always positive.
#[derive(Clone, Copy, PartialEq)]
pub struct ScreenSize {
    width: u32,
    height: u32,
}

impl ScreenSize {
    /// Creates a new `ScreenSize` from values.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width > 0 && height > 0 {
            Some(ScreenSize { width, height })
        } else {
            None
        }
    }

    /// Returns width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns width and height as a tuple.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl fmt::Debug for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ScreenSize({} {})", self.width, self.height)
    }
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A requested output size.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SizeRequest {
    /// Width in pixels. Height is derived from the source aspect ratio.
    Width(u32),

    /// Exact width and height in pixels.
    WidthHeight(u32, u32),
}

/// Resolves DPI values and size requests into concrete pixel sizes.
///
/// DPI-derived sizes come first, then the explicitly requested ones,
/// both in input order. When neither list has entries the intrinsic
/// size is returned alone.
pub fn plan_sizes(
    intrinsic: ScreenSize,
    dpi_list: &[u32],
    requests: &[SizeRequest],
    base_dpi: f64,
) -> Vec<ScreenSize> {
    if dpi_list.is_empty() && requests.is_empty() {
        return vec![intrinsic];
    }

    let w = intrinsic.width() as f64;
    let h = intrinsic.height() as f64;

    let mut sizes = Vec::with_capacity(dpi_list.len() + requests.len());

    for dpi in dpi_list {
        let scale = f64::from(*dpi) / base_dpi;
        let size = ScreenSize::new((w * scale).round() as u32, (h * scale).round() as u32);
        match size {
            Some(size) => sizes.push(size),
            None => log::warn!("{} DPI produces an empty image. Skipped.", dpi),
        }
    }

    for request in requests {
        let size = match *request {
            SizeRequest::Width(width) => {
                ScreenSize::new(width, (f64::from(width) * h / w).round() as u32)
            }
            SizeRequest::WidthHeight(width, height) => ScreenSize::new(width, height),
        };

        match size {
            Some(size) => sizes.push(size),
            None => log::warn!("{:?} produces an empty image. Skipped.", request),
        }
    }

    sizes
}

/// Returns the smallest size that covers every size in `sizes` without upscaling.
///
/// The result keeps the intrinsic aspect ratio and dominates every entry in
/// both dimensions, so a single render at this size can be downscaled into
/// all of them.
pub fn max_bounding_size(intrinsic: ScreenSize, sizes: &[ScreenSize]) -> ScreenSize {
    let mut max_width = 0;
    let mut max_height = 0;
    for size in sizes {
        max_width = max_width.max(size.width());
        max_height = max_height.max(size.height());
    }

    if max_width == 0 || max_height == 0 {
        return intrinsic;
    }

    let scale = (max_width as f64 / intrinsic.width() as f64)
        .max(max_height as f64 / intrinsic.height() as f64);

    let width = (intrinsic.width() as f64 * scale).round() as u32;
    let height = (intrinsic.height() as f64 * scale).round() as u32;

    // Unwrap is safe, because `scale` is positive.
    ScreenSize::new(width, height).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(width: u32, height: u32) -> ScreenSize {
        ScreenSize::new(width, height).unwrap()
    }

    #[test]
    fn no_requests_yield_intrinsic() {
        assert_eq!(plan_sizes(size(100, 50), &[], &[], 96.0), vec![size(100, 50)]);
    }

    #[test]
    fn base_dpi_is_identity() {
        assert_eq!(plan_sizes(size(100, 50), &[96], &[], 96.0), vec![size(100, 50)]);
    }

    #[test]
    fn dpi_scales_both_dimensions() {
        assert_eq!(plan_sizes(size(100, 50), &[192], &[], 96.0), vec![size(200, 100)]);
    }

    #[test]
    fn width_request_keeps_aspect() {
        let planned = plan_sizes(size(100, 50), &[], &[SizeRequest::Width(200)], 96.0);
        assert_eq!(planned, vec![size(200, 100)]);
    }

    #[test]
    fn pair_request_is_used_as_is() {
        let planned = plan_sizes(size(100, 50), &[], &[SizeRequest::WidthHeight(30, 40)], 96.0);
        assert_eq!(planned, vec![size(30, 40)]);
    }

    #[test]
    fn dpi_sizes_come_first() {
        let planned = plan_sizes(
            size(100, 50),
            &[96, 48],
            &[SizeRequest::Width(10), SizeRequest::WidthHeight(7, 3)],
            96.0,
        );
        assert_eq!(
            planned,
            vec![size(100, 50), size(50, 25), size(10, 5), size(7, 3)]
        );
    }

    #[test]
    fn bounding_dominates_every_size() {
        let sizes = [size(300, 20), size(40, 160), size(64, 64)];
        let bounding = max_bounding_size(size(100, 50), &sizes);
        for s in &sizes {
            assert!(bounding.width() >= s.width());
            assert!(bounding.height() >= s.height());
        }
    }

    #[test]
    fn bounding_keeps_aspect() {
        assert_eq!(max_bounding_size(size(100, 50), &[size(50, 100)]), size(200, 100));
    }

    #[test]
    fn bounding_of_empty_list_is_intrinsic() {
        assert_eq!(max_bounding_size(size(100, 50), &[]), size(100, 50));
    }
}
