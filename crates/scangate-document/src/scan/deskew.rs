// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective deskew — canonical corner ordering, target size, and the
// projective warp to a flat top-down view.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use scangate_core::error::ScangateError;
use tracing::{debug, info, instrument};

use super::contour::Quad;

/// Quads enclosing less than this many square pixels are degenerate.
const MIN_QUAD_AREA: f32 = 1.0;

/// Quad corners in canonical top-left, top-right, bottom-right, bottom-left
/// order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedCorners {
    pub top_left: (f32, f32),
    pub top_right: (f32, f32),
    pub bottom_right: (f32, f32),
    pub bottom_left: (f32, f32),
}

impl OrderedCorners {
    /// Assign corners from the per-point sum `x + y` and difference `y - x`.
    ///
    /// Top-left has the smallest sum and bottom-right the largest; top-right
    /// has the smallest difference and bottom-left the largest. Ties go to the
    /// earliest point. When the document is turned close to 45 degrees two
    /// extremes can land on the same point.
    pub fn from_points(points: &[(f32, f32); 4]) -> Self {
        let sums = points.map(|(x, y)| x + y);
        let diffs = points.map(|(x, y)| y - x);
        Self {
            top_left: points[arg_min(&sums)],
            top_right: points[arg_min(&diffs)],
            bottom_right: points[arg_max(&sums)],
            bottom_left: points[arg_max(&diffs)],
        }
    }

    /// Corners as an array in canonical order.
    pub fn as_array(&self) -> [(f32, f32); 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Output size: the longer of each pair of opposite edges, rounded.
    pub fn target_dimensions(&self) -> (i64, i64) {
        let width = distance(self.bottom_right, self.bottom_left)
            .max(distance(self.top_right, self.top_left));
        let height = distance(self.top_right, self.bottom_right)
            .max(distance(self.top_left, self.bottom_left));
        (width.round() as i64, height.round() as i64)
    }

    /// Whether two canonical corners landed on the same point.
    fn has_repeated_corner(&self) -> bool {
        let corners = self.as_array();
        (0..4).any(|i| (i + 1..4).any(|j| corners[i] == corners[j]))
    }
}

/// A flattened, axis-aligned view of the document.
#[derive(Debug, Clone)]
pub struct RectifiedImage {
    pub image: RgbImage,
    /// The source corners that map onto the output's corners.
    pub corners: OrderedCorners,
}

impl RectifiedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Warps the region inside a [`Quad`] to a rectangle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deskewer;

impl Deskewer {
    pub fn new() -> Self {
        Self
    }

    /// Rectify the quad's region of `image` into a top-down view.
    ///
    /// The destination rectangle has corners `(0, 0)`, `(w-1, 0)`,
    /// `(w-1, h-1)`, `(0, h-1)`. Pixels are resampled bilinearly through the
    /// inverse projection; samples falling outside the source are black.
    #[instrument(skip_all, fields(points = ?quad.points))]
    pub fn deskew(&self, image: &DynamicImage, quad: &Quad) -> Result<RectifiedImage, ScangateError> {
        let corners = OrderedCorners::from_points(&quad.points);
        debug!(
            top_left = ?corners.top_left,
            top_right = ?corners.top_right,
            bottom_right = ?corners.bottom_right,
            bottom_left = ?corners.bottom_left,
            "Corners ordered"
        );

        if corners.has_repeated_corner() {
            return Err(ScangateError::Rectification(format!(
                "corner assignment collapsed two corners onto one point: {:?}",
                corners.as_array()
            )));
        }

        let area = shoelace_area(&corners.as_array());
        if area < MIN_QUAD_AREA {
            return Err(ScangateError::Rectification(format!(
                "quadrilateral encloses no area ({area})"
            )));
        }

        let (width, height) = corners.target_dimensions();
        if width < 2 || height < 2 {
            return Err(ScangateError::Rectification(format!(
                "computed output size {width}x{height} is degenerate"
            )));
        }
        let (out_w, out_h) = (width as u32, height as u32);

        let right = (out_w - 1) as f32;
        let bottom = (out_h - 1) as f32;
        let dest: [(f32, f32); 4] = [
            (0.0, 0.0),       // top-left
            (right, 0.0),     // top-right
            (right, bottom),  // bottom-right
            (0.0, bottom),    // bottom-left
        ];

        // from_control_points computes the mapping from source to `dest`.
        let projection = Projection::from_control_points(corners.as_array(), dest)
            .ok_or_else(|| {
                ScangateError::Rectification("failed to compute projective transform".into())
            })?;

        let source = image.to_rgb8();
        let mut output = RgbImage::new(out_w, out_h);
        warp_into(
            &source,
            &projection,
            Interpolation::Bilinear,
            Rgb([0u8, 0, 0]),
            &mut output,
        );

        info!(out_w, out_h, "Perspective correction applied");
        Ok(RectifiedImage {
            image: output,
            corners,
        })
    }
}

// -- Helpers ------------------------------------------------------------------

fn arg_min(values: &[f32; 4]) -> usize {
    let mut best = 0;
    for i in 1..4 {
        if values[i] < values[best] {
            best = i;
        }
    }
    best
}

fn arg_max(values: &[f32; 4]) -> usize {
    let mut best = 0;
    for i in 1..4 {
        if values[i] > values[best] {
            best = i;
        }
    }
    best
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Compute the area of a quadrilateral given by four vertices using the
/// shoelace formula. The vertices should be in order (CW or CCW).
fn shoelace_area(corners: &[(f32, f32); 4]) -> f32 {
    let n = corners.len();
    let mut area = 0.0f32;
    for i in 0..n {
        let j = (i + 1) % n;
        area += corners[i].0 * corners[j].1;
        area -= corners[j].0 * corners[i].1;
    }
    area.abs() / 2.0
}

// -- Tests --------------------------------------------------------------------
