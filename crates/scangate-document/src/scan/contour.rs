// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document boundary search — edge mask, external contours, and 4-vertex
// polygon approximation.

use image::{DynamicImage, GrayImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::morphology::close;
use imageproc::point::Point;
use scangate_core::ThresholdProfile;
use tracing::{debug, info, instrument};

use crate::image::bt601_luma;

/// Sigma matching a 5x5 Gaussian kernel.
const BLUR_SIGMA: f32 = 1.1;
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;
/// Radius of the square closing element (1 => 3x3).
const CLOSING_RADIUS: u8 = 1;
/// Only the largest contours are considered.
const MAX_CANDIDATES: usize = 10;
/// Approximation tolerance as a fraction of the contour perimeter.
const APPROX_EPSILON_FRACTION: f64 = 0.02;

/// A four-vertex document outline in pixel coordinates.
///
/// Vertices are in contour order; canonical corner order is assigned later
/// by the deskewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub points: [(f32, f32); 4],
    /// Enclosed area as a fraction of the whole image.
    pub area_ratio: f64,
}

/// Finds the most plausible document outline in a photo.
#[derive(Debug, Clone, Copy)]
pub struct ContourLocator<'p> {
    profile: &'p ThresholdProfile,
}

impl<'p> ContourLocator<'p> {
    pub fn new(profile: &'p ThresholdProfile) -> Self {
        Self { profile }
    }

    /// Search the image for a document outline.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn locate(&self, image: &DynamicImage) -> Option<Quad> {
        self.locate_gray(&bt601_luma(image))
    }

    /// Search a grayscale view for a document outline.
    ///
    /// ## Pipeline
    ///
    /// 1. Gaussian blur to suppress sensor noise
    /// 2. Canny edge detection
    /// 3. Morphological closing to bridge broken edge segments
    /// 4. External contour extraction
    /// 5. Sort by enclosed area, keep the largest ten
    /// 6. Drop candidates below the minimum document-area ratio
    /// 7. Return the first whose approximation has exactly four vertices
    pub fn locate_gray(&self, gray: &GrayImage) -> Option<Quad> {
        let (width, height) = gray.dimensions();
        let image_area = width as f64 * height as f64;
        if image_area == 0.0 {
            return None;
        }

        let blurred = gaussian_blur_f32(gray, BLUR_SIGMA);
        let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);
        let closed = close(&edges, Norm::LInf, CLOSING_RADIUS);

        let mut candidates: Vec<(f64, Vec<Point<i32>>)> = find_contours::<i32>(&closed)
            .into_iter()
            .filter(|c| c.parent.is_none() && matches!(c.border_type, BorderType::Outer))
            .map(|c| (contour_area(&c.points), c.points))
            .collect();
        debug!(contours = candidates.len(), "External contours extracted");

        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (rank, (area, points)) in candidates.iter().take(MAX_CANDIDATES).enumerate() {
            let area_ratio = area / image_area;
            if area_ratio < self.profile.min_doc_area_ratio {
                debug!(rank, area_ratio, "Candidate too small; skipping");
                continue;
            }

            let epsilon = APPROX_EPSILON_FRACTION * arc_length(points, true);
            let approx = approximate_closed_polygon(points, epsilon);
            debug!(rank, area_ratio, vertices = approx.len(), "Candidate approximated");

            if let [a, b, c, d] = approx.as_slice() {
                let quad = Quad {
                    points: [a, b, c, d].map(|p| (p.x as f32, p.y as f32)),
                    area_ratio,
                };
                info!(rank, area_ratio, points = ?quad.points, "Document outline found");
                return Some(quad);
            }
        }

        info!("No four-sided document outline found");
        None
    }
}

// -- Geometry helpers ---------------------------------------------------------

/// Area enclosed by a closed contour, via the shoelace formula.
fn contour_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x as i64 * points[j].y as i64;
        twice_area -= points[j].x as i64 * points[i].y as i64;
    }
    twice_area.abs() as f64 / 2.0
}

/// Douglas–Peucker simplification of a closed curve.
///
/// The curve is split at two mutually distant points and each half is
/// simplified as an open chain, so the result does not depend on where
/// tracing started. The returned polygon is implicitly closed (the first
/// vertex is not repeated).
fn approximate_closed_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 || epsilon <= 0.0 {
        return points.to_vec();
    }

    let far = farthest_from(points, points[0]);
    let opposite = farthest_from(points, points[far]);
    let (a, b) = (far.min(opposite), far.max(opposite));
    if a == b {
        return vec![points[a]];
    }

    let forward = &points[a..=b];
    let backward: Vec<Point<i32>> = points[b..]
        .iter()
        .chain(points[..=a].iter())
        .copied()
        .collect();

    // [A .. B] followed by [B .. A]; drop the shared endpoints once each.
    let mut polygon = approximate_polygon_dp(forward, epsilon, false);
    polygon.pop();
    polygon.extend(approximate_polygon_dp(&backward, epsilon, false));
    polygon.pop();
    polygon
}

/// Index of the point farthest from `origin`; the first one wins ties.
fn farthest_from(points: &[Point<i32>], origin: Point<i32>) -> usize {
    let mut best = 0;
    let mut best_dist = -1i64;
    for (i, p) in points.iter().enumerate() {
        let dx = (p.x - origin.x) as i64;
        let dy = (p.y - origin.y) as i64;
        let dist = dx * dx + dy * dy;
        if dist > best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

// -- Tests --------------------------------------------------------------------
