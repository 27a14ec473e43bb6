// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quality gate — an ordered list of independent numeric checks over the
// grayscale view of a photo. Evaluation stops at the first failing check.

use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use scangate_core::error::ScangateError;
use scangate_core::{QualityFailure, ThresholdProfile};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::image::bt601_luma;

/// Canny hysteresis thresholds for the edge-density check.
pub const EDGE_CANNY_LOW: f32 = 50.0;
pub const EDGE_CANNY_HIGH: f32 = 150.0;

/// The value a check measured and the threshold it was compared against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub value: f64,
    pub limit: f64,
}

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckOutcome {
    pub passed: bool,
    pub measurement: Measurement,
}

/// Result of running the whole gate over one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum QualityVerdict {
    Pass,
    Fail {
        reason: QualityFailure,
        /// Headline plus the shared photography instructions.
        message: String,
        measurement: Measurement,
    },
}

impl QualityVerdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// The failing check, if any.
    pub fn failure(&self) -> Option<QualityFailure> {
        match self {
            Self::Pass => None,
            Self::Fail { reason, .. } => Some(*reason),
        }
    }

    /// `Ok(())` on pass, `Err(ScangateError::Quality)` on failure.
    pub fn into_result(self) -> Result<(), ScangateError> {
        match self {
            Self::Pass => Ok(()),
            Self::Fail { reason, .. } => Err(ScangateError::Quality(reason)),
        }
    }
}

/// One entry of the gate: the failure it reports and the predicate that
/// decides it.
pub struct QualityCheck {
    pub failure: QualityFailure,
    evaluate: CheckFn,
}

type CheckFn = fn(&GrayImage, &ThresholdProfile) -> CheckOutcome;

/// Checks in evaluation order. Reordering this table reorders the gate.
pub static CHECKS: [QualityCheck; 6] = [
    QualityCheck {
        failure: QualityFailure::Blurry,
        evaluate: check_blur,
    },
    QualityCheck {
        failure: QualityFailure::LowResolution,
        evaluate: check_resolution,
    },
    QualityCheck {
        failure: QualityFailure::LowContrast,
        evaluate: check_contrast,
    },
    QualityCheck {
        failure: QualityFailure::Glare,
        evaluate: check_glare,
    },
    QualityCheck {
        failure: QualityFailure::Dark,
        evaluate: check_darkness,
    },
    QualityCheck {
        failure: QualityFailure::LowEdgeDensity,
        evaluate: check_edge_density,
    },
];

/// Runs [`CHECKS`] against a borrowed threshold profile.
#[derive(Debug, Clone, Copy)]
pub struct QualityGate<'p> {
    profile: &'p ThresholdProfile,
}

impl<'p> QualityGate<'p> {
    pub fn new(profile: &'p ThresholdProfile) -> Self {
        Self { profile }
    }

    /// Evaluate every check in order on the image's grayscale view.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn evaluate(&self, image: &DynamicImage) -> QualityVerdict {
        self.evaluate_gray(&bt601_luma(image))
    }

    /// Evaluate every check in order, stopping at the first failure.
    pub fn evaluate_gray(&self, gray: &GrayImage) -> QualityVerdict {
        let failed = CHECKS.iter().find_map(|check| {
            let outcome = (check.evaluate)(gray, self.profile);
            debug!(
                check = check.failure.tag(),
                value = outcome.measurement.value,
                limit = outcome.measurement.limit,
                passed = outcome.passed,
                "Quality check evaluated"
            );
            (!outcome.passed).then_some((check.failure, outcome.measurement))
        });

        match failed {
            None => {
                info!("Image passed the quality gate");
                QualityVerdict::Pass
            }
            Some((reason, measurement)) => {
                info!(
                    reason = reason.tag(),
                    value = measurement.value,
                    limit = measurement.limit,
                    "Image rejected by the quality gate"
                );
                QualityVerdict::Fail {
                    reason,
                    message: reason.message(),
                    measurement,
                }
            }
        }
    }

    /// Run one check in isolation, ignoring its position in the order.
    pub fn check(&self, failure: QualityFailure, gray: &GrayImage) -> CheckOutcome {
        let evaluate: CheckFn = match failure {
            QualityFailure::Blurry => check_blur,
            QualityFailure::LowResolution => check_resolution,
            QualityFailure::LowContrast => check_contrast,
            QualityFailure::Glare => check_glare,
            QualityFailure::Dark => check_darkness,
            QualityFailure::LowEdgeDensity => check_edge_density,
        };
        evaluate(gray, self.profile)
    }
}

// -- Predicates ---------------------------------------------------------------

fn check_blur(gray: &GrayImage, profile: &ThresholdProfile) -> CheckOutcome {
    let variance = laplacian_variance(gray);
    CheckOutcome {
        passed: variance >= profile.blur_threshold,
        measurement: Measurement {
            value: variance,
            limit: profile.blur_threshold,
        },
    }
}

/// Reports the worse of the two axes as a fraction of the required size.
fn check_resolution(gray: &GrayImage, profile: &ThresholdProfile) -> CheckOutcome {
    let (width, height) = gray.dimensions();
    let width_ratio = width as f64 / profile.min_width.max(1) as f64;
    let height_ratio = height as f64 / profile.min_height.max(1) as f64;
    CheckOutcome {
        passed: width >= profile.min_width && height >= profile.min_height,
        measurement: Measurement {
            value: width_ratio.min(height_ratio),
            limit: 1.0,
        },
    }
}

fn check_contrast(gray: &GrayImage, profile: &ThresholdProfile) -> CheckOutcome {
    let (_, std_dev) = intensity_stats(gray);
    CheckOutcome {
        passed: std_dev >= profile.min_contrast,
        measurement: Measurement {
            value: std_dev,
            limit: profile.min_contrast,
        },
    }
}

fn check_glare(gray: &GrayImage, profile: &ThresholdProfile) -> CheckOutcome {
    let ratio = bright_fraction(gray, profile.glare_brightness);
    CheckOutcome {
        passed: ratio <= profile.glare_threshold,
        measurement: Measurement {
            value: ratio,
            limit: profile.glare_threshold,
        },
    }
}

fn check_darkness(gray: &GrayImage, profile: &ThresholdProfile) -> CheckOutcome {
    let (mean, _) = intensity_stats(gray);
    CheckOutcome {
        passed: mean >= profile.darkness_threshold,
        measurement: Measurement {
            value: mean,
            limit: profile.darkness_threshold,
        },
    }
}

fn check_edge_density(gray: &GrayImage, profile: &ThresholdProfile) -> CheckOutcome {
    let density = edge_density(gray);
    CheckOutcome {
        passed: density >= profile.min_edge_density,
        measurement: Measurement {
            value: density,
            limit: profile.min_edge_density,
        },
    }
}

// -- Metrics ------------------------------------------------------------------

/// Variance of the 4-neighbour Laplacian response.
///
/// Kernel `[0 1 0; 1 -4 1; 0 1 0]`, with borders reflected about the edge
/// pixel (`dcb|abcd|cba`).
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    let count = width as u64 * height as u64;
    if count == 0 {
        return 0.0;
    }

    let at = |x: i64, y: i64| -> f64 {
        gray.get_pixel(reflect(x, width), reflect(y, height)).0[0] as f64
    };

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let response =
                at(x, y - 1) + at(x - 1, y) + at(x + 1, y) + at(x, y + 1) - 4.0 * at(x, y);
            sum += response;
            sum_sq += response * response;
        }
    }

    let mean = sum / count as f64;
    (sum_sq / count as f64 - mean * mean).max(0.0)
}

/// Mirror an out-of-range coordinate back inside `0..len`.
fn reflect(i: i64, len: u32) -> u32 {
    let len = len as i64;
    if len == 1 {
        return 0;
    }
    let mirrored = if i < 0 {
        -i
    } else if i >= len {
        2 * len - 2 - i
    } else {
        i
    };
    mirrored as u32
}

/// Mean and population standard deviation of the grayscale intensities.
pub fn intensity_stats(gray: &GrayImage) -> (f64, f64) {
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return (0.0, 0.0);
    }

    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let n = count as f64;
    let mean = histogram
        .iter()
        .enumerate()
        .map(|(level, &c)| level as f64 * c as f64)
        .sum::<f64>()
        / n;
    let variance = histogram
        .iter()
        .enumerate()
        .map(|(level, &c)| (level as f64 - mean).powi(2) * c as f64)
        .sum::<f64>()
        / n;

    (mean, variance.sqrt())
}

/// Fraction of pixels strictly brighter than `cutoff`.
pub fn bright_fraction(gray: &GrayImage, cutoff: u8) -> f64 {
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let bright = gray.pixels().filter(|p| p.0[0] > cutoff).count();
    bright as f64 / count as f64
}

/// Fraction of pixels marked by the Canny detector.
pub fn edge_density(gray: &GrayImage) -> f64 {
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let edges = canny(gray, EDGE_CANNY_LOW, EDGE_CANNY_HIGH);
    let edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count();
    edge_pixels as f64 / count as f64
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};
    use scangate_core::{REMEDIATION_INSTRUCTIONS, Strictness, describe_error};

    fn checkerboard(width: u32, height: u32, cell: u32, dark: u8, light: u8) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Luma([dark])
            } else {
                Luma([light])
            }
        })
    }

    #[test]
    fn laplacian_of_uniform_image_is_zero() {
        let gray = GrayImage::from_pixel(40, 30, Luma([128]));
        assert_eq!(laplacian_variance(&gray), 0.0);
    }

    #[test]
    fn laplacian_of_single_pixel_is_zero() {
        let gray = GrayImage::from_pixel(1, 1, Luma([77]));
        assert_eq!(laplacian_variance(&gray), 0.0);
    }

    #[test]
    fn laplacian_rises_with_sharp_detail() {
        let soft = checkerboard(64, 64, 16, 100, 110);
        let sharp = checkerboard(64, 64, 4, 0, 255);
        assert!(laplacian_variance(&sharp) > laplacian_variance(&soft));
        assert!(laplacian_variance(&sharp) > 1000.0);
    }

    #[test]
    fn reflect_mirrors_about_edge_pixel() {
        assert_eq!(reflect(-1, 5), 1);
        assert_eq!(reflect(-2, 5), 2);
        assert_eq!(reflect(5, 5), 3);
        assert_eq!(reflect(2, 5), 2);
    }

    #[test]
    fn intensity_stats_of_two_level_image() {
        let gray = GrayImage::from_fn(10, 10, |x, _| if x < 5 { Luma([0]) } else { Luma([200]) });
        let (mean, std_dev) = intensity_stats(&gray);
        assert!((mean - 100.0).abs() < 1e-9);
        assert!((std_dev - 100.0).abs() < 1e-9);
    }

    #[test]
    fn bright_fraction_excludes_pixels_at_cutoff() {
        let gray = GrayImage::from_fn(4, 1, |x, _| Luma([[239, 240, 241, 255][x as usize]]));
        assert!((bright_fraction(&gray, 240) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn edge_density_of_flat_image_is_zero() {
        let gray = GrayImage::from_pixel(64, 64, Luma([90]));
        assert_eq!(edge_density(&gray), 0.0);
        assert!(edge_density(&checkerboard(64, 64, 8, 0, 255)) > 0.05);
    }

    /// A 50x50 flat image trips the blur check before resolution is ever
    /// looked at.
    #[test]
    fn blur_is_reported_before_low_resolution() {
        let gray = GrayImage::from_pixel(50, 50, Luma([128]));
        for strictness in Strictness::ALL {
            let verdict = QualityGate::new(strictness.profile()).evaluate_gray(&gray);
            assert_eq!(verdict.failure(), Some(QualityFailure::Blurry));
        }
    }

    #[test]
    fn sharp_small_image_is_low_resolution_under_every_preset() {
        let gray = checkerboard(50, 50, 5, 0, 255);
        for strictness in Strictness::ALL {
            let verdict = QualityGate::new(strictness.profile()).evaluate_gray(&gray);
            assert_eq!(verdict.failure(), Some(QualityFailure::LowResolution));
        }
    }

    #[test]
    fn low_contrast_detail_is_rejected() {
        // Fine detail keeps the Laplacian variance up while the spread of
        // intensities stays tiny.
        let gray = checkerboard(1200, 900, 1, 100, 124);
        let verdict = QualityGate::new(Strictness::Lenient.profile()).evaluate_gray(&gray);
        assert_eq!(verdict.failure(), Some(QualityFailure::LowContrast));
    }

    #[test]
    fn dim_detailed_image_is_dark() {
        let gray = checkerboard(1200, 900, 8, 0, 90);
        for strictness in Strictness::ALL {
            let verdict = QualityGate::new(strictness.profile()).evaluate_gray(&gray);
            assert_eq!(verdict.failure(), Some(QualityFailure::Dark));
        }
    }

    #[test]
    fn failing_verdict_carries_message_and_measurement() {
        let gray = GrayImage::from_pixel(50, 50, Luma([128]));
        let verdict = QualityGate::new(Strictness::Standard.profile()).evaluate_gray(&gray);
        match verdict {
            QualityVerdict::Fail {
                reason,
                message,
                measurement,
            } => {
                assert_eq!(reason, QualityFailure::Blurry);
                assert!(message.ends_with(REMEDIATION_INSTRUCTIONS));
                assert_eq!(measurement.value, 0.0);
                assert_eq!(measurement.limit, 200.0);
            }
            QualityVerdict::Pass => panic!("flat image must not pass"),
        }
    }

    #[test]
    fn into_result_maps_failure_to_error() {
        let verdict = QualityVerdict::Fail {
            reason: QualityFailure::Glare,
            message: QualityFailure::Glare.message(),
            measurement: Measurement {
                value: 0.2,
                limit: 0.005,
            },
        };
        assert!(matches!(
            verdict.into_result(),
            Err(ScangateError::Quality(QualityFailure::Glare))
        ));
        assert!(QualityVerdict::Pass.into_result().is_ok());
    }

    /// If a check fails under the lenient preset it also fails under the
    /// standard and strict ones. Glare is excluded: its brightness cutoff
    /// loosens as strictness rises (see the next test).
    #[test]
    fn lenient_failures_persist_under_stricter_presets() {
        let samples = [
            GrayImage::from_pixel(1200, 900, Luma([128])),
            checkerboard(50, 50, 5, 0, 255),
            checkerboard(1200, 900, 1, 100, 124),
            checkerboard(1200, 900, 8, 0, 90),
            checkerboard(700, 500, 6, 40, 200),
        ];
        let [lenient, standard, strict] = Strictness::ALL.map(|s| QualityGate::new(s.profile()));

        for gray in &samples {
            for check in CHECKS.iter().filter(|c| c.failure != QualityFailure::Glare) {
                if !lenient.check(check.failure, gray).passed {
                    assert!(!standard.check(check.failure, gray).passed, "{}", check.failure);
                    assert!(!strict.check(check.failure, gray).passed, "{}", check.failure);
                }
            }
        }
    }

    /// Pixels at level 230 count as glare under the lenient cutoff (220) but
    /// not under the strict cutoff (250), so the strict preset accepts an
    /// image the lenient one rejects.
    #[test]
    fn glare_check_is_not_monotone_across_presets() {
        let gray = GrayImage::from_pixel(100, 100, Luma([230]));
        let lenient = QualityGate::new(Strictness::Lenient.profile());
        let strict = QualityGate::new(Strictness::Strict.profile());
        assert!(!lenient.check(QualityFailure::Glare, &gray).passed);
        assert!(strict.check(QualityFailure::Glare, &gray).passed);
    }

    #[test]
    fn verdict_serializes_with_tag() {
        let pass = serde_json::to_value(QualityVerdict::Pass).unwrap();
        assert_eq!(pass["verdict"], "pass");

        let gray = GrayImage::from_pixel(50, 50, Luma([128]));
        let fail = QualityGate::new(Strictness::Standard.profile()).evaluate_gray(&gray);
        let json = serde_json::to_value(&fail).unwrap();
        assert_eq!(json["verdict"], "fail");
        assert_eq!(json["reason"], "blurry");
        assert_eq!(json["measurement"]["limit"], 200.0);
    }

    /// A sharp, well-exposed frame with a blown-out band across the top
    /// clears blur, resolution, and contrast, then stops at glare.
    #[test]
    fn blown_out_band_is_rejected_as_glare() {
        let mut gray = checkerboard(1200, 900, 8, 60, 180);
        for y in 0..200 {
            for x in 0..1200 {
                gray.put_pixel(x, y, Luma([255]));
            }
        }

        let verdict = QualityGate::new(Strictness::Standard.profile()).evaluate_gray(&gray);
        assert_eq!(verdict.failure(), Some(QualityFailure::Glare), "{verdict:?}");
        let err = verdict.into_result().unwrap_err();
        assert_eq!(describe_error(&err).tag, "glare");
    }

    /// A smooth gradient speckled with faint isolated dots is sharp enough for
    /// the Laplacian, but no gradient is strong enough for Canny to mark.
    #[test]
    fn smooth_scene_is_rejected_for_edge_density() {
        let gray = GrayImage::from_fn(1200, 900, |x, y| {
            let level = (60.0 + 160.0 * x as f64 / 1199.0).round() as u8;
            if x % 9 == 4 && y % 9 == 4 {
                Luma([level.saturating_sub(80)])
            } else {
                Luma([level])
            }
        });

        let verdict = QualityGate::new(Strictness::Standard.profile()).evaluate_gray(&gray);
        match &verdict {
            QualityVerdict::Fail {
                reason,
                measurement,
                ..
            } => {
                assert_eq!(*reason, QualityFailure::LowEdgeDensity);
                assert!(measurement.value < measurement.limit);
            }
            QualityVerdict::Pass => panic!("speckled gradient must not pass"),
        }
        let err = verdict.into_result().unwrap_err();
        assert_eq!(describe_error(&err).tag, "low-edge-density");
    }

    /// Darkness is judged on BT.601 luma: a saturated blue at mean 76 clears
    /// the lenient floor of 70.
    #[test]
    fn colour_photo_brightness_uses_bt601_luma() {
        let photo = DynamicImage::ImageRgb8(RgbImage::from_pixel(800, 600, Rgb([40, 60, 250])));
        let outcome = QualityGate::new(Strictness::Lenient.profile())
            .check(QualityFailure::Dark, &bt601_luma(&photo));
        assert!(outcome.passed, "{outcome:?}");
        assert_eq!(outcome.measurement.value, 76.0);
    }
}
