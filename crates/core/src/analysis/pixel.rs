//! Border-sampling heuristics over decoded pixels.
//!
//! In a passport photo or a scanned signature the frame border is
//! background. Both analyzers convert the image to luma and look only at a
//! band along the four edges:
//!
//! - uniformity is `1 - stddev / 128` of the band luminance, clamped to
//!   `[0, 1]`; a flat white border scores 1.0.
//! - shadow share is the percentage of band pixels darker than
//!   `shadow_ratio` times the band's bright reference (its 90th
//!   percentile luminance).
//!
//! These are coarse approximations, not segmentation. Decoding and band
//! statistics run on tokio's blocking pool.

use async_trait::async_trait;
use image::GrayImage;

use super::{BackgroundAnalyzer, BackgroundReport, ShadowDetector, ShadowReport};
use crate::error::CoreError;
use crate::metadata::{ImageMetadata, UploadedFile};

/// Band width as a fraction of the shorter image side.
const DEFAULT_BAND_FRACTION: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct BorderUniformityAnalyzer {
    pub band_fraction: f64,
}

impl Default for BorderUniformityAnalyzer {
    fn default() -> Self {
        Self {
            band_fraction: DEFAULT_BAND_FRACTION,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BorderShadowDetector {
    pub band_fraction: f64,
    /// Pixels below this fraction of the reference luminance count as shadow.
    pub shadow_ratio: f64,
}

impl Default for BorderShadowDetector {
    fn default() -> Self {
        Self {
            band_fraction: DEFAULT_BAND_FRACTION,
            shadow_ratio: 0.8,
        }
    }
}

#[async_trait]
impl BackgroundAnalyzer for BorderUniformityAnalyzer {
    async fn analyze_background(
        &self,
        file: &UploadedFile,
        _metadata: &ImageMetadata,
    ) -> Result<BackgroundReport, CoreError> {
        let bytes = file.bytes.clone();
        let band_fraction = self.band_fraction;
        run_blocking(move || {
            let band = border_band(&decode_luma(&bytes)?, band_fraction);
            Ok(BackgroundReport {
                uniformity: uniformity(&band),
            })
        })
        .await
    }
}

#[async_trait]
impl ShadowDetector for BorderShadowDetector {
    async fn detect_shadows(
        &self,
        file: &UploadedFile,
        _metadata: &ImageMetadata,
    ) -> Result<ShadowReport, CoreError> {
        let bytes = file.bytes.clone();
        let (band_fraction, shadow_ratio) = (self.band_fraction, self.shadow_ratio);
        run_blocking(move || {
            let band = border_band(&decode_luma(&bytes)?, band_fraction);
            Ok(ShadowReport {
                shadow_percentage: shadow_percentage(&band, shadow_ratio),
            })
        })
        .await
    }
}

/// Run CPU-bound pixel work off the async workers.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, CoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CoreError::Internal(format!("Image analysis task failed: {e}")))?
}

fn decode_luma(bytes: &[u8]) -> Result<GrayImage, CoreError> {
    let img = image::load_from_memory(bytes)?;
    Ok(img.to_luma8())
}

/// Luminance of every pixel within the edge band.
pub fn border_band(luma: &GrayImage, band_fraction: f64) -> Vec<u8> {
    let (w, h) = luma.dimensions();
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let band = ((f64::from(w.min(h)) * band_fraction).round() as u32).clamp(1, w.min(h));

    luma.enumerate_pixels()
        .filter(|(x, y, _)| *x < band || *y < band || *x >= w - band || *y >= h - band)
        .map(|(_, _, p)| p.0[0])
        .collect()
}

pub fn uniformity(samples: &[u8]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|&v| (f64::from(v) - mean).powi(2))
        .sum::<f64>()
        / n;
    (1.0 - variance.sqrt() / 128.0).clamp(0.0, 1.0)
}

pub fn shadow_percentage(samples: &[u8], shadow_ratio: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let reference = f64::from(sorted[(sorted.len() - 1) * 9 / 10]);
    let threshold = reference * shadow_ratio;

    let dark = samples
        .iter()
        .filter(|&&v| f64::from(v) < threshold)
        .count();
    100.0 * dark as f64 / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::DEFAULT_REFERENCE_WIDTH_CM;
    use crate::test_helpers::{encode_png, png_bytes};

    fn upload(bytes: Vec<u8>) -> UploadedFile {
        UploadedFile::new("photo.png", "image/png", bytes)
    }

    /// White frame with a dark stripe along the left edge.
    fn shadowed_png() -> Vec<u8> {
        let img = image::RgbImage::from_fn(100, 100, |x, _| {
            if x < 10 {
                image::Rgb([40, 40, 40])
            } else {
                image::Rgb([250, 250, 250])
            }
        });
        encode_png(img)
    }

    #[tokio::test]
    async fn white_border_is_uniform_and_shadow_free() {
        let file = upload(png_bytes(60, 80));
        let meta = ImageMetadata::extract(&file, DEFAULT_REFERENCE_WIDTH_CM);

        let bg = BorderUniformityAnalyzer::default()
            .analyze_background(&file, &meta)
            .await
            .expect("analyze");
        assert!((bg.uniformity - 1.0).abs() < 1e-9);

        let shadow = BorderShadowDetector::default()
            .detect_shadows(&file, &meta)
            .await
            .expect("detect");
        assert_eq!(shadow.shadow_percentage, 0.0);
    }

    #[tokio::test]
    async fn dark_edge_lowers_uniformity_and_counts_as_shadow() {
        let file = upload(shadowed_png());
        let meta = ImageMetadata::extract(&file, DEFAULT_REFERENCE_WIDTH_CM);

        let bg = BorderUniformityAnalyzer::default()
            .analyze_background(&file, &meta)
            .await
            .expect("analyze");
        assert!(bg.uniformity < 0.9, "uniformity {}", bg.uniformity);

        let shadow = BorderShadowDetector::default()
            .detect_shadows(&file, &meta)
            .await
            .expect("detect");
        assert!(shadow.shadow_percentage > 15.0, "shadow {}", shadow.shadow_percentage);
    }

    #[tokio::test]
    async fn undecodable_file_is_an_image_error() {
        let file = UploadedFile::new("marks.pdf", "application/pdf", b"%PDF-1.7".to_vec());
        let meta = ImageMetadata::extract(&file, DEFAULT_REFERENCE_WIDTH_CM);
        let err = BorderUniformityAnalyzer::default()
            .analyze_background(&file, &meta)
            .await
            .expect_err("pdf is not an image");
        assert!(matches!(err, CoreError::Image(_)));
    }

    #[tokio::test]
    async fn pixel_work_leaves_the_runtime_thread() {
        let caller = std::thread::current().id();
        let worker = run_blocking(|| Ok(std::thread::current().id()))
            .await
            .unwrap();
        assert_ne!(worker, caller);
    }

    #[tokio::test]
    async fn panicking_pixel_work_is_internal() {
        let result: Result<(), CoreError> = run_blocking(|| panic!("decoder blew up")).await;
        assert!(matches!(result, Err(CoreError::Internal(msg)) if msg.contains("task failed")));
    }

    #[test]
    fn band_covers_only_edges() {
        let luma = GrayImage::new(10, 10);
        // band of 1px: 10*10 - 8*8 = 36 pixels
        assert_eq!(border_band(&luma, 0.1).len(), 36);
    }
}
