//! Random analysis stand-ins.
//!
//! These do not look at the image at all. Ranges match the product demo:
//! uniformity in [0.75, 0.95), shadow in [0, 15)%, a face found 90% of the
//! time covering [0.55, 0.85) of the frame, frontal 95% of the time.

use async_trait::async_trait;
use rand::Rng;

use super::{
    BackgroundAnalyzer, BackgroundReport, FaceDetector, FaceReport, ShadowDetector, ShadowReport,
};
use crate::error::CoreError;
use crate::metadata::{ImageMetadata, UploadedFile};

#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAnalyzer;

pub fn sample_background(rng: &mut impl Rng) -> BackgroundReport {
    BackgroundReport {
        uniformity: rng.random_range(0.75..0.95),
    }
}

pub fn sample_shadow(rng: &mut impl Rng) -> ShadowReport {
    ShadowReport {
        shadow_percentage: rng.random_range(0.0..15.0),
    }
}

pub fn sample_face(rng: &mut impl Rng) -> FaceReport {
    FaceReport {
        detected: rng.random_bool(0.9),
        face_fraction: rng.random_range(0.55..0.85),
        frontal: rng.random_bool(0.95),
    }
}

#[async_trait]
impl BackgroundAnalyzer for SimulatedAnalyzer {
    async fn analyze_background(
        &self,
        _file: &UploadedFile,
        _metadata: &ImageMetadata,
    ) -> Result<BackgroundReport, CoreError> {
        Ok(sample_background(&mut rand::rng()))
    }
}

#[async_trait]
impl ShadowDetector for SimulatedAnalyzer {
    async fn detect_shadows(
        &self,
        _file: &UploadedFile,
        _metadata: &ImageMetadata,
    ) -> Result<ShadowReport, CoreError> {
        Ok(sample_shadow(&mut rand::rng()))
    }
}

#[async_trait]
impl FaceDetector for SimulatedAnalyzer {
    async fn detect_face(
        &self,
        _file: &UploadedFile,
        _metadata: &ImageMetadata,
    ) -> Result<FaceReport, CoreError> {
        Ok(sample_face(&mut rand::rng()))
    }
}
