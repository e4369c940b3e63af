//! Image analysis ports used by the background, quality and content checks.
//!
//! The engine only sees these traits, so a real computer-vision backend can
//! replace the bundled implementations without touching rule evaluation:
//!
//! - [`simulated`]: random stand-ins matching the product's demo behavior.
//! - [`pixel`]: border-sampling heuristics over decoded pixels.
//! - [`fixed`]: deterministic reports for tests and reproducible runs.
//!
//! An analyzer error is recorded as a zero-confidence failing result for the
//! rule being evaluated; it never aborts the remaining rules.

pub mod fixed;
pub mod pixel;
pub mod simulated;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::metadata::{ImageMetadata, UploadedFile};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundReport {
    /// Background uniformity as a fraction in `[0, 1]`.
    pub uniformity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowReport {
    /// Share of the image covered by shadow or glare, in percent.
    pub shadow_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceReport {
    pub detected: bool,
    /// Face area as a fraction of the image.
    pub face_fraction: f64,
    pub frontal: bool,
}

#[async_trait]
pub trait BackgroundAnalyzer: Send + Sync {
    async fn analyze_background(
        &self,
        file: &UploadedFile,
        metadata: &ImageMetadata,
    ) -> Result<BackgroundReport, CoreError>;
}

#[async_trait]
pub trait ShadowDetector: Send + Sync {
    async fn detect_shadows(
        &self,
        file: &UploadedFile,
        metadata: &ImageMetadata,
    ) -> Result<ShadowReport, CoreError>;
}

#[async_trait]
pub trait FaceDetector: Send + Sync {
    async fn detect_face(
        &self,
        file: &UploadedFile,
        metadata: &ImageMetadata,
    ) -> Result<FaceReport, CoreError>;
}

/// The three analysis ports injected into the engine.
#[derive(Clone)]
pub struct Analyzers {
    pub background: Arc<dyn BackgroundAnalyzer>,
    pub shadow: Arc<dyn ShadowDetector>,
    pub face: Arc<dyn FaceDetector>,
}

impl Analyzers {
    pub fn new(
        background: Arc<dyn BackgroundAnalyzer>,
        shadow: Arc<dyn ShadowDetector>,
        face: Arc<dyn FaceDetector>,
    ) -> Self {
        Self {
            background,
            shadow,
            face,
        }
    }

    /// Random stand-ins for every check.
    pub fn simulated() -> Self {
        let sim = Arc::new(simulated::SimulatedAnalyzer);
        Self::new(sim.clone(), sim.clone(), sim)
    }

    /// Pixel heuristics for background and shadows; faces stay simulated
    /// since there is no bundled face detector.
    pub fn pixel() -> Self {
        Self::new(
            Arc::new(pixel::BorderUniformityAnalyzer::default()),
            Arc::new(pixel::BorderShadowDetector::default()),
            Arc::new(simulated::SimulatedAnalyzer),
        )
    }

    /// The same fixed reports for every file.
    pub fn fixed(analyzer: fixed::FixedAnalyzer) -> Self {
        let fixed = Arc::new(analyzer);
        Self::new(fixed.clone(), fixed.clone(), fixed)
    }
}

impl Default for Analyzers {
    fn default() -> Self {
        Self::pixel()
    }
}

impl std::fmt::Debug for Analyzers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzers").finish_non_exhaustive()
    }
}
