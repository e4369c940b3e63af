//! Deterministic analyzer returning preconfigured reports.

use async_trait::async_trait;

use super::{
    BackgroundAnalyzer, BackgroundReport, FaceDetector, FaceReport, ShadowDetector, ShadowReport,
};
use crate::error::CoreError;
use crate::metadata::{ImageMetadata, UploadedFile};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAnalyzer {
    pub background: BackgroundReport,
    pub shadow: ShadowReport,
    pub face: FaceReport,
}

impl FixedAnalyzer {
    /// Reports that satisfy every bundled background, quality and content rule.
    pub fn clean() -> Self {
        Self {
            background: BackgroundReport { uniformity: 1.0 },
            shadow: ShadowReport {
                shadow_percentage: 0.0,
            },
            face: FaceReport {
                detected: true,
                face_fraction: 0.8,
                frontal: true,
            },
        }
    }

    /// Reports that fail every bundled background, quality and content rule.
    pub fn poor() -> Self {
        Self {
            background: BackgroundReport { uniformity: 0.5 },
            shadow: ShadowReport {
                shadow_percentage: 40.0,
            },
            face: FaceReport {
                detected: false,
                face_fraction: 0.0,
                frontal: false,
            },
        }
    }
}

#[async_trait]
impl BackgroundAnalyzer for FixedAnalyzer {
    async fn analyze_background(
        &self,
        _file: &UploadedFile,
        _metadata: &ImageMetadata,
    ) -> Result<BackgroundReport, CoreError> {
        Ok(self.background)
    }
}

#[async_trait]
impl ShadowDetector for FixedAnalyzer {
    async fn detect_shadows(
        &self,
        _file: &UploadedFile,
        _metadata: &ImageMetadata,
    ) -> Result<ShadowReport, CoreError> {
        Ok(self.shadow)
    }
}

#[async_trait]
impl FaceDetector for FixedAnalyzer {
    async fn detect_face(
        &self,
        _file: &UploadedFile,
        _metadata: &ImageMetadata,
    ) -> Result<FaceReport, CoreError> {
        Ok(self.face)
    }
}
