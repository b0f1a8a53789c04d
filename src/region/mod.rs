//! Locating the numeric display inside a photo.
//!
//! The extractor runs a fixed chain of pipeline steps: downscale, grayscale,
//! CLAHE, adaptive threshold, then keeps the single largest external contour,
//! masks everything outside it and crops to its bounding box.

pub mod contours;
pub mod mask;
pub mod preprocessing;
pub mod steps;

use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;
use thiserror::Error;

use crate::models::ExtractedRegion;
use crate::pipeline::Pipeline;
use steps::*;

#[derive(Debug, Error)]
pub enum RegionError {
    #[error("no region found in image")]
    NoRegionFound,

    #[error("region extraction failed: {0}")]
    Pipeline(String),
}

/// Tuning knobs for region extraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionParams {
    pub scale: f32,
    pub clip_limit: f32,
    pub tile_grid: u32,
    pub block_size: u32,
    pub offset: i32,
}

impl Default for RegionParams {
    fn default() -> Self {
        Self {
            scale: 0.5,
            clip_limit: 2.0,
            tile_grid: 8,
            block_size: 11,
            offset: 2,
        }
    }
}

/// Build the region pipeline for the given parameters
pub fn build_region_pipeline(params: &RegionParams) -> Pipeline {
    Pipeline::new()
        .add_step(Arc::new(DownscaleStep { factor: params.scale }))
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(ClaheStep {
            clip_limit: params.clip_limit,
            tile_grid: params.tile_grid,
        }))
        .add_step(Arc::new(AdaptiveThresholdStep {
            block_size: params.block_size,
            offset: params.offset,
        }))
        .add_step(Arc::new(LargestRegionStep))
}

pub struct RegionExtractor {
    params: RegionParams,
    pipeline: Pipeline,
}

impl RegionExtractor {
    pub fn new() -> Self {
        Self::with_params(RegionParams::default())
    }

    pub fn with_params(params: RegionParams) -> Self {
        Self {
            params,
            pipeline: build_region_pipeline(&params),
        }
    }

    /// Dump every stage's output under `output_dir` (must be empty or absent)
    pub fn with_debug(mut self, output_dir: PathBuf) -> anyhow::Result<Self> {
        self.pipeline = self.pipeline.with_debug(output_dir)?;
        Ok(self)
    }

    pub fn params(&self) -> &RegionParams {
        &self.params
    }

    /// Crop the region most likely to hold the numbers.
    ///
    /// The crop is taken from the downscaled color image, with every pixel
    /// outside the selected contour set to black.
    pub fn extract_region(&self, img: &DynamicImage) -> Result<ExtractedRegion, RegionError> {
        let mut results = self
            .pipeline
            .run(img.clone())
            .map_err(|e| RegionError::Pipeline(format!("{:#}", e)))?;

        let Some(item) = results.pop() else {
            return Err(RegionError::NoRegionFound);
        };
        let bbox = item.bbox.ok_or(RegionError::NoRegionFound)?;

        Ok(ExtractedRegion {
            image: item.image.to_rgb8(),
            bbox,
            contour_area: item.get_float("contour_area").unwrap_or(0.0),
            contour_count: item.get_int("contour_count").unwrap_or(1) as usize,
        })
    }
}

impl Default for RegionExtractor {
    fn default() -> Self {
        Self::new()
    }
}
