use crate::pipeline::{PipelineData, PipelineStep, PipelineContext, MetadataValue};
use crate::region::{contours, mask, preprocessing};
use anyhow::Result;
use image::DynamicImage;
use std::sync::Arc;
use tracing::debug;

/// Shrink the image; the shrunk color image becomes the masking reference
pub struct DownscaleStep {
    pub factor: f32,
}

impl PipelineStep for DownscaleStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let small = DynamicImage::ImageRgb8(preprocessing::downscale(&item.image, self.factor).to_rgb8());
            let mut new_item = item.with_image(small.clone());
            new_item.reference = Arc::new(small);
            result.push(new_item);
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Downscale"
    }
}

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = preprocessing::to_grayscale(&item.image);
            result.push(item.with_image(DynamicImage::ImageLuma8(gray)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Local contrast normalization (CLAHE)
pub struct ClaheStep {
    pub clip_limit: f32,
    pub tile_grid: u32,
}

impl PipelineStep for ClaheStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = item.image.to_luma8();
            let equalized = preprocessing::clahe(&gray, self.clip_limit, self.tile_grid);
            result.push(item.with_image(DynamicImage::ImageLuma8(equalized)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Contrast Equalization"
    }
}

/// Gaussian adaptive binarization
pub struct AdaptiveThresholdStep {
    pub block_size: u32,
    pub offset: i32,
}

impl PipelineStep for AdaptiveThresholdStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();
        for item in data {
            let gray = item.image.to_luma8();
            let binary = preprocessing::adaptive_threshold(&gray, self.block_size, self.offset);
            result.push(item.with_image(DynamicImage::ImageLuma8(binary)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Adaptive Threshold"
    }
}

/// Keep only the largest external contour: mask the reference image with it
/// and crop to its bounding box. Items without any contour are dropped.
pub struct LargestRegionStep;

impl PipelineStep for LargestRegionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let binary = item.image.to_luma8();
            let found = contours::find_external_contours(&binary);

            let Some(largest) = contours::largest_contour(&found) else {
                debug!("no contours found");
                continue;
            };
            let Some(bbox) = largest.bounding_box() else {
                continue;
            };

            debug!(
                contours = found.len(),
                area = largest.area(),
                "selected region at ({}, {}) {}x{}",
                bbox.x, bbox.y, bbox.width, bbox.height
            );

            let color = item.reference.to_rgb8();
            let region_mask = mask::contour_mask(largest, color.width(), color.height());
            let masked = mask::apply_mask(&color, &region_mask);
            let cropped = mask::crop_to(&masked, &bbox);

            let region = PipelineData::from_region(
                DynamicImage::ImageRgb8(cropped),
                item.reference.clone(),
                bbox,
            )
            .with_metadata("contour_area", MetadataValue::Float(largest.area()))
            .with_metadata("contour_count", MetadataValue::Int(found.len() as i64));

            result.push(region);
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Largest Region"
    }
}
