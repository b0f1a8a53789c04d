//! One reading: decode → region → recognition → standardization.

use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::ReadError;
use crate::models::Reading;
use crate::ocr::TextRecognizer;
use crate::region::RegionExtractor;
use crate::standardize::standardize;

/// Reads numeric displays with a shared recognizer
pub struct MeterReader {
    recognizer: Arc<dyn TextRecognizer>,
    extractor: RegionExtractor,
}

impl MeterReader {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            recognizer,
            extractor: RegionExtractor::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: RegionExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn language(&self) -> &str {
        self.recognizer.language()
    }

    /// Accept only declared image types (`image/*`)
    pub fn check_content_type(content_type: Option<&str>) -> Result<(), ReadError> {
        match content_type {
            Some(ct) if ct.trim().to_ascii_lowercase().starts_with("image/") => Ok(()),
            other => Err(ReadError::InvalidContentType(other.unwrap_or("none").to_string())),
        }
    }

    /// Decode an encoded raster (PNG, JPEG, ...) into an RGB image
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ReadError> {
        if bytes.is_empty() {
            return Err(ReadError::UndecodableImage);
        }

        let img = image::load_from_memory(bytes).map_err(|e| {
            debug!("image decode failed: {}", e);
            ReadError::UndecodableImage
        })?;

        Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
    }

    /// Decode and read raw upload bytes
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Reading, ReadError> {
        let img = Self::decode(bytes)?;
        self.read_image(&img)
    }

    /// Run the full pipeline on a decoded image.
    ///
    /// An image without any candidate region is a successful, empty reading.
    pub fn read_image(&self, img: &DynamicImage) -> Result<Reading, ReadError> {
        let started = Instant::now();

        let region = match self.extractor.extract_region(img) {
            Ok(region) => region,
            Err(e) => match ReadError::from(e) {
                ReadError::NoRegionFound => {
                    info!("no region found, returning empty reading");
                    return Ok(Reading::default());
                }
                other => return Err(other),
            },
        };

        debug!(
            "region at ({}, {}) {}x{}, contour area {:.1} (of {} contours)",
            region.bbox.x,
            region.bbox.y,
            region.bbox.width,
            region.bbox.height,
            region.contour_area,
            region.contour_count
        );

        let detections = self
            .recognizer
            .recognize(&region.image)
            .map_err(|e| ReadError::ProcessingFailure(format!("{:#}", e)))?;

        for d in &detections {
            debug!(text = %d.text, confidence = ?d.confidence, "detection");
        }

        let numbers = standardize(&detections);

        info!(
            detections = detections.len(),
            numbers = numbers.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reading finished"
        );

        Ok(Reading {
            numbers,
            region: Some(region.bbox),
            detections: detections.len(),
        })
    }
}
