use image::DynamicImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use tracing::debug;

use crate::models::BoundingBox;

/// Data that flows through the pipeline
/// Each PipelineData represents a single image (or region) with associated metadata
#[derive(Clone)]
pub struct PipelineData {
    /// The working image (color, grayscale or binary depending on the stage)
    pub image: DynamicImage,

    /// Color image that masks and crops are taken from (shared via Arc)
    pub reference: Arc<DynamicImage>,

    /// Crop window inside the reference image (None means full image)
    pub bbox: Option<BoundingBox>,

    /// Metadata recorded by steps (e.g., "contour_area", "contour_count")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Float(f64),
    Int(i64),
}

impl PipelineData {
    /// Create PipelineData for a full image
    pub fn from_image(image: DynamicImage) -> Self {
        let reference = Arc::new(image.clone());
        Self {
            image,
            reference,
            bbox: None,
            metadata: HashMap::new(),
        }
    }

    /// Create PipelineData for a region of the reference image
    pub fn from_region(
        image: DynamicImage,
        reference: Arc<DynamicImage>,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            image,
            reference,
            bbox: Some(bbox),
            metadata: HashMap::new(),
        }
    }

    /// Replace the working image, keeping reference, bbox and metadata
    pub fn with_image(&self, image: DynamicImage) -> Self {
        Self {
            image,
            reference: self.reference.clone(),
            bbox: self.bbox,
            metadata: self.metadata.clone(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get metadata as float
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get metadata as integer
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Process data and return transformed data
    /// Steps can transform (one → one) or filter (one → none)
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>>;

    /// Human-readable name for this step (used in logs and debug directories)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order on an input image
    pub fn run(&self, input: DynamicImage) -> Result<Vec<PipelineData>> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<Vec<PipelineData>> {
        if let Some(debug_config) = &self.context.debug {
            let input_dir = debug_config.output_dir.join("00_input");
            std::fs::create_dir_all(&input_dir)?;
            input.save(input_dir.join("01.png"))
                .map_err(|e| anyhow::anyhow!("Failed to save debug input: {}", e))?;
        }

        let mut data = vec![PipelineData::from_image(input)];

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            debug!(step = step.name(), items = data.len(), "running pipeline step");

            data = step.process(data, &self.context)?;

            if let Some(debug_config) = &self.context.debug {
                self.save_debug_outputs(debug_config, step_idx, step.name(), &data)?;
            }

            debug!(step = step.name(), items = data.len(), "pipeline step finished");

            if data.is_empty() {
                break;
            }
        }

        Ok(data)
    }

    fn save_debug_outputs(
        &self,
        debug_config: &DebugConfig,
        step_idx: usize,
        step_name: &str,
        data: &[PipelineData],
    ) -> Result<()> {
        let step_dir_name = format!("{:02}_{}", step_idx + 1,
            step_name.to_lowercase().replace(' ', "_"));
        let step_dir = debug_config.output_dir.join(&step_dir_name);
        std::fs::create_dir_all(&step_dir)?;

        for (idx, item) in data.iter().enumerate() {
            let output_path = step_dir.join(format!("{:02}.png", idx + 1));
            item.image.save(&output_path)
                .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
        }

        debug!("saved {} debug images to {}/", data.len(), step_dir_name);
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    struct InvertStep;

    impl PipelineStep for InvertStep {
        fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
            Ok(data
                .into_iter()
                .map(|item| {
                    let mut gray = item.image.to_luma8();
                    image::imageops::invert(&mut gray);
                    item.with_image(DynamicImage::ImageLuma8(gray))
                })
                .collect())
        }

        fn name(&self) -> &str {
            "Invert"
        }
    }

    struct DropAllStep;

    impl PipelineStep for DropAllStep {
        fn process(&self, _data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
            Ok(vec![])
        }

        fn name(&self) -> &str {
            "Drop All"
        }
    }

    fn input() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([10u8])))
    }

    #[test]
    fn test_steps_run_in_order() {
        let pipeline = Pipeline::new()
            .add_step(Arc::new(InvertStep))
            .add_step(Arc::new(InvertStep));

        let result = pipeline.run(input()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].image.to_luma8().get_pixel(0, 0)[0], 10);
    }

    #[test]
    fn test_run_partial_stops_early() {
        let pipeline = Pipeline::new()
            .add_step(Arc::new(InvertStep))
            .add_step(Arc::new(InvertStep));

        let result = pipeline.run_partial(input(), 1).unwrap();
        assert_eq!(result[0].image.to_luma8().get_pixel(0, 0)[0], 245);
    }

    #[test]
    fn test_empty_output_short_circuits() {
        let pipeline = Pipeline::new()
            .add_step(Arc::new(DropAllStep))
            .add_step(Arc::new(InvertStep));

        assert!(pipeline.run(input()).unwrap().is_empty());
    }

    #[test]
    fn test_reference_survives_with_image() {
        let data = PipelineData::from_image(input())
            .with_metadata("contour_area", MetadataValue::Float(4.5));
        let next = data.with_image(DynamicImage::ImageLuma8(GrayImage::new(1, 1)));

        assert!(Arc::ptr_eq(&data.reference, &next.reference));
        assert_eq!(next.get_float("contour_area"), Some(4.5));
        assert_eq!(next.get_int("contour_area"), None);
    }
}
