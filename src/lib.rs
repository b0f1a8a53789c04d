pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod reader;
pub mod region;
pub mod standardize;

pub use error::ReadError;
pub use models::{BoundingBox, Contour, Detection, ExtractedRegion, Reading};
pub use ocr::{OcrsRecognizer, TextRecognizer};
pub use pipeline::{DebugConfig, MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep};
pub use reader::MeterReader;
pub use region::{RegionError, RegionExtractor, RegionParams};
pub use standardize::{standardize, standardize_texts};
