use image::RgbImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams, TextItem};
use rten::Model;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::{BoundingBox, Detection};

/// Language the bundled recognition model is trained for
pub const OCR_LANGUAGE: &str = "en";

const DETECTION_MODEL: &str = "text-detection.rten";
const RECOGNITION_MODEL: &str = "text-recognition.rten";

/// Anything that turns an image into text detections.
///
/// Implementations are shared across requests, so they must be usable from
/// several threads at once.
pub trait TextRecognizer: Send + Sync {
    /// Detections in the engine's own scan order
    fn recognize(&self, image: &RgbImage) -> anyhow::Result<Vec<Detection>>;

    fn language(&self) -> &str {
        OCR_LANGUAGE
    }
}

/// Standard cache location for ocrs models (`~/.cache/ocrs`)
pub fn default_models_dir() -> anyhow::Result<PathBuf> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))?;
    Ok(Path::new(&home_dir).join(".cache/ocrs"))
}

/// Recognizer backed by the `ocrs` engine
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    /// Load the detection and recognition models from `models_dir`
    pub fn load(models_dir: &Path) -> anyhow::Result<Self> {
        let detection_model_path = models_dir.join(DETECTION_MODEL);
        let recognition_model_path = models_dir.join(RECOGNITION_MODEL);

        if !detection_model_path.exists() || !recognition_model_path.exists() {
            anyhow::bail!(
                "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
                 Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            );
        }

        info!("Loading OCR models from {}", models_dir.display());
        let detection_model = Model::load_file(&detection_model_path)?;
        let recognition_model = Model::load_file(&recognition_model_path)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })?;

        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn recognize(&self, image: &RgbImage) -> anyhow::Result<Vec<Detection>> {
        let img_source = ImageSource::from_bytes(image.as_raw(), image.dimensions())?;
        let ocr_input = self.engine.prepare_input(img_source)?;

        let word_rects = self.engine.detect_words(&ocr_input)?;
        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);
        let lines = self.engine.recognize_text(&ocr_input, &line_rects)?;

        // One detection per recognized word, lines in reading order
        let mut detections = Vec::new();
        for line in lines.iter().flatten() {
            for word in line.words() {
                let text = word.to_string();
                if text.trim().is_empty() {
                    continue;
                }
                let rect = word.bounding_rect();
                let bbox = BoundingBox {
                    x: rect.left().max(0) as u32,
                    y: rect.top().max(0) as u32,
                    width: rect.width().max(0) as u32,
                    height: rect.height().max(0) as u32,
                };
                detections.push(Detection::new(bbox, text));
            }
        }

        debug!(
            words = word_rects.len(),
            lines = line_rects.len(),
            detections = detections.len(),
            "text recognition finished"
        );

        Ok(detections)
    }
}
