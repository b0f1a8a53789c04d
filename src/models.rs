use image::RgbImage;
use imageproc::point::Point;
use serde::Serialize;

/// Axis-aligned rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Outer boundary of a connected foreground region.
///
/// Points are stored in scan order with straight runs compressed to their
/// end points, so a filled rectangle is described by its four corners.
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed polygon area (shoelace formula).
    ///
    /// Degenerate contours (single points, lines) have zero area.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let mut twice_area: i64 = 0;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
        }

        (twice_area as f64 / 2.0).abs()
    }

    /// Smallest rectangle containing every boundary point
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(BoundingBox {
            x: min_x.max(0) as u32,
            y: min_y.max(0) as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }
}

/// One text fragment reported by the recognition engine
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub text: String,
    /// `None` when the engine does not report a score
    pub confidence: Option<f32>,
}

impl Detection {
    pub fn new(bbox: BoundingBox, text: impl Into<String>) -> Self {
        Self {
            bbox,
            text: text.into(),
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// The cropped region handed to the recognition engine
#[derive(Debug, Clone)]
pub struct ExtractedRegion {
    /// Masked color crop; pixels outside the contour are zeroed
    pub image: RgbImage,
    /// Crop window in downscaled-image coordinates
    pub bbox: BoundingBox,
    /// Enclosed area of the selected contour
    pub contour_area: f64,
    /// Number of external contours the region was chosen from
    pub contour_count: usize,
}

/// Result of reading one image
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reading {
    pub numbers: Vec<String>,
    pub region: Option<BoundingBox>,
    pub detections: usize,
}

impl Reading {
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}
