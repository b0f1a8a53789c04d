use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use meter_reader::{BoundingBox, Detection, TextRecognizer};
use std::io::Cursor;
use std::sync::Mutex;

/// Recognizer that replays a fixed list of fragments
pub struct StubRecognizer {
    texts: Vec<String>,
    fail_with: Option<String>,
    pub calls: Mutex<Vec<(u32, u32)>>,
}

impl StubRecognizer {
    pub fn returning(texts: &[&str]) -> Self {
        Self {
            texts: texts.iter().map(|t| t.to_string()).collect(),
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            texts: Vec::new(),
            fail_with: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl TextRecognizer for StubRecognizer {
    fn recognize(&self, image: &RgbImage) -> anyhow::Result<Vec<Detection>> {
        self.calls.lock().unwrap().push(image.dimensions());
        if let Some(message) = &self.fail_with {
            anyhow::bail!("{}", message);
        }
        let bbox = BoundingBox { x: 0, y: 0, width: image.width(), height: image.height() };
        Ok(self.texts.iter().map(|t| Detection::new(bbox, t.clone())).collect())
    }
}

/// A 200x120 "meter": dark housing, bright display window, dark digit bars
pub fn meter_photo() -> DynamicImage {
    let mut img = RgbImage::from_pixel(200, 120, Rgb([70, 72, 75]));
    for y in 30..90 {
        for x in 30..170 {
            img.put_pixel(x, y, Rgb([225, 230, 220]));
        }
    }
    for y in 44..76 {
        for x in (50..150).step_by(24) {
            for dx in 0..8 {
                img.put_pixel(x + dx, y, Rgb([20, 20, 25]));
            }
        }
    }
    DynamicImage::ImageRgb8(img)
}

pub fn blank_photo() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(80, 60, Rgb([200, 200, 200])))
}

/// Encode an image as PNG bytes
pub fn png_bytes(img: &DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .expect("Failed to encode test image");
    buf.into_inner()
}

/// Build a multipart/form-data body with one file field
pub fn multipart_body(boundary: &str, field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"upload.png\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}
