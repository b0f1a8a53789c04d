use image::{GrayImage, Luma, Rgb, RgbImage};
use image::imageops;
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use crate::models::{BoundingBox, Contour};

const FILLED: Luma<u8> = Luma([255u8]);

/// Rasterize a contour as a solid mask (boundary included)
pub fn contour_mask(contour: &Contour, width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let points = &contour.points;

    // draw_polygon_mut rejects closed point lists and needs a real polygon
    let mut polygon: Vec<Point<i32>> = points.clone();
    if polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    if polygon.len() >= 3 {
        draw_polygon_mut(&mut mask, &polygon, FILLED);
    }

    for (i, start) in points.iter().enumerate() {
        let end = points[(i + 1) % points.len()];
        draw_line_segment_mut(
            &mut mask,
            (start.x as f32, start.y as f32),
            (end.x as f32, end.y as f32),
            FILLED,
        );
        if start.x >= 0 && start.y >= 0 && (start.x as u32) < width && (start.y as u32) < height {
            mask.put_pixel(start.x as u32, start.y as u32, FILLED);
        }
    }

    mask
}

/// Zero every pixel of `img` where the mask is zero
pub fn apply_mask(img: &RgbImage, mask: &GrayImage) -> RgbImage {
    let mut out = img.clone();
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        if mask.get_pixel(x, y)[0] == 0 {
            *pixel = Rgb([0, 0, 0]);
        }
    }
    out
}

/// Cut the bounding box out of an image, clamped to its bounds
pub fn crop_to(img: &RgbImage, bbox: &BoundingBox) -> RgbImage {
    let x = bbox.x.min(img.width().saturating_sub(1));
    let y = bbox.y.min(img.height().saturating_sub(1));
    let width = bbox.width.min(img.width() - x).max(1);
    let height = bbox.height.min(img.height() - y).max(1);
    imageops::crop_imm(img, x, y, width, height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contour(points: &[(i32, i32)]) -> Contour {
        Contour::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn test_mask_covers_interior_and_boundary() {
        let c = contour(&[(2, 2), (2, 6), (8, 6), (8, 2)]);
        let mask = contour_mask(&c, 12, 10);

        for y in 2..=6 {
            for x in 2..=8 {
                assert_eq!(mask.get_pixel(x, y)[0], 255, "({}, {}) should be inside", x, y);
            }
        }
        assert_eq!(mask.get_pixel(1, 1)[0], 0);
        assert_eq!(mask.get_pixel(9, 4)[0], 0);
        assert_eq!(mask.get_pixel(5, 7)[0], 0);
    }

    #[test]
    fn test_mask_for_degenerate_contour() {
        let c = contour(&[(3, 3)]);
        let mask = contour_mask(&c, 6, 6);
        assert_eq!(mask.get_pixel(3, 3)[0], 255);
        assert_eq!(mask.pixels().filter(|p| p[0] == 255).count(), 1);
    }

    #[test]
    fn test_apply_mask_zeroes_outside() {
        let img = RgbImage::from_pixel(4, 4, Rgb([200, 150, 100]));
        let mut mask = GrayImage::new(4, 4);
        mask.put_pixel(1, 1, FILLED);

        let out = apply_mask(&img, &mask);
        assert_eq!(out.get_pixel(1, 1), &Rgb([200, 150, 100]));
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(3, 3), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_crop_to_clamps_window() {
        let img = RgbImage::new(10, 8);
        let bbox = BoundingBox { x: 6, y: 5, width: 10, height: 10 };
        let cropped = crop_to(&img, &bbox);
        assert_eq!(cropped.dimensions(), (4, 3));
    }
}
