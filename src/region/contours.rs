use image::GrayImage;
use image::imageops::replace;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use crate::models::Contour;

/// Find the outer boundaries of foreground (non-zero) regions.
///
/// Holes and anything nested inside a hole are skipped; only top-level
/// outer borders are returned, each compressed with [`compress_chain`].
/// Pixels outside the frame count as background, so regions touching the
/// image edge are traced like any other.
pub fn find_external_contours(binary: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(&pad_with_background(binary))
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            let points: Vec<Point<i32>> = c.points.iter().map(|p| Point::new(p.x - 1, p.y - 1)).collect();
            Contour::new(compress_chain(&points))
        })
        .collect()
}

/// Copy into a frame one background pixel wider on every side.
///
/// `find_contours` only opens an outer border after a zero pixel on the left,
/// so foreground on column 0 would otherwise be missed or read as a hole.
fn pad_with_background(binary: &GrayImage) -> GrayImage {
    let mut padded = GrayImage::new(binary.width() + 2, binary.height() + 2);
    replace(&mut padded, binary, 1, 1);
    padded
}

/// Drop the interior points of straight horizontal, vertical and diagonal
/// runs so that each run is described by its two end points.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let direction = |a: Point<i32>, b: Point<i32>| ((b.x - a.x).signum(), (b.y - a.y).signum());

    let kept: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let curr = points[i];
            let next = points[(i + 1) % n];
            direction(prev, curr) != direction(curr, next)
        })
        .map(|i| points[i])
        .collect();

    // all points collinear in one direction
    if kept.is_empty() {
        return vec![points[0]];
    }
    kept
}

/// Pick the contour with the largest enclosed area.
///
/// On ties the earliest contour in scan order wins.
pub fn largest_contour(contours: &[Contour]) -> Option<&Contour> {
    let mut best: Option<&Contour> = None;
    for contour in contours {
        match best {
            Some(b) if contour.area() <= b.area() => {}
            _ => best = Some(contour),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn fill(img: &mut GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, value: u8) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }

    #[test]
    fn test_blank_image_has_no_contours() {
        let img = GrayImage::new(30, 20);
        assert!(find_external_contours(&img).is_empty());
    }

    #[test]
    fn test_rectangle_compresses_to_corners() {
        let mut img = GrayImage::new(30, 20);
        fill(&mut img, 5, 4, 14, 9, 255);

        let contours = find_external_contours(&img);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4);
        assert_eq!(contours[0].area(), 45.0);

        let bbox = contours[0].bounding_box().unwrap();
        assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (5, 4, 10, 6));
    }

    #[test]
    fn test_holes_and_nested_regions_are_ignored() {
        let mut img = GrayImage::new(40, 40);
        // Ring with a blob inside the hole
        fill(&mut img, 2, 2, 37, 37, 255);
        fill(&mut img, 8, 8, 31, 31, 0);
        fill(&mut img, 15, 15, 20, 20, 255);

        let contours = find_external_contours(&img);
        assert_eq!(contours.len(), 1);
        let bbox = contours[0].bounding_box().unwrap();
        assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (2, 2, 36, 36));
    }

    #[test]
    fn test_region_touching_left_edge_is_found() {
        let mut img = GrayImage::new(40, 40);
        fill(&mut img, 0, 0, 19, 39, 255);

        let contours = find_external_contours(&img);
        assert_eq!(contours.len(), 1);
        let bbox = contours[0].bounding_box().unwrap();
        assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (0, 0, 20, 40));
    }

    #[test]
    fn test_full_foreground_is_one_frame_contour() {
        for size in 1..12 {
            let img = GrayImage::from_pixel(size, size, Luma([255u8]));
            let contours = find_external_contours(&img);
            assert_eq!(contours.len(), 1, "size {}", size);
            let bbox = contours[0].bounding_box().unwrap();
            assert_eq!((bbox.x, bbox.y, bbox.width, bbox.height), (0, 0, size, size));
        }
    }

    #[test]
    fn test_region_touching_frame_keeps_inner_blob_nested() {
        // Background-coloured frame around a dark ring with a blob inside
        let mut img = GrayImage::from_pixel(30, 30, Luma([255u8]));
        fill(&mut img, 5, 5, 24, 24, 0);
        fill(&mut img, 10, 10, 19, 19, 255);

        let contours = find_external_contours(&img);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_box().unwrap().width, 30);
    }

    #[test]
    fn test_largest_contour_selected() {
        let mut img = GrayImage::new(50, 30);
        fill(&mut img, 1, 1, 5, 5, 255);
        fill(&mut img, 10, 2, 40, 25, 255);
        fill(&mut img, 44, 1, 47, 3, 255);

        let contours = find_external_contours(&img);
        assert_eq!(contours.len(), 3);

        let largest = largest_contour(&contours).unwrap();
        assert_eq!(largest.bounding_box().unwrap().x, 10);
    }

    #[test]
    fn test_largest_contour_tie_keeps_first() {
        let square = |x: i32| Contour::new(vec![
            Point::new(x, 0), Point::new(x, 3), Point::new(x + 3, 3), Point::new(x + 3, 0),
        ]);
        let contours = vec![square(0), square(10)];
        let largest = largest_contour(&contours).unwrap();
        assert_eq!(largest.points[0].x, 0);
    }

    #[test]
    fn test_largest_contour_empty() {
        assert!(largest_contour(&[]).is_none());
    }

    #[test]
    fn test_compress_chain_keeps_turns() {
        let pts: Vec<Point<i32>> = [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 1)]
            .iter()
            .map(|&(x, y)| Point::new(x, y))
            .collect();
        let compressed = compress_chain(&pts);
        assert_eq!(compressed, vec![Point::new(0, 0), Point::new(2, 0), Point::new(2, 2)]);
    }
}
