use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;

const BINS: usize = 256;

/// Resize by a uniform factor (bilinear), never below 1x1
pub fn downscale(img: &DynamicImage, factor: f32) -> DynamicImage {
    let width = scaled_dimension(img.width(), factor);
    let height = scaled_dimension(img.height(), factor);
    img.resize_exact(width, height, FilterType::Triangle)
}

fn scaled_dimension(dim: u32, factor: f32) -> u32 {
    ((dim as f32 * factor).round() as u32).max(1)
}

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is split into a `tiles x tiles` grid. Each tile gets its own
/// clipped-histogram lookup table and every output pixel blends the tables
/// of the four nearest tile centres.
pub fn clahe(img: &GrayImage, clip_limit: f32, tiles: u32) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 || tiles == 0 {
        return img.clone();
    }

    let tile_w = width.div_ceil(tiles);
    let tile_h = height.div_ceil(tiles);
    let tile_area = (tile_w * tile_h) as usize;

    let clip = if clip_limit > 0.0 {
        ((clip_limit * tile_area as f32 / BINS as f32) as usize).max(1)
    } else {
        usize::MAX
    };

    let mut luts = Vec::with_capacity((tiles * tiles) as usize);
    for ty in 0..tiles {
        for tx in 0..tiles {
            let mut hist = [0usize; BINS];
            for y in ty * tile_h..(ty + 1) * tile_h {
                let sy = reflect_101(y, height);
                for x in tx * tile_w..(tx + 1) * tile_w {
                    let sx = reflect_101(x, width);
                    hist[img.get_pixel(sx, sy)[0] as usize] += 1;
                }
            }
            clip_histogram(&mut hist, clip);
            luts.push(histogram_lut(&hist, tile_area));
        }
    }

    let lut_at = |tx: u32, ty: u32| &luts[(ty * tiles + tx) as usize];
    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;
    let last = tiles as i64 - 1;

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let tyf = y as f32 * inv_th - 0.5;
        let ty1 = tyf.floor() as i64;
        let ya = tyf - ty1 as f32;
        let ty2 = (ty1 + 1).min(last) as u32;
        let ty1 = ty1.max(0) as u32;

        for x in 0..width {
            let txf = x as f32 * inv_tw - 0.5;
            let tx1 = txf.floor() as i64;
            let xa = txf - tx1 as f32;
            let tx2 = (tx1 + 1).min(last) as u32;
            let tx1 = tx1.max(0) as u32;

            let v = img.get_pixel(x, y)[0] as usize;
            let top = lut_at(tx1, ty1)[v] as f32 * (1.0 - xa) + lut_at(tx2, ty1)[v] as f32 * xa;
            let bottom = lut_at(tx1, ty2)[v] as f32 * (1.0 - xa) + lut_at(tx2, ty2)[v] as f32 * xa;
            let value = top * (1.0 - ya) + bottom * ya;

            out.put_pixel(x, y, Luma([value.round().clamp(0.0, 255.0) as u8]));
        }
    }

    out
}

/// Clip bins at `clip` and hand the excess back out evenly
fn clip_histogram(hist: &mut [usize; BINS], clip: usize) {
    let mut excess = 0;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }

    if excess == 0 {
        return;
    }

    let batch = excess / BINS;
    let mut residual = excess - batch * BINS;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (BINS / residual).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

fn histogram_lut(hist: &[usize; BINS], tile_area: usize) -> [u8; BINS] {
    let scale = (BINS - 1) as f32 / tile_area as f32;
    let mut lut = [0u8; BINS];
    let mut sum = 0usize;
    for (i, count) in hist.iter().enumerate() {
        sum += count;
        lut[i] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Mirror an out-of-range index back inside `0..len` without repeating the edge
fn reflect_101(i: u32, len: u32) -> u32 {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let i = i % period;
    if i < len { i } else { period - i }
}

/// Gaussian sigma used for a square neighbourhood of `block_size` pixels
pub fn block_sigma(block_size: u32) -> f32 {
    0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian weights spanning `block_size` taps
pub fn block_kernel(block_size: u32) -> Vec<f32> {
    let size = block_size.max(1) as usize;
    let sigma = block_sigma(block_size).max(0.1);
    let centre = (size as f32 - 1.0) / 2.0;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - centre;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Binarize against a Gaussian-weighted local mean.
///
/// The mean is taken over a `block_size x block_size` neighbourhood. A pixel
/// becomes foreground (255) when it is brighter than that mean minus
/// `offset`, otherwise background (0).
pub fn adaptive_threshold(img: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let levels: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(img.width(), img.height(), |x, y| Luma([img.get_pixel(x, y)[0] as f32]));
    let mean = separable_filter_equal(&levels, &block_kernel(block_size));

    let mut out = GrayImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let local = mean.get_pixel(x, y)[0].round() as i32;
        let diff = pixel[0] as i32 - local;
        let value = if diff > -offset { 255 } else { 0 };
        out.put_pixel(x, y, Luma([value]));
    }
    out
}
