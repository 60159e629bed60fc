/// Borrowed row-major image with interleaved channels.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: &'a [u8], // len = w*h*channels
}

/// Owned counterpart of [`ImageView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBuffer {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

impl ImageBuffer {
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
            data: vec![0; width * height * channels],
        }
    }
}

// Outside the image everything reads as 0 (constant black border).
#[inline]
fn get(src: &ImageView<'_>, x: i32, y: i32, c: usize) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[(y as usize * src.width + x as usize) * src.channels + c]
}

#[inline]
pub fn sample_bilinear(src: &ImageView<'_>, x: f32, y: f32, c: usize) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get(src, x0, y0, c) as f32;
    let p10 = get(src, x0 + 1, y0, c) as f32;
    let p01 = get(src, x0, y0 + 1, c) as f32;
    let p11 = get(src, x0 + 1, y0 + 1, c) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &ImageView<'_>, x: f32, y: f32, c: usize) -> u8 {
    sample_bilinear(src, x, y, c).round().clamp(0.0, 255.0) as u8
}
