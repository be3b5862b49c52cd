/// Borrowed RGBA frame, row-major, 4 bytes per pixel.
#[derive(Clone, Copy, Debug)]
pub struct RgbaImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // len = w*h*4
}

/// Owned RGBA frame, row-major, 4 bytes per pixel.
#[derive(Clone, Debug)]
pub struct RgbaImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbaImage {
    /// Frame filled with a single color.
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn view(&self) -> RgbaImageView<'_> {
        RgbaImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn put_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let i = (y * self.width + x) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }
}

impl RgbaImageView<'_> {
    /// Whether `data` holds exactly `width * height` pixels.
    pub fn is_consistent(&self) -> bool {
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(4))
            .is_some_and(|n| n == self.data.len())
    }

    /// RGBA at integer coordinates. Caller guarantees bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

#[inline]
fn get_rgba(src: &RgbaImageView<'_>, x: i32, y: i32) -> [f32; 4] {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return [0.0; 4];
    }
    let px = src.pixel(x as usize, y as usize);
    [px[0] as f32, px[1] as f32, px[2] as f32, px[3] as f32]
}

/// Bilinear RGBA sample at a continuous pixel position (pixel centers at integers).
///
/// Coordinates are clamped into the frame so the border does not bleed black.
pub fn sample_bilinear_rgba(src: &RgbaImageView<'_>, x: f32, y: f32) -> [u8; 4] {
    if src.width == 0 || src.height == 0 {
        return [0; 4];
    }
    let x = x.clamp(0.0, (src.width - 1) as f32);
    let y = y.clamp(0.0, (src.height - 1) as f32);
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    // neighbors past the last row/column are never weighted (fx/fy == 0 there)
    let x1 = (x0 + 1).min(src.width as i32 - 1);
    let y1 = (y0 + 1).min(src.height as i32 - 1);

    let p00 = get_rgba(src, x0, y0);
    let p10 = get_rgba(src, x1, y0);
    let p01 = get_rgba(src, x0, y1);
    let p11 = get_rgba(src, x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let a = p00[c] + fx * (p10[c] - p00[c]);
        let b = p01[c] + fx * (p11[c] - p01[c]);
        out[c] = (a + fy * (b - a)).round().clamp(0.0, 255.0) as u8;
    }
    out
}
