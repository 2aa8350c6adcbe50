#![allow(dead_code)]

use edgemap::ImageBuffer;

/// Deterministic MINSTD generator so fixtures are reproducible.
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg {
            state: seed.wrapping_add(1),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(48271) % 2147483647;
        self.state as u32
    }

    /// Uniform value in `0..=max`.
    pub fn below(&mut self, max: u8) -> u8 {
        (self.next_u32() % (max as u32 + 1)) as u8
    }
}

/// RGBA frame with a sharp vertical step at column `split`: intensity 0 on
/// the left and 255 on the right, plus per-pixel noise of up to `noise`
/// levels pulled toward the middle. Alpha is always 255.
pub fn noisy_vertical_step_rgba(width: usize, height: usize, split: usize, noise: u8, seed: u64) -> ImageBuffer {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut rng = Lcg::new(seed);
    let mut data = Vec::with_capacity(width * height * 4);
    for _y in 0..height {
        for x in 0..width {
            let n = rng.below(noise);
            let v = if x < split { n } else { 255 - n };
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    ImageBuffer::from_raw(width, height, 4, data).expect("valid fixture")
}

/// Uniformly random bytes in the given shape.
pub fn random_image(width: usize, height: usize, channels: usize, seed: u64) -> ImageBuffer {
    let mut rng = Lcg::new(seed);
    let data: Vec<u8> = (0..width * height * channels)
        .map(|_| (rng.next_u32() & 0xff) as u8)
        .collect();
    ImageBuffer::from_raw(width, height, channels, data).expect("valid fixture")
}

/// Two flat halves split at the middle column, each pixel set to `left` or
/// `right` bytes verbatim.
pub fn two_tone(width: usize, height: usize, left: &[u8], right: &[u8]) -> ImageBuffer {
    assert_eq!(left.len(), right.len(), "both halves need the same channel count");
    let channels = left.len();
    let mut data = Vec::with_capacity(width * height * channels);
    for _y in 0..height {
        for x in 0..width {
            data.extend_from_slice(if x < width / 2 { left } else { right });
        }
    }
    ImageBuffer::from_raw(width, height, channels, data).expect("valid fixture")
}

/// Columns that are "on" in the given row of an RGBA edge map.
pub fn on_columns(edges: &ImageBuffer, row: usize) -> Vec<usize> {
    let view = edges.view();
    (0..edges.width()).filter(|&x| view[[row, x, 0]] == 255).collect()
}
