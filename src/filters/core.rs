//! Core utilities shared by the filters:
//! - Gaussian kernel generation
//! - Border index clamping (edge replication)

/// Generate a normalized 1D Gaussian kernel with a fixed footprint.
///
/// # Arguments
/// * `size` - Number of taps; forced odd
/// * `sigma` - Standard deviation of the Gaussian
///
/// # Returns
/// Kernel weights summing to 1.0. A non-positive `sigma` yields the
/// delta kernel (identity blur).
pub fn gaussian_kernel_1d(size: usize, sigma: f64) -> Vec<f32> {
    let size = size | 1;
    let half = (size / 2) as f64;

    if sigma <= 0.0 {
        let mut kernel = vec![0.0f32; size];
        kernel[size / 2] = 1.0;
        return kernel;
    }

    // Accumulate in f64 so the normalized taps are stable across platforms
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / sum) as f32).collect()
}

/// Clamp a signed coordinate into `0..len`, replicating the border pixel.
///
/// `len` must be non-zero.
#[inline]
pub fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}
