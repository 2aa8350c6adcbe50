//! Gaussian blur for single-channel u8 planes.
//!
//! Separable 2-pass convolution with edge replication at the borders, so the
//! output keeps the input's dimensions. Both passes run row/column-wise in
//! parallel; every output sample depends only on the input, so the result
//! does not depend on scheduling.

use ndarray::{Array2, ArrayView2, Zip};

use super::core::{clamp_index, gaussian_kernel_1d};

/// Apply a Gaussian blur to an intensity plane.
///
/// # Arguments
/// * `input` - Plane of shape (height, width)
/// * `kernel_size` - Kernel footprint in taps per axis (odd)
/// * `sigma` - Standard deviation of the Gaussian
///
/// # Returns
/// Blurred plane with the same dimensions, rounded to nearest
pub fn gaussian_blur_u8(input: ArrayView2<u8>, kernel_size: usize, sigma: f64) -> Array2<u8> {
    let (height, width) = input.dim();
    if height == 0 || width == 0 {
        return Array2::zeros((height, width));
    }

    let kernel = gaussian_kernel_1d(kernel_size, sigma);
    let half = (kernel.len() / 2) as isize;

    // Horizontal pass (kept in f32 for precision)
    let mut temp = Array2::<f32>::zeros((height, width));
    Zip::indexed(&mut temp).par_for_each(|(y, x), out| {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let sx = clamp_index(x as isize + ki as isize - half, width);
            sum += input[[y, sx]] as f32 * kv;
        }
        *out = sum;
    });

    // Vertical pass
    let mut output = Array2::<u8>::zeros((height, width));
    Zip::indexed(&mut output).par_for_each(|(y, x), out| {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let sy = clamp_index(y as isize + ki as isize - half, height);
            sum += temp[[sy, x]] * kv;
        }
        *out = (sum + 0.5).clamp(0.0, 255.0) as u8;
    });

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_plane_unchanged() {
        let input = Array2::<u8>::from_elem((7, 9), 137);
        let result = gaussian_blur_u8(input.view(), 5, 1.2);
        assert_eq!(result, input);
    }

    #[test]
    fn test_keeps_dimensions() {
        let input = Array2::from_shape_fn((3, 11), |(y, x)| (x * 20 + y) as u8);
        let result = gaussian_blur_u8(input.view(), 5, 1.2);
        assert_eq!(result.dim(), (3, 11));
    }

    #[test]
    fn test_empty_plane() {
        let input = Array2::<u8>::zeros((0, 4));
        let result = gaussian_blur_u8(input.view(), 5, 1.2);
        assert_eq!(result.dim(), (0, 4));
    }

    #[test]
    fn test_step_profile() {
        // Vertical step: columns 0..5 are 0, columns 5..10 are 255
        let input = Array2::from_shape_fn((4, 10), |(_, x)| if x < 5 { 0 } else { 255 });
        let result = gaussian_blur_u8(input.view(), 5, 1.2);

        // Far from the step the plane is untouched
        assert_eq!(result[[0, 0]], 0);
        assert_eq!(result[[0, 2]], 0);
        assert_eq!(result[[0, 7]], 255);
        assert_eq!(result[[0, 9]], 255);

        // 255 * 0.0856 ~ 21.8, 255 * 0.3283 ~ 83.7
        assert_eq!(result[[2, 3]], 22);
        assert_eq!(result[[2, 4]], 84);

        // Symmetric about the step
        assert_eq!(result[[1, 4]] as u16 + result[[1, 5]] as u16, 255);
        assert_eq!(result[[1, 3]] as u16 + result[[1, 6]] as u16, 255);
    }

    #[test]
    fn test_single_pixel_image() {
        let input = Array2::from_elem((1, 1), 42u8);
        let result = gaussian_blur_u8(input.view(), 5, 1.2);
        assert_eq!(result[[0, 0]], 42);
    }
}
