//! Separable Gaussian blur over an RGB buffer
use crate::{Image, ImageMut, ImageOwned, Rgb, Scalar};

/// Apply a Gaussian blur with standard deviation `sigma` in place
///
/// Two one-dimensional passes, horizontal then vertical. Pixels near the
/// border renormalize by the in-bounds weight sum. `sigma <= 0` is a no-op.
pub fn gaussian_blur(image: &mut ImageOwned<Rgb>, sigma: Scalar) {
    if sigma <= 0.0 {
        return;
    }
    let width = image.width();
    let height = image.height();
    if width == 0 || height == 0 {
        return;
    }

    let kernel = kernel(sigma);
    let radius = kernel.len() / 2;

    // horizontal pass
    let mut pass = image.clone();
    for y in 0..height {
        for x in 0..width {
            let mut sum = [0.0f32; 3];
            let mut weight_sum = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = x as isize + k as isize - radius as isize;
                if sx < 0 || sx >= width as isize {
                    continue;
                }
                let Rgb([r, g, b]) = *image.get(y, sx as usize).expect("in bounds");
                let weight = *weight as f32;
                sum[0] += r * weight;
                sum[1] += g * weight;
                sum[2] += b * weight;
                weight_sum += weight;
            }
            if weight_sum > 0.0 {
                *pass.get_mut(y, x).expect("in bounds") =
                    Rgb([sum[0] / weight_sum, sum[1] / weight_sum, sum[2] / weight_sum]);
            }
        }
    }

    // vertical pass
    for y in 0..height {
        for x in 0..width {
            let mut sum = [0.0f32; 3];
            let mut weight_sum = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sy = y as isize + k as isize - radius as isize;
                if sy < 0 || sy >= height as isize {
                    continue;
                }
                let Rgb([r, g, b]) = *pass.get(sy as usize, x).expect("in bounds");
                let weight = *weight as f32;
                sum[0] += r * weight;
                sum[1] += g * weight;
                sum[2] += b * weight;
                weight_sum += weight;
            }
            if weight_sum > 0.0 {
                *image.get_mut(y, x).expect("in bounds") =
                    Rgb([sum[0] / weight_sum, sum[1] / weight_sum, sum[2] / weight_sum]);
            }
        }
    }
}

/// Normalized 1D Gaussian kernel, radius `ceil(3 sigma)` capped at 100
fn kernel(sigma: Scalar) -> Vec<Scalar> {
    let radius = ((sigma * 3.0).ceil() as usize).clamp(1, 100);
    let size = 2 * radius + 1;
    let sigma2 = sigma * sigma;
    let mut kernel = Vec::with_capacity(size);
    let mut sum = 0.0;
    for i in 0..size {
        let x = i as Scalar - radius as Scalar;
        let g = (-(x * x) / (2.0 * sigma2)).exp();
        kernel.push(g);
        sum += g;
    }
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_approx_eq, Size};

    #[test]
    fn test_kernel_normalized() {
        for sigma in [0.5, 1.0, 2.5] {
            let kernel = kernel(sigma);
            assert_eq!(kernel.len() % 2, 1);
            assert_approx_eq!(kernel.iter().sum::<Scalar>(), 1.0, 1e-9);
            // symmetric around the center
            let radius = kernel.len() / 2;
            for i in 0..radius {
                assert_approx_eq!(kernel[i], kernel[kernel.len() - 1 - i], 1e-12);
            }
        }
    }

    #[test]
    fn test_blur_preserves_flat_image() {
        let mut image = ImageOwned::new_with(Size::new(8, 8), Rgb::new(0.25, 0.5, 0.75));
        gaussian_blur(&mut image, 1.5);
        for pixel in image.iter() {
            assert_approx_eq!(pixel.0[0] as Scalar, 0.25, 1e-5);
            assert_approx_eq!(pixel.0[1] as Scalar, 0.5, 1e-5);
            assert_approx_eq!(pixel.0[2] as Scalar, 0.75, 1e-5);
        }
    }

    #[test]
    fn test_blur_spreads_impulse() {
        let mut image = ImageOwned::new_with(Size::new(9, 9), Rgb::new(0.0, 0.0, 0.0));
        *image.get_mut(4, 4).unwrap() = Rgb::new(1.0, 1.0, 1.0);
        gaussian_blur(&mut image, 1.0);
        let center = image.get(4, 4).unwrap().0[0];
        let neighbor = image.get(4, 5).unwrap().0[0];
        let far = image.get(0, 0).unwrap().0[0];
        assert!(center < 1.0);
        assert!(neighbor > 0.0 && neighbor < center);
        assert!(far < neighbor);
    }

    #[test]
    fn test_blur_noop() {
        let mut image = ImageOwned::new_with(Size::new(2, 2), Rgb::new(0.5, 0.5, 0.5));
        let copy = image.clone();
        gaussian_blur(&mut image, 0.0);
        assert!(image.iter().zip(copy.iter()).all(|(a, b)| a == b));
        let mut empty: ImageOwned<Rgb> = ImageOwned::empty();
        gaussian_blur(&mut empty, 1.0);
    }
}
