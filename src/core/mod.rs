//! The core module: integrands and estimators.
pub mod estimators;

use num_traits::Float;

/// Trait which every integrand must implement.
pub trait Integrand<T: Copy>: Send + Sync {
    /// Calculates the value of the integrand at the point `x`. The dimension of the point is given
    /// by the sampler, integrands in this crate accept any number of dimensions.
    fn call(&self, x: &[T]) -> T;
}

/// Squared Euclidean norm of `x`.
pub fn squared_norm<T: Float>(x: &[T]) -> T {
    x.iter().fold(T::zero(), |acc, &v| acc + v * v)
}

/// The Gaussian kernel $f(x) = \exp(-\frac{1}{2} \lVert x \rVert^2)$.
///
/// Its expectation under a $d$-dimensional standard normal is $2^{-d/2}$, under the uniform
/// distribution on $[-1,1]$ it is $\int_{-1}^1 e^{-x^2/2} \mathrm{d}x / 2 \approx 0.8556$ per
/// dimension.
#[derive(Clone, Copy, Debug, Default)]
pub struct GaussianKernel;

impl<T: Float + Send + Sync> Integrand<T> for GaussianKernel {
    fn call(&self, x: &[T]) -> T {
        let half = T::one() / (T::one() + T::one());
        (-half * squared_norm(x)).exp()
    }
}

/// The squared norm $f(x) = \sum_i x_i^2$.
#[derive(Clone, Copy, Debug, Default)]
pub struct SquaredNorm;

impl<T: Float + Send + Sync> Integrand<T> for SquaredNorm {
    fn call(&self, x: &[T]) -> T {
        squared_norm(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn gaussian_kernel_values() {
        assert_eq!(GaussianKernel.call([0.0f64, 0.0, 0.0].as_slice()), 1.0);
        assert_approx_eq!(GaussianKernel.call([1.0f64].as_slice()), (-0.5f64).exp(), 1e-15);
        assert_approx_eq!(GaussianKernel.call([1.0f64, 1.0].as_slice()), (-1.0f64).exp(), 1e-15);
    }

    #[test]
    fn gaussian_kernel_is_radial() {
        let a: f64 = GaussianKernel.call([0.6, -0.8].as_slice());
        let b: f64 = GaussianKernel.call([-1.0, 0.0].as_slice());
        assert_approx_eq!(a, b, 1e-15);
    }

    #[test]
    fn squared_norm_sums_coordinates() {
        assert_eq!(SquaredNorm.call([1.0f64, 2.0, 3.0].as_slice()), 14.0);
        assert_eq!(squared_norm::<f64>(&[]), 0.0);
    }
}
