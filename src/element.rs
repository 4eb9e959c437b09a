use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num::{Complex, One, Zero};
use rand::Rng;

/// Scalar types that can be stored in a matrix or vector.
pub trait Element: Copy + Send + Sync + fmt::Debug + fmt::Display + PartialEq + Zero + One
    + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Neg<Output = Self>
    + 'static
{
    /// Whether the type carries an imaginary part. Scaling by a complex scalar does not preserve
    /// hermiticity.
    const IS_COMPLEX: bool;

    fn conjugate(self) -> Self;
    /// The value with its imaginary part dropped.
    fn real_part(self) -> Self;
    /// Absolute value (modulus for complex values).
    fn magnitude(self) -> f64;
    /// Draws a small random value, used by the random matrix creators.
    fn sample<R: Rng>(rng: &mut R) -> Self;

    /// Computes `c = a * b` for row-major `a` (m x k) and `b` (k x n) through an external BLAS,
    /// returning false if no BLAS kernel exists for this type.
    fn gemm(_m: usize, _n: usize, _k: usize, _a: &[Self], _b: &[Self], _c: &mut [Self]) -> bool {
        false
    }
}

macro_rules! real_element {
    ($t:ty, $lo:expr, $hi:expr) => {
        impl Element for $t {
            const IS_COMPLEX: bool = false;

            #[inline]
            fn conjugate(self) -> $t { self }
            #[inline]
            fn real_part(self) -> $t { self }
            #[inline]
            fn magnitude(self) -> f64 { (self as f64).abs() }
            fn sample<R: Rng>(rng: &mut R) -> $t { rng.gen_range($lo..=$hi) }
        }
    }
}
real_element!(i32, -5, 5);
real_element!(i64, -5, 5);

impl Element for f32 {
    const IS_COMPLEX: bool = false;

    #[inline]
    fn conjugate(self) -> f32 { self }
    #[inline]
    fn real_part(self) -> f32 { self }
    #[inline]
    fn magnitude(self) -> f64 { (self as f64).abs() }
    fn sample<R: Rng>(rng: &mut R) -> f32 { rng.gen_range(-1.0..1.0) }

    #[cfg(feature = "blas")]
    fn gemm(m: usize, n: usize, k: usize, a: &[f32], b: &[f32], c: &mut [f32]) -> bool {
        // row-major c = a * b is column-major c' = b' * a'
        let (m, n, k) = (m as i32, n as i32, k as i32);
        unsafe {
            ::blas::sgemm(b'N', b'N', n, m, k, 1.0, b, n, a, k, 0.0, c, n);
        }
        true
    }
}

impl Element for f64 {
    const IS_COMPLEX: bool = false;

    #[inline]
    fn conjugate(self) -> f64 { self }
    #[inline]
    fn real_part(self) -> f64 { self }
    #[inline]
    fn magnitude(self) -> f64 { self.abs() }
    fn sample<R: Rng>(rng: &mut R) -> f64 { rng.gen_range(-1.0..1.0) }

    #[cfg(feature = "blas")]
    fn gemm(m: usize, n: usize, k: usize, a: &[f64], b: &[f64], c: &mut [f64]) -> bool {
        let (m, n, k) = (m as i32, n as i32, k as i32);
        unsafe {
            ::blas::dgemm(b'N', b'N', n, m, k, 1.0, b, n, a, k, 0.0, c, n);
        }
        true
    }
}

macro_rules! complex_element {
    ($t:ty) => {
        impl Element for Complex<$t> {
            const IS_COMPLEX: bool = true;

            #[inline]
            fn conjugate(self) -> Complex<$t> { self.conj() }
            #[inline]
            fn real_part(self) -> Complex<$t> { Complex::new(self.re, 0.0) }
            #[inline]
            fn magnitude(self) -> f64 { self.norm() as f64 }
            fn sample<R: Rng>(rng: &mut R) -> Complex<$t> {
                Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
            }
        }
    }
}
complex_element!(f32);
complex_element!(f64);
