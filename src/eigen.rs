//! Eigenvalues and eigenvectors of Hermitian and real symmetric matrices.
//!
//! The routines follow the LAPACK `heev`/`syev` conventions: only the triangle selected by `uplo`
//! is read, `jobz = b'N'` computes eigenvalues only and `jobz = b'V'` additionally overwrites the
//! matrix with the orthonormal eigenvectors. Eigenvalues are returned in ascending order.
//!
//! With the `lapack` feature the work is handed to the reference routines; otherwise a cyclic
//! Jacobi solver is used.

use std::cmp::Ordering;

use num::{Complex, Float, Zero};

use dense::DynamicMatrix;
use element::Element;
use errors::*;
use traits::{Order, StorageOrder, TransposeFlag};
use vector::DynamicVector;

const MAX_SWEEPS: usize = 50;

/// Real floating-point element types usable as eigenvalues.
pub trait Real: Element + Float {
    /// Runs LAPACK `?heev` on a column-major `n x n` buffer, returning the `info` code, or
    /// `None` if no LAPACK routine is linked for this type.
    fn lapack_heev(_jobz: u8, _uplo: u8, _n: usize, _a: &mut [Complex<Self>], _w: &mut [Self])
            -> Option<i32> {
        None
    }
    /// Runs LAPACK `?syev`, see `lapack_heev`.
    fn lapack_syev(_jobz: u8, _uplo: u8, _n: usize, _a: &mut [Self], _w: &mut [Self])
            -> Option<i32> {
        None
    }
}

macro_rules! real_type {
    ($t:ty, $heev:ident, $syev:ident) => {
        impl Real for $t {
            #[cfg(feature = "lapack")]
            fn lapack_heev(jobz: u8, uplo: u8, n: usize, a: &mut [Complex<$t>], w: &mut [$t])
                    -> Option<i32> {
                let ni = n as i32;
                let mut info = 0;
                let mut rwork = vec![0.0; (3 * n).saturating_sub(2).max(1)];
                let mut query = vec![Complex::new(0.0, 0.0)];
                unsafe {
                    ::lapack::$heev(jobz, uplo, ni, a, ni, w, &mut query, -1, &mut rwork,
                        &mut info);
                }
                if info != 0 {
                    return Some(info);
                }
                let lwork = (query[0].re as usize).max(1);
                let mut work = vec![Complex::new(0.0, 0.0); lwork];
                unsafe {
                    ::lapack::$heev(jobz, uplo, ni, a, ni, w, &mut work, lwork as i32,
                        &mut rwork, &mut info);
                }
                Some(info)
            }

            #[cfg(feature = "lapack")]
            fn lapack_syev(jobz: u8, uplo: u8, n: usize, a: &mut [$t], w: &mut [$t])
                    -> Option<i32> {
                let ni = n as i32;
                let mut info = 0;
                let mut query = vec![0.0];
                unsafe {
                    ::lapack::$syev(jobz, uplo, ni, a, ni, w, &mut query, -1, &mut info);
                }
                if info != 0 {
                    return Some(info);
                }
                let lwork = (query[0] as usize).max(1);
                let mut work = vec![0.0; lwork];
                unsafe {
                    ::lapack::$syev(jobz, uplo, ni, a, ni, w, &mut work, lwork as i32, &mut info);
                }
                Some(info)
            }
        }
    }
}
real_type!(f32, cheev, ssyev);
real_type!(f64, zheev, dsyev);

fn check_arguments(rows: usize, columns: usize, jobz: u8, uplo: u8) -> Result<()> {
    if rows != columns {
        return Err(Error::from_kind(ErrorKind::InvalidArgument(
            "Invalid non-square matrix provided".to_string())));
    }
    if jobz != b'V' && jobz != b'N' {
        return Err(Error::from_kind(ErrorKind::InvalidArgument(
            "Invalid jobz argument provided".to_string())));
    }
    if uplo != b'L' && uplo != b'U' {
        return Err(Error::from_kind(ErrorKind::InvalidArgument(
            "Invalid uplo argument provided".to_string())));
    }
    Ok(())
}

/// Reads the referenced triangle of `a` into a full Hermitian matrix, column-major.
fn hermitian_from_triangle<T, O>(a: &DynamicMatrix<T, O>, uplo: u8) -> Result<Vec<T>>
        where T: Element, O: Order {
    let n = a.rows();
    let mut full = vec![T::zero(); n * n];
    for j in 0..n {
        for i in 0..n {
            let stored = (uplo == b'L' && i >= j) || (uplo == b'U' && i <= j);
            if !stored {
                continue;
            }
            let value = a.get(i, j)?;
            if i == j {
                full[i + j * n] = value.real_part();
            } else {
                full[i + j * n] = value;
                full[j + i * n] = value.conjugate();
            }
        }
    }
    Ok(full)
}

/// Jacobi rotation annihilating `a[p, q]`, applied as `a <- J^H a J` and `v <- v J`.
fn rotate<R: Real>(a: &mut [Complex<R>], v: &mut [Complex<R>], n: usize, p: usize, q: usize) {
    let apq = a[p + q * n];
    let mag = apq.norm();
    if mag == R::zero() {
        return;
    }
    let phase = (apq / mag).conj();
    let two = R::one() + R::one();
    let theta = (a[q + q * n].re - a[p + p * n].re) / (two * mag);
    let t = theta.signum() / (theta.abs() + (theta * theta + R::one()).sqrt());
    let c = R::one() / (t * t + R::one()).sqrt();
    let s = t * c;

    let (jpp, jpq) = (Complex::new(c, R::zero()), Complex::new(s, R::zero()));
    let (jqp, jqq) = (phase * -s, phase * c);

    for k in 0..n {
        let (akp, akq) = (a[k + p * n], a[k + q * n]);
        a[k + p * n] = akp * jpp + akq * jqp;
        a[k + q * n] = akp * jpq + akq * jqq;
    }
    for k in 0..n {
        let (apk, aqk) = (a[p + k * n], a[q + k * n]);
        a[p + k * n] = jpp.conj() * apk + jqp.conj() * aqk;
        a[q + k * n] = jpq.conj() * apk + jqq.conj() * aqk;
    }
    a[p + q * n] = Complex::zero();
    a[q + p * n] = Complex::zero();
    a[p + p * n].im = R::zero();
    a[q + q * n].im = R::zero();

    if !v.is_empty() {
        for k in 0..n {
            let (vkp, vkq) = (v[k + p * n], v[k + q * n]);
            v[k + p * n] = vkp * jpp + vkq * jqp;
            v[k + q * n] = vkp * jpq + vkq * jqq;
        }
    }
}

/// Cyclic Jacobi eigen solver on a full column-major Hermitian matrix. Returns the eigenvalues
/// in ascending order along with the matching eigenvectors as columns (empty unless requested).
fn jacobi<R: Real>(mut a: Vec<Complex<R>>, n: usize, vectors: bool)
        -> Result<(Vec<R>, Vec<Complex<R>>)> {
    let mut v = Vec::new();
    if vectors {
        v = vec![Complex::zero(); n * n];
        for i in 0..n {
            v[i + i * n] = Complex::new(R::one(), R::zero());
        }
    }

    let scale = a.iter().fold(R::zero(), |acc, x| acc + x.norm_sqr());
    let tolerance = R::epsilon() * R::epsilon() * scale;
    let off_diagonal = |a: &[Complex<R>]| {
        let mut off = R::zero();
        for j in 0..n {
            for i in 0..n {
                if i != j {
                    off = off + a[i + j * n].norm_sqr();
                }
            }
        }
        off
    };

    let mut sweeps = 0;
    while off_diagonal(&a) > tolerance {
        if sweeps == MAX_SWEEPS {
            return Err(Error::from_kind(ErrorKind::ComputationFailed(format!(
                "eigenvalue iteration did not converge after {} sweeps", MAX_SWEEPS))));
        }
        for p in 0..n {
            for q in p + 1..n {
                rotate(&mut a, &mut v, n, p, q);
            }
        }
        sweeps += 1;
    }
    debug!("jacobi eigen solver converged: n = {}, sweeps = {}", n, sweeps);

    let mut perm: Vec<usize> = (0..n).collect();
    perm.sort_by(|&x, &y| {
        a[x + x * n].re.partial_cmp(&a[y + y * n].re).unwrap_or(Ordering::Equal)
    });
    let values = perm.iter().map(|&k| a[k + k * n].re).collect();
    let mut sorted = Vec::new();
    if vectors {
        sorted.reserve(n * n);
        for &k in &perm {
            sorted.extend_from_slice(&v[k * n..(k + 1) * n]);
        }
    }
    Ok((values, sorted))
}

/// Overwrites `a` with eigenvectors given as the columns of a column-major buffer. Column-major
/// storage receives them as columns, row-major storage as conjugated rows.
fn store_vectors<T, O>(a: &mut DynamicMatrix<T, O>, vectors: &[T]) -> Result<()>
        where T: Element, O: Order {
    let n = a.rows();
    for j in 0..n {
        for i in 0..n {
            let value = vectors[i + j * n];
            match O::ORDER {
                StorageOrder::ColumnMajor => a.set(i, j, value)?,
                StorageOrder::RowMajor => a.set(j, i, value.conjugate())?,
            }
        }
    }
    Ok(())
}

fn store_values<R, F>(w: &mut DynamicVector<R, F>, values: &[R])
        where R: Real, F: TransposeFlag {
    w.resize(values.len());
    w.with_data_mut(|data| data.copy_from_slice(values));
}

fn lapack_failure(routine: &str, info: i32) -> Error {
    Error::from_kind(ErrorKind::ComputationFailed(format!("{} failed with info = {}", routine,
        info)))
}

/// Eigenvalues (and optionally eigenvectors) of the Hermitian matrix whose `uplo` triangle is
/// stored in `a`.
pub fn heev<R, O, F>(a: &mut DynamicMatrix<Complex<R>, O>, w: &mut DynamicVector<R, F>,
        jobz: u8, uplo: u8) -> Result<()>
        where R: Real, Complex<R>: Element, O: Order, F: TransposeFlag {
    check_arguments(a.rows(), a.columns(), jobz, uplo)?;
    let n = a.rows();
    w.resize(n);
    if n == 0 {
        return Ok(());
    }

    let mut full = hermitian_from_triangle(a, uplo)?;
    let mut values = vec![R::zero(); n];
    let vectors = match R::lapack_heev(jobz, uplo, n, &mut full, &mut values) {
        Some(0) => {
            debug!("heev: n = {}, computed by LAPACK", n);
            full
        }
        Some(info) => return Err(lapack_failure("heev", info)),
        None => {
            let (computed, vectors) = jacobi(full, n, jobz == b'V')?;
            values = computed;
            vectors
        }
    };

    store_values(w, &values);
    if jobz == b'V' {
        store_vectors(a, &vectors)?;
    }
    Ok(())
}

/// Real symmetric counterpart of `heev`.
pub fn syev<R, O, F>(a: &mut DynamicMatrix<R, O>, w: &mut DynamicVector<R, F>, jobz: u8,
        uplo: u8) -> Result<()>
        where R: Real, Complex<R>: Element, O: Order, F: TransposeFlag {
    check_arguments(a.rows(), a.columns(), jobz, uplo)?;
    let n = a.rows();
    w.resize(n);
    if n == 0 {
        return Ok(());
    }

    let mut full = hermitian_from_triangle(a, uplo)?;
    let mut values = vec![R::zero(); n];
    let vectors = match R::lapack_syev(jobz, uplo, n, &mut full, &mut values) {
        Some(0) => {
            debug!("syev: n = {}, computed by LAPACK", n);
            full
        }
        Some(info) => return Err(lapack_failure("syev", info)),
        None => {
            let lifted = full.iter().map(|&x| Complex::new(x, R::zero())).collect();
            let (computed, vectors) = jacobi(lifted, n, jobz == b'V')?;
            values = computed;
            vectors.iter().map(|x| x.re).collect()
        }
    };

    store_values(w, &values);
    if jobz == b'V' {
        store_vectors(a, &vectors)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use traits::{ColumnMajor, RowMajor};

    fn c(re: f64, im: f64) -> Complex<f64> { Complex::new(re, im) }

    #[test]
    fn test_heev_identity() {
        let mut a = DynamicMatrix::<Complex<f64>, ColumnMajor>::eye(2);
        let mut w = DynamicVector::<f64>::zeros(0);
        heev(&mut a, &mut w, b'N', b'L').unwrap();
        assert_eq!(w.size(), 2);
        assert_fp_eq!(w.get(0).unwrap(), 1.0);
        assert_fp_eq!(w.get(1).unwrap(), 1.0);
    }

    #[test]
    fn test_heev_argument_checks() {
        let mut w = DynamicVector::<f64>::zeros(0);

        let mut a = DynamicMatrix::<Complex<f64>>::zeros(2, 3);
        let e = heev(&mut a, &mut w, b'N', b'L').unwrap_err();
        assert!(e.is_invalid_argument());
        assert!(format!("{}", e).contains("Invalid non-square matrix provided"));

        let mut a = DynamicMatrix::<Complex<f64>>::eye(2);
        let e = heev(&mut a, &mut w, b'X', b'L').unwrap_err();
        assert!(format!("{}", e).contains("Invalid jobz argument provided"));
        let e = heev(&mut a, &mut w, b'V', b'X').unwrap_err();
        assert!(format!("{}", e).contains("Invalid uplo argument provided"));

        // shape is checked before the flags
        let mut a = DynamicMatrix::<Complex<f64>>::zeros(3, 2);
        let e = heev(&mut a, &mut w, b'X', b'X').unwrap_err();
        assert!(format!("{}", e).contains("non-square"));
    }

    #[test]
    fn test_heev_empty() {
        let mut a = DynamicMatrix::<Complex<f64>>::zeros(0, 0);
        let mut w = DynamicVector::<f64>::zeros(4);
        heev(&mut a, &mut w, b'V', b'U').unwrap();
        assert_eq!(w.size(), 0);
    }

    #[test]
    fn test_heev_hermitian_vectors() {
        // [[2, -i], [i, 2]] has eigenvalues 1 and 3
        let mut a = DynamicMatrix::<Complex<f64>, ColumnMajor>::from_vec(2, 2,
            vec![c(2.0, 0.0), c(0.0, 1.0), c(0.0, -1.0), c(2.0, 0.0)]);
        let original = a.clone();
        let mut w = DynamicVector::<f64>::zeros(0);
        heev(&mut a, &mut w, b'V', b'L').unwrap();
        assert_fpvec_eq!(w, vec![1.0, 3.0]);

        // A v = lambda v for every column
        for j in 0..2 {
            let lambda = w.get(j).unwrap();
            for i in 0..2 {
                let mut av = c(0.0, 0.0);
                for k in 0..2 {
                    av = av + original.get(i, k).unwrap() * a.get(k, j).unwrap();
                }
                let lv = a.get(i, j).unwrap() * lambda;
                assert!((av - lv).norm() < 1e-10);
            }
        }
    }

    #[test]
    fn test_heev_row_major_conjugated_rows() {
        let data = vec![c(2.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(2.0, 0.0)];
        let original = DynamicMatrix::<Complex<f64>, RowMajor>::from_vec(2, 2, data.clone());
        let mut a = DynamicMatrix::<Complex<f64>, RowMajor>::from_vec(2, 2, data);
        let mut w = DynamicVector::<f64>::zeros(0);
        heev(&mut a, &mut w, b'V', b'U').unwrap();
        assert_fpvec_eq!(w, vec![1.0, 3.0]);

        for j in 0..2 {
            let lambda = w.get(j).unwrap();
            for i in 0..2 {
                let mut av = c(0.0, 0.0);
                for k in 0..2 {
                    av = av + original.get(i, k).unwrap() * a.get(j, k).unwrap().conj();
                }
                let lv = a.get(j, i).unwrap().conj() * lambda;
                assert!((av - lv).norm() < 1e-10);
            }
        }
    }

    #[test]
    fn test_heev_reads_only_referenced_triangle() {
        let mut lower = DynamicMatrix::<Complex<f64>>::from_vec(2, 2,
            vec![c(1.0, 0.0), c(99.0, 99.0), c(0.0, 0.0), c(1.0, 0.0)]);
        let mut w = DynamicVector::<f64>::zeros(0);
        heev(&mut lower, &mut w, b'N', b'L').unwrap();
        assert_fpvec_eq!(w, vec![1.0, 1.0]);
    }

    #[test]
    fn test_syev() {
        let mut a = mat![4, 1, 0; 1, 3, 1; 0, 1, 2];
        let mut w = DynamicVector::<f64>::zeros(0);
        syev(&mut a, &mut w, b'V', b'U').unwrap();
        assert_fpvec_eq!(w, vec![3.0 - 3.0f64.sqrt(), 3.0, 3.0 + 3.0f64.sqrt()]);

        // orthonormal eigenvectors
        for p in 0..3 {
            for q in 0..3 {
                let mut dot = 0.0;
                for k in 0..3 {
                    dot += a.get(p, k).unwrap() * a.get(q, k).unwrap();
                }
                assert_fp_eq!(dot + 1.0, if p == q { 2.0 } else { 1.0 });
            }
        }
    }

    #[test]
    fn test_syev_diagonal_sorted() {
        let mut a = DynamicMatrix::<f32>::diag(&[3.0, -1.0, 2.0]);
        let mut w = DynamicVector::<f32>::zeros(0);
        syev(&mut a, &mut w, b'N', b'L').unwrap();
        assert_eq!(w.to_vec(), vec![-1.0, 2.0, 3.0]);
    }
}
