use std::f64;

use element::Element;
use traits::{MatrixExpr, MatrixReader, VectorExpr, VectorReader};

/// Valid vector norm types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Norm {
    /// L1 (absolute value) norm
    L1,
    /// L2 (Euclidean) norm
    L2,
    /// L2 norm, squared (to avoid potentially expensive square root operations)
    L2Sqrd,
    /// Infinity (maximum) norm
    Inf,
    /// Negative infinity (minimum) norm
    NegInf,
    /// General p-norm with specified coefficient
    P(f64),
}

fn norm_of<I: Iterator<Item = f64>>(magnitudes: I, norm_type: Norm) -> f64 {
    match norm_type {
        Norm::L1     => magnitudes.fold(0.0, |acc, f| acc + f),
        Norm::L2     => magnitudes.fold(0.0, |acc, f| acc + f * f).sqrt(),
        Norm::L2Sqrd => magnitudes.fold(0.0, |acc, f| acc + f * f),
        Norm::Inf    => magnitudes.fold(0.0, |acc, f| f.max(acc)),
        Norm::NegInf => magnitudes.fold(f64::INFINITY, |acc, f| f.min(acc)),
        Norm::P(p)   => {
            assert!(p >= 1.0);
            magnitudes.fold(0.0, |acc, f| acc + f.powf(p)).powf(1.0 / p)
        }
    }
}

/// Trait providing vector norms
pub trait VectorNorm {
    /// Compute the specified norm type on the vector.
    ///
    /// #Panics
    /// Panics on a `Norm::P` coefficient below 1.
    fn norm(&self, norm_type: Norm) -> f64;
}

impl<V: VectorExpr> VectorNorm for V {
    fn norm(&self, norm_type: Norm) -> f64 {
        let values = self.reader();
        norm_of((0..self.size()).map(|i| values.get(i).magnitude()), norm_type)
    }
}

/// Valid matrix norm types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatNorm {
    //induced norms
    /// L1-Induced matrix norm (maximum absolute column sum)
    InducedL1,
    /// Infinity-induced matrix norm (maximum absolute row sum)
    InducedInf,

    //entrywise
    /// General entrywise matrix norm, using specified vector norm
    Entrywise(Norm),
    /// L_{2,1} norm (sum of Euclidean norms of the columns of the matrix)
    L21,
    /// L_{p, q} norm
    Lpq(f64, f64),

    /// Frobenius norm (identical to Entrywise(L2) or Lpq(2,2))
    Frobenius,
    /// Max norm (identical to Entrywise(Inf))
    Max,
}

/// Provides method for computing matrix norms.
pub trait MatrixNorm {
    /// Compute the specified matrix norm type
    fn matrix_norm(&self, norm_type: MatNorm) -> f64;
}

fn column_norms<T: Element, R: MatrixReader<T>>(m: &R, rows: usize, columns: usize,
        norm_type: Norm) -> Vec<f64> {
    (0..columns).map(|j| norm_of((0..rows).map(|i| m.get(i, j).magnitude()), norm_type))
        .collect()
}

fn entries<'a, T: Element, R: MatrixReader<T>>(m: &'a R, rows: usize, columns: usize)
        -> impl Iterator<Item = f64> + 'a {
    (0..rows).flat_map(move |i| (0..columns).map(move |j| m.get(i, j).magnitude()))
}

impl<M: MatrixExpr> MatrixNorm for M {
    fn matrix_norm(&self, norm_type: MatNorm) -> f64 {
        let (rows, columns) = (self.rows(), self.columns());
        let m = &self.reader();
        match norm_type {
            MatNorm::InducedL1     => {
                column_norms(m, rows, columns, Norm::L1).into_iter().fold(0.0, |acc, f| acc.max(f))
            }
            MatNorm::InducedInf    => {
                (0..rows).map(|i| norm_of((0..columns).map(|j| m.get(i, j).magnitude()),
                    Norm::L1)).fold(0.0, |acc, f| acc.max(f))
            }
            MatNorm::Entrywise(nt) => { norm_of(entries(m, rows, columns), nt) }
            MatNorm::L21           => {
                norm_of(column_norms(m, rows, columns, Norm::L2).into_iter(), Norm::L1)
            }
            MatNorm::Lpq(p, q)     => {
                assert!(p >= 1.0 && q >= 1.0);
                norm_of(column_norms(m, rows, columns, Norm::P(p)).into_iter(), Norm::P(q))
            }
            MatNorm::Frobenius     => { norm_of(entries(m, rows, columns), Norm::L2) }
            MatNorm::Max           => { norm_of(entries(m, rows, columns), Norm::Inf) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::Complex;
    use vector::DynamicVector;
    use vecexpr::VecSubExpr;

    fn sample() -> DynamicVector<f64> {
        DynamicVector::from_vec(vec![0.77491879, 0.97650547, 0.54472260, -0.20757379, 0.72747111,
            -0.43498534])
    }

    #[test]
    fn test_vector_norms() {
        let a = sample();
        assert_fp_eq!(a.norm(Norm::L1), 3.6661771);
        assert_fp_eq!(a.norm(Norm::L2), 1.6162605);
        assert_fp_eq!(a.norm(Norm::L2Sqrd), 2.6122981);
        assert_fp_eq!(a.norm(Norm::Inf), 0.97650547);
        assert_fp_eq!(a.norm(Norm::NegInf), 0.20757379);
        assert_fp_eq!(a.norm(Norm::P(1.5)), 2.1036332);
    }

    #[test]
    fn test_norm_of_expression() {
        let a = sample();
        let zero = DynamicVector::<f64>::zeros(6);
        let e = VecSubExpr::new(&zero, &a).unwrap();
        assert_fp_eq!(e.norm(Norm::L1), 3.6661771);
    }

    #[test]
    fn test_complex_norm() {
        let a = DynamicVector::<Complex<f64>>::from_vec(vec![Complex::new(3.0, 4.0),
            Complex::new(0.0, -1.0)]);
        assert_fp_eq!(a.norm(Norm::L1), 6.0);
        assert_fp_eq!(a.norm(Norm::Inf), 5.0);
    }

    #[test]
    #[should_panic]
    fn test_p_below_one() {
        sample().norm(Norm::P(0.5));
    }

    #[test]
    fn test_matrix_norms() {
        let a = mat![-1, 2, 3; 4, -5, 6; 7, 8, -9];
        assert_fp_eq!(a.matrix_norm(MatNorm::InducedL1), 18.0);
        assert_fp_eq!(a.matrix_norm(MatNorm::InducedInf), 24.0);
        assert_fp_eq!(a.matrix_norm(MatNorm::Entrywise(Norm::L1)), 45.0);
        assert_fp_eq!(a.matrix_norm(MatNorm::Entrywise(Norm::L2)), 16.881943);
        assert_fp_eq!(a.matrix_norm(MatNorm::Frobenius), 16.881943);
        assert_fp_eq!(a.matrix_norm(MatNorm::Lpq(2.0, 2.0)), 16.881943);
        assert_fp_eq!(a.matrix_norm(MatNorm::Max), 9.0);
        assert_fp_eq!(a.matrix_norm(MatNorm::L21), 28.992661);
    }
}
