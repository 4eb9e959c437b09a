use std::fmt;

use rand::Rng;

use alias::AliasKey;
use config::Config;
use dispatch::{self, AssignMode, AssignTarget, DenseLines, TargetKind};
use element::Element;
use errors::*;
use structure::Structure;
use traits::{Dense, ElementMut, MatrixExpr, MatrixReader, Order, RowMajor, StorageOrder};

/// Fixed-size, row-major matrix with inline storage. Its extents are part of the type and it is
/// never split across threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticMatrix<T, const M: usize, const N: usize> {
    data: [[T; N]; M],
}

impl<T: Element, const M: usize, const N: usize> StaticMatrix<T, M, N> {
    pub fn new(data: [[T; N]; M]) -> StaticMatrix<T, M, N> {
        StaticMatrix { data }
    }
    pub fn zeros() -> StaticMatrix<T, M, N> {
        StaticMatrix { data: [[T::zero(); N]; M] }
    }
    pub fn from_fn<F: Fn(usize, usize) -> T>(f: F) -> StaticMatrix<T, M, N> {
        let mut m = StaticMatrix::zeros();
        for i in 0..M {
            for j in 0..N {
                m.data[i][j] = f(i, j);
            }
        }
        m
    }
    pub fn rand_with<R: Rng>(rng: &mut R) -> StaticMatrix<T, M, N> {
        let mut m = StaticMatrix::zeros();
        for row in m.data.iter_mut() {
            for slot in row.iter_mut() {
                *slot = T::sample(rng);
            }
        }
        m
    }

    pub fn rows(&self) -> usize { M }
    pub fn columns(&self) -> usize { N }
    pub fn spacing(&self) -> usize { N }
    pub fn as_rows(&self) -> &[[T; N]; M] { &self.data }

    pub fn get(&self, i: usize, j: usize) -> Result<T> {
        if i >= M || j >= N {
            return Err(Error::from_kind(ErrorKind::IndexError("index out of bounds")));
        }
        Ok(self.data[i][j])
    }
    pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        if i >= M || j >= N {
            return Err(Error::from_kind(ErrorKind::IndexError("index out of bounds")));
        }
        self.data[i][j] = value;
        Ok(())
    }

    pub fn alias_key(&self) -> AliasKey {
        AliasKey::new(&self.data as *const [[T; N]; M] as usize, M, N, StorageOrder::RowMajor)
    }

    /// `self = expr`. The extents are fixed, so a shape mismatch is an error.
    pub fn assign<E: MatrixExpr<Elem = T>>(&mut self, expr: &E) -> Result<()> {
        dispatch::assign_checked(self, expr, AssignMode::Assign, &Config::default())
    }
    pub fn add_assign_expr<E: MatrixExpr<Elem = T>>(&mut self, expr: &E) -> Result<()> {
        dispatch::assign_checked(self, expr, AssignMode::AddAssign, &Config::default())
    }
    pub fn sub_assign_expr<E: MatrixExpr<Elem = T>>(&mut self, expr: &E) -> Result<()> {
        dispatch::assign_checked(self, expr, AssignMode::SubAssign, &Config::default())
    }
}

pub struct StaticReader<'a, T: 'a, const M: usize, const N: usize>(&'a [[T; N]; M]);

impl<'a, T: Element, const M: usize, const N: usize> MatrixReader<T>
        for StaticReader<'a, T, M, N> {
    #[inline]
    fn get(&self, i: usize, j: usize) -> T { self.0[i][j] }
}

impl<T: Element, const M: usize, const N: usize> MatrixExpr for StaticMatrix<T, M, N> {
    type Elem = T;
    type Order = RowMajor;
    type Kind = Dense;

    const IS_EXPRESSION: bool = false;
    const RETURNS_TEMPORARY: bool = false;
    const SMP_ASSIGNABLE: bool = false;
    const HAS_MUTABLE_DATA_ACCESS: bool = true;
    const STATIC_ROWS: usize = M;
    const STATIC_COLUMNS: usize = N;
    const STRUCTURE: Structure = Structure::GENERAL;

    type Reader<'a> = StaticReader<'a, T, M, N> where Self: 'a;

    fn rows(&self) -> usize { M }
    fn columns(&self) -> usize { N }
    fn reader<'a>(&'a self) -> StaticReader<'a, T, M, N> { StaticReader(&self.data) }
    #[inline]
    fn at(&self, i: usize, j: usize) -> T { self.data[i][j] }

    fn can_alias(&self, key: &AliasKey) -> bool {
        self.is_aliased(key)
    }
    fn is_aliased(&self, key: &AliasKey) -> bool {
        self.alias_key().shares_buffer(key)
    }
    fn is_same(&self, key: &AliasKey) -> bool {
        self.alias_key() == *key
    }
}

impl<T: Element, const M: usize, const N: usize> AssignTarget for StaticMatrix<T, M, N> {
    type Elem = T;
    const TARGET_KIND: TargetKind = TargetKind::Dense;
    const TARGET_SMP: bool = false;
    const TARGET_RESIZABLE: bool = false;

    fn shape(&self) -> (usize, usize) { (M, N) }
    fn target_key(&self) -> AliasKey { self.alias_key() }
    fn with_lines<F: FnOnce(&mut DenseLines<T>)>(&mut self, f: F) {
        let key = self.alias_key();
        let lines = self.data.iter_mut().map(|row| &mut row[..]).collect();
        f(&mut DenseLines::from_lines(lines, M, N, <RowMajor as Order>::ORDER, key));
    }
}

impl<T: Element, const M: usize, const N: usize> ElementMut for StaticMatrix<T, M, N> {
    fn set_element(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        self.set(i, j, value)
    }
}

impl<T: Element, const M: usize, const N: usize> fmt::Display for StaticMatrix<T, M, N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.data.iter() {
            for v in row.iter() {
                write!(f, "{} ", v)?;
            }
            write!(f, "\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dense::DynamicMatrix;
    use traits::{capabilities, ColumnMajor};

    #[test]
    fn test_capabilities() {
        let caps = capabilities::<StaticMatrix<f64, 2, 3>>();
        assert_eq!(caps.static_rows, 2);
        assert_eq!(caps.static_columns, 3);
        assert!(!caps.smp_assignable);
        assert!(!caps.is_resizable);
    }

    #[test]
    fn test_assign_from_dynamic() {
        let d = DynamicMatrix::<i32, ColumnMajor>::from_fn(2, 3, |i, j| (i * 3 + j) as i32);
        let mut s = StaticMatrix::<i32, 2, 3>::zeros();
        s.assign(&d).unwrap();
        assert_eq!(s, StaticMatrix::new([[0, 1, 2], [3, 4, 5]]));
        s.add_assign_expr(&d).unwrap();
        assert_eq!(s.at(1, 2), 10);
        s.sub_assign_expr(&d).unwrap();
        assert_eq!(s.at(1, 2), 5);
    }

    #[test]
    fn test_fixed_extents() {
        let d = DynamicMatrix::<f64>::zeros(3, 3);
        let mut s = StaticMatrix::<f64, 2, 2>::zeros();
        assert!(s.assign(&d).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_get_set() {
        let mut s = StaticMatrix::<f64, 2, 2>::zeros();
        s.set(0, 1, 3.0).unwrap();
        assert_eq!(s.get(0, 1).unwrap(), 3.0);
        assert!(s.get(2, 0).is_err());
    }
}
