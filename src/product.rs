//! Matrix and vector products. Products read every operand element many times, so expression
//! operands are materialised into row-major temporaries before the product is formed.

use num::Zero;
use rayon::prelude::*;

use alias::AliasKey;
use binary::Mult;
use dense::DynamicMatrix;
use dispatch::{self, AssignMode, DenseLines};
use element::Element;
use errors::*;
use structure::Structure;
use traits::{ColumnVector, Dense, FromExpr, KindRule, MatrixExpr, MatrixReader, RowMajor,
    RowVector, VectorExpr, VectorReader};

/// Row-major copy of any matrix expression.
fn snapshot<E: MatrixExpr>(expr: &E) -> Vec<E::Elem> {
    DynamicMatrix::<E::Elem, RowMajor>::from_expr(expr).to_vec()
}

fn snapshot_vector<V: VectorExpr>(expr: &V) -> Vec<V::Elem> {
    let mut values = vec![V::Elem::zero(); expr.size()];
    expr.for_each_nonzero(|i, v| values[i] = v);
    values
}

/// Row-major `m x n` product of the row-major `m x k` matrix `a` and `k x n` matrix `b`.
pub fn gemm<T: Element>(m: usize, n: usize, k: usize, a: &[T], b: &[T], parallel: bool)
        -> Vec<T> {
    let mut c = vec![T::zero(); m * n];
    if m == 0 || n == 0 || T::gemm(m, n, k, a, b, &mut c) {
        return c;
    }
    let row = |i: usize, line: &mut [T]| {
        for p in 0..k {
            let aip = a[i * k + p];
            for (j, slot) in line.iter_mut().enumerate() {
                *slot = *slot + aip * b[p * n + j];
            }
        }
    };
    if parallel {
        c.par_chunks_mut(n).enumerate().for_each(|(i, line)| row(i, line));
    } else {
        for (i, line) in c.chunks_mut(n).enumerate() {
            row(i, line);
        }
    }
    c
}

/// Lazy matrix-matrix product.
#[derive(Debug, Clone)]
pub struct MultExpr<L, R> {
    lhs: L,
    rhs: R,
}

impl<L, R> MultExpr<L, R> where L: MatrixExpr, R: MatrixExpr<Elem = L::Elem> {
    pub fn new(lhs: L, rhs: R) -> Result<MultExpr<L, R>> {
        if lhs.columns() != rhs.rows() {
            return Err(Error::from_kind(ErrorKind::DimensionMismatch(format!(
                "Matrix sizes do not match: cannot multiply {}x{} by {}x{}", lhs.rows(),
                lhs.columns(), rhs.rows(), rhs.columns()))));
        }
        Ok(MultExpr { lhs, rhs })
    }
    pub fn lhs(&self) -> &L { &self.lhs }
    pub fn rhs(&self) -> &R { &self.rhs }
}

/// Element-wise reader of a product: each element is an inner product of a row and a column.
pub struct MultReader<A, B> {
    lhs: A,
    rhs: B,
    inner: usize,
}

impl<T: Element, A: MatrixReader<T>, B: MatrixReader<T>> MatrixReader<T> for MultReader<A, B> {
    fn get(&self, i: usize, j: usize) -> T {
        (0..self.inner).fold(T::zero(), |acc, k| acc + self.lhs.get(i, k) * self.rhs.get(k, j))
    }
}

impl<L, R> MatrixExpr for MultExpr<L, R>
        where L: MatrixExpr, R: MatrixExpr<Elem = L::Elem>, Mult: KindRule<L::Kind, R::Kind> {
    type Elem = L::Elem;
    type Order = L::Order;
    type Kind = <Mult as KindRule<L::Kind, R::Kind>>::Output;

    const IS_EXPRESSION: bool = true;
    const RETURNS_TEMPORARY: bool = true;
    const SMP_ASSIGNABLE: bool = L::SMP_ASSIGNABLE && R::SMP_ASSIGNABLE;
    const STATIC_ROWS: usize = L::STATIC_ROWS;
    const STATIC_COLUMNS: usize = R::STATIC_COLUMNS;
    const STRUCTURE: Structure = Structure::mult(L::STRUCTURE, R::STRUCTURE);

    type Reader<'a> = MultReader<L::Reader<'a>, R::Reader<'a>> where Self: 'a;

    fn rows(&self) -> usize { self.lhs.rows() }
    fn columns(&self) -> usize { self.rhs.columns() }
    fn reader<'a>(&'a self) -> Self::Reader<'a> {
        MultReader { lhs: self.lhs.reader(), rhs: self.rhs.reader(), inner: self.lhs.columns() }
    }

    fn can_alias(&self, key: &AliasKey) -> bool { self.is_aliased(key) }
    fn is_aliased(&self, key: &AliasKey) -> bool {
        self.lhs.is_aliased(key) || self.rhs.is_aliased(key)
    }

    fn assign_to(&self, target: &mut DenseLines<L::Elem>, mode: AssignMode, parallel: bool) {
        let (m, k, n) = (self.lhs.rows(), self.lhs.columns(), self.rhs.columns());
        let values = gemm(m, n, k, &snapshot(&self.lhs), &snapshot(&self.rhs), parallel);
        dispatch::combine_row_major(&values, target, mode, parallel);
    }
}

/// Lazy product of a matrix and a column vector.
#[derive(Debug, Clone)]
pub struct MatVecExpr<M, V> {
    matrix: M,
    vector: V,
}

impl<M, V> MatVecExpr<M, V>
        where M: MatrixExpr, V: VectorExpr<Elem = M::Elem, Flag = ColumnVector> {
    pub fn new(matrix: M, vector: V) -> Result<MatVecExpr<M, V>> {
        if matrix.columns() != vector.size() {
            return Err(Error::from_kind(ErrorKind::DimensionMismatch(format!(
                "Matrix and vector sizes do not match: {}x{} matrix, vector of size {}",
                matrix.rows(), matrix.columns(), vector.size()))));
        }
        Ok(MatVecExpr { matrix, vector })
    }
}

pub struct MatVecReader<A, B> {
    matrix: A,
    vector: B,
    columns: usize,
}

impl<T: Element, A: MatrixReader<T>, B: VectorReader<T>> VectorReader<T> for MatVecReader<A, B> {
    fn get(&self, i: usize) -> T {
        (0..self.columns)
            .fold(T::zero(), |acc, j| acc + self.matrix.get(i, j) * self.vector.get(j))
    }
}

impl<M, V> VectorExpr for MatVecExpr<M, V>
        where M: MatrixExpr, V: VectorExpr<Elem = M::Elem, Flag = ColumnVector> {
    type Elem = M::Elem;
    type Flag = ColumnVector;

    const IS_EXPRESSION: bool = true;
    const SMP_ASSIGNABLE: bool = M::SMP_ASSIGNABLE && V::SMP_ASSIGNABLE;
    const STATIC_SIZE: usize = M::STATIC_ROWS;

    type Reader<'a> = MatVecReader<M::Reader<'a>, V::Reader<'a>> where Self: 'a;

    fn size(&self) -> usize { self.matrix.rows() }
    fn reader<'a>(&'a self) -> Self::Reader<'a> {
        MatVecReader {
            matrix: self.matrix.reader(),
            vector: self.vector.reader(),
            columns: self.vector.size(),
        }
    }

    fn can_alias(&self, key: &AliasKey) -> bool { self.is_aliased(key) }
    fn is_aliased(&self, key: &AliasKey) -> bool {
        self.matrix.is_aliased(key) || self.vector.is_aliased(key)
    }

    fn assign_to(&self, target: &mut [M::Elem], _key: &AliasKey, mode: AssignMode,
            parallel: bool) {
        let (m, n) = (self.matrix.rows(), self.matrix.columns());
        let values = gemm(m, 1, n, &snapshot(&self.matrix), &snapshot_vector(&self.vector),
            parallel);
        dispatch::combine_slice(&values, target, mode, parallel);
    }
}

/// Lazy outer product `a * b` of a column vector and a row vector.
#[derive(Debug, Clone)]
pub struct OuterExpr<A, B> {
    lhs: A,
    rhs: B,
}

impl<A, B> OuterExpr<A, B>
        where A: VectorExpr<Flag = ColumnVector>, B: VectorExpr<Elem = A::Elem, Flag = RowVector> {
    pub fn new(lhs: A, rhs: B) -> OuterExpr<A, B> {
        OuterExpr { lhs, rhs }
    }
}

pub struct OuterReader<A, B> {
    lhs: A,
    rhs: B,
}

impl<T: Element, A: VectorReader<T>, B: VectorReader<T>> MatrixReader<T> for OuterReader<A, B> {
    #[inline]
    fn get(&self, i: usize, j: usize) -> T { self.lhs.get(i) * self.rhs.get(j) }
}

impl<A, B> MatrixExpr for OuterExpr<A, B>
        where A: VectorExpr<Flag = ColumnVector>, B: VectorExpr<Elem = A::Elem, Flag = RowVector> {
    type Elem = A::Elem;
    type Order = RowMajor;
    type Kind = Dense;

    const IS_EXPRESSION: bool = true;
    const RETURNS_TEMPORARY: bool = true;
    const SMP_ASSIGNABLE: bool = A::SMP_ASSIGNABLE && B::SMP_ASSIGNABLE;
    const STATIC_ROWS: usize = A::STATIC_SIZE;
    const STATIC_COLUMNS: usize = B::STATIC_SIZE;
    const STRUCTURE: Structure = Structure::GENERAL;

    type Reader<'a> = OuterReader<A::Reader<'a>, B::Reader<'a>> where Self: 'a;

    fn rows(&self) -> usize { self.lhs.size() }
    fn columns(&self) -> usize { self.rhs.size() }
    fn reader<'a>(&'a self) -> Self::Reader<'a> {
        OuterReader { lhs: self.lhs.reader(), rhs: self.rhs.reader() }
    }

    fn can_alias(&self, key: &AliasKey) -> bool { self.is_aliased(key) }
    fn is_aliased(&self, key: &AliasKey) -> bool {
        self.lhs.is_aliased(key) || self.rhs.is_aliased(key)
    }

    fn assign_to(&self, target: &mut DenseLines<A::Elem>, mode: AssignMode, parallel: bool) {
        let (a, b) = (snapshot_vector(&self.lhs), snapshot_vector(&self.rhs));
        let order = target.order();
        dispatch::for_each_line(target, parallel, |major, line| {
            for (minor, slot) in line.iter_mut().enumerate() {
                let (i, j) = order.coordinates(major, minor);
                *slot = mode.combine(*slot, a[i] * b[j]);
            }
        });
    }
}

/// Inner product of a row vector and a column vector, evaluated immediately. Only the non-zero
/// elements of the left operand are visited.
pub fn inner<A, B>(lhs: &A, rhs: &B) -> Result<A::Elem>
        where A: VectorExpr<Flag = RowVector>, B: VectorExpr<Elem = A::Elem, Flag = ColumnVector> {
    if lhs.size() != rhs.size() {
        return Err(Error::from_kind(ErrorKind::DimensionMismatch(format!(
            "Vector sizes do not match: {} and {}", lhs.size(), rhs.size()))));
    }
    let rhs = rhs.reader();
    let mut acc = A::Elem::zero();
    lhs.for_each_nonzero(|i, v| acc = acc + v * rhs.get(i));
    Ok(acc)
}
