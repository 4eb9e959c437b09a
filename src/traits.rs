//! Capability descriptors shared by containers and expressions.

use std::fmt::Debug;

use alias::AliasKey;
use dispatch::{self, AssignMode, DenseLines, TargetKind};
use element::Element;
use structure::Structure;

/// Memory layout of a dense matrix (or the compression direction of a sparse one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOrder {
    RowMajor,
    ColumnMajor,
}
impl StorageOrder {
    /// Offset of element `(i, j)` in a contiguous `rows x columns` buffer.
    #[inline]
    pub fn offset(self, i: usize, j: usize, rows: usize, columns: usize) -> usize {
        match self {
            StorageOrder::RowMajor => i * columns + j,
            StorageOrder::ColumnMajor => j * rows + i,
        }
    }
    /// Maps a (major, minor) position to matrix coordinates `(i, j)`.
    #[inline]
    pub fn coordinates(self, major: usize, minor: usize) -> (usize, usize) {
        match self {
            StorageOrder::RowMajor => (major, minor),
            StorageOrder::ColumnMajor => (minor, major),
        }
    }
    /// Number of major lines and their length for a `rows x columns` matrix.
    #[inline]
    pub fn lines(self, rows: usize, columns: usize) -> (usize, usize) {
        match self {
            StorageOrder::RowMajor => (rows, columns),
            StorageOrder::ColumnMajor => (columns, rows),
        }
    }
    pub fn opposite(self) -> StorageOrder {
        match self {
            StorageOrder::RowMajor => StorageOrder::ColumnMajor,
            StorageOrder::ColumnMajor => StorageOrder::RowMajor,
        }
    }
}

/// Type-level storage order.
pub trait Order: Debug + Clone + Copy + Default + Send + Sync + 'static {
    const ORDER: StorageOrder;
    type Opposite: Order;
}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowMajor;
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMajor;
impl Order for RowMajor {
    const ORDER: StorageOrder = StorageOrder::RowMajor;
    type Opposite = ColumnMajor;
}
impl Order for ColumnMajor {
    const ORDER: StorageOrder = StorageOrder::ColumnMajor;
    type Opposite = RowMajor;
}

/// Type-level vector orientation.
pub trait TransposeFlag: Debug + Clone + Copy + Default + Send + Sync + 'static {
    const IS_ROW: bool;
    type Opposite: TransposeFlag;
}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnVector;
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowVector;
impl TransposeFlag for ColumnVector {
    const IS_ROW: bool = false;
    type Opposite = RowVector;
}
impl TransposeFlag for RowVector {
    const IS_ROW: bool = true;
    type Opposite = ColumnVector;
}

/// Matrices that can be built by evaluating an expression.
pub trait FromExpr<T: Element>: Sized {
    fn from_expr<E: MatrixExpr<Elem = T>>(expr: &E) -> Self;
}

/// Type-level storage kind, mapping to the container an expression evaluates into.
pub trait StorageKind: Debug + Send + Sync + 'static {
    const KIND: TargetKind;
    type Matrix<T: Element, O: Order>: FromExpr<T> + Debug;
}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dense;
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sparse;
impl StorageKind for Dense {
    const KIND: TargetKind = TargetKind::Dense;
    type Matrix<T: Element, O: Order> = ::dense::DynamicMatrix<T, O>;
}
impl StorageKind for Sparse {
    const KIND: TargetKind = TargetKind::Sparse;
    type Matrix<T: Element, O: Order> = ::sparse::CompressedMatrix<T, O>;
}

/// Storage kind of the result of combining operands of kinds `L` and `R`; implemented by the
/// operation markers.
pub trait KindRule<L, R> {
    type Output: StorageKind;
}

/// The concrete matrix type an expression evaluates into.
pub type ResultType<E> = <<E as MatrixExpr>::Kind as StorageKind>::Matrix<
    <E as MatrixExpr>::Elem, <E as MatrixExpr>::Order>;

/// Evaluates an expression into a fresh instance of its result type.
pub fn evaluate<E: MatrixExpr>(expr: &E) -> ResultType<E> {
    <ResultType<E> as FromExpr<E::Elem>>::from_expr(expr)
}

/// Element access held for the duration of one evaluation. Readers of containers keep their
/// storage's read guard, so a kernel locks each operand once rather than once per element.
pub trait MatrixReader<T>: Sync {
    fn get(&self, i: usize, j: usize) -> T;
}
impl<'a, T, R: MatrixReader<T>> MatrixReader<T> for &'a R {
    #[inline]
    fn get(&self, i: usize, j: usize) -> T { (**self).get(i, j) }
}

pub trait VectorReader<T>: Sync {
    fn get(&self, i: usize) -> T;
}
impl<'a, T, R: VectorReader<T>> VectorReader<T> for &'a R {
    #[inline]
    fn get(&self, i: usize) -> T { (**self).get(i) }
}

/// The capability contract every matrix, concrete or lazy, fulfils.
pub trait MatrixExpr: Sync + Sized {
    type Elem: Element;
    type Order: Order;
    type Kind: StorageKind;

    /// Lazy expression (captured by value) rather than storage-backed container.
    const IS_EXPRESSION: bool;
    /// Element access computes a value instead of reading stored memory.
    const RETURNS_TEMPORARY: bool;
    const SMP_ASSIGNABLE: bool;
    const IS_RESIZABLE: bool = false;
    const HAS_MUTABLE_DATA_ACCESS: bool = false;
    /// Compile-time extents, 0 if only known at runtime.
    const STATIC_ROWS: usize = 0;
    const STATIC_COLUMNS: usize = 0;
    const STRUCTURE: Structure;

    type Reader<'a>: MatrixReader<Self::Elem> where Self: 'a;

    fn rows(&self) -> usize;
    fn columns(&self) -> usize;
    /// Locks the operands for reading until the reader is dropped.
    fn reader<'a>(&'a self) -> Self::Reader<'a>;
    /// Element `(i, j)`. Indices are not checked in release builds.
    #[inline]
    fn at(&self, i: usize, j: usize) -> Self::Elem {
        self.reader().get(i, j)
    }

    /// Whether evaluating directly into the storage identified by `key` could read values that
    /// were already overwritten. False positives are allowed, false negatives are not.
    fn can_alias(&self, key: &AliasKey) -> bool;
    /// Whether any operand shares storage with `key`.
    fn is_aliased(&self, key: &AliasKey) -> bool;
    /// Whether this is a container viewing exactly the storage described by `key`.
    fn is_same(&self, _key: &AliasKey) -> bool {
        false
    }

    /// Visits every element that may be non-zero.
    fn for_each_nonzero<F: FnMut(usize, usize, Self::Elem)>(&self, mut f: F) {
        let reader = self.reader();
        for i in 0..self.rows() {
            for j in 0..self.columns() {
                f(i, j, reader.get(i, j));
            }
        }
    }

    /// Evaluates the expression into `target` with the given compound mode.
    fn assign_to(&self, target: &mut DenseLines<Self::Elem>, mode: AssignMode, parallel: bool) {
        dispatch::kernel(self, target, mode, parallel)
    }
}

impl<'a, M: MatrixExpr> MatrixExpr for &'a M {
    type Elem = M::Elem;
    type Order = M::Order;
    type Kind = M::Kind;

    const IS_EXPRESSION: bool = M::IS_EXPRESSION;
    const RETURNS_TEMPORARY: bool = M::RETURNS_TEMPORARY;
    const SMP_ASSIGNABLE: bool = M::SMP_ASSIGNABLE;
    const IS_RESIZABLE: bool = M::IS_RESIZABLE;
    const HAS_MUTABLE_DATA_ACCESS: bool = M::HAS_MUTABLE_DATA_ACCESS;
    const STATIC_ROWS: usize = M::STATIC_ROWS;
    const STATIC_COLUMNS: usize = M::STATIC_COLUMNS;
    const STRUCTURE: Structure = M::STRUCTURE;

    type Reader<'b> = M::Reader<'b> where Self: 'b;

    #[inline]
    fn rows(&self) -> usize { (**self).rows() }
    #[inline]
    fn columns(&self) -> usize { (**self).columns() }
    fn reader<'b>(&'b self) -> M::Reader<'b> { (**self).reader() }
    #[inline]
    fn at(&self, i: usize, j: usize) -> M::Elem { (**self).at(i, j) }
    fn can_alias(&self, key: &AliasKey) -> bool { (**self).can_alias(key) }
    fn is_aliased(&self, key: &AliasKey) -> bool { (**self).is_aliased(key) }
    fn is_same(&self, key: &AliasKey) -> bool { (**self).is_same(key) }
    fn for_each_nonzero<F: FnMut(usize, usize, M::Elem)>(&self, f: F) {
        (**self).for_each_nonzero(f)
    }
    fn assign_to(&self, target: &mut DenseLines<M::Elem>, mode: AssignMode, parallel: bool) {
        (**self).assign_to(target, mode, parallel)
    }
}

/// The capability contract of vectors.
pub trait VectorExpr: Sync + Sized {
    type Elem: Element;
    type Flag: TransposeFlag;

    const IS_EXPRESSION: bool;
    const SMP_ASSIGNABLE: bool;
    const STATIC_SIZE: usize = 0;

    type Reader<'a>: VectorReader<Self::Elem> where Self: 'a;

    fn size(&self) -> usize;
    fn reader<'a>(&'a self) -> Self::Reader<'a>;
    #[inline]
    fn at(&self, i: usize) -> Self::Elem {
        self.reader().get(i)
    }
    fn can_alias(&self, key: &AliasKey) -> bool;
    fn is_aliased(&self, key: &AliasKey) -> bool;
    fn is_same(&self, _key: &AliasKey) -> bool {
        false
    }

    /// Visits every element that may be non-zero, in ascending index order.
    fn for_each_nonzero<F: FnMut(usize, Self::Elem)>(&self, mut f: F) {
        let reader = self.reader();
        for i in 0..self.size() {
            f(i, reader.get(i));
        }
    }

    fn assign_to(&self, target: &mut [Self::Elem], _key: &AliasKey, mode: AssignMode,
            parallel: bool) {
        dispatch::vector_kernel(self, target, mode, parallel)
    }
}

impl<'a, V: VectorExpr> VectorExpr for &'a V {
    type Elem = V::Elem;
    type Flag = V::Flag;

    const IS_EXPRESSION: bool = V::IS_EXPRESSION;
    const SMP_ASSIGNABLE: bool = V::SMP_ASSIGNABLE;
    const STATIC_SIZE: usize = V::STATIC_SIZE;

    type Reader<'b> = V::Reader<'b> where Self: 'b;

    #[inline]
    fn size(&self) -> usize { (**self).size() }
    fn reader<'b>(&'b self) -> V::Reader<'b> { (**self).reader() }
    #[inline]
    fn at(&self, i: usize) -> V::Elem { (**self).at(i) }
    fn can_alias(&self, key: &AliasKey) -> bool { (**self).can_alias(key) }
    fn is_aliased(&self, key: &AliasKey) -> bool { (**self).is_aliased(key) }
    fn is_same(&self, key: &AliasKey) -> bool { (**self).is_same(key) }
    fn for_each_nonzero<F: FnMut(usize, V::Elem)>(&self, f: F) {
        (**self).for_each_nonzero(f)
    }
    fn assign_to(&self, target: &mut [V::Elem], key: &AliasKey, mode: AssignMode,
            parallel: bool) {
        (**self).assign_to(target, key, mode, parallel)
    }
}

/// Containers supporting checked element updates.
pub trait ElementMut: MatrixExpr {
    fn set_element(&mut self, i: usize, j: usize, value: Self::Elem) -> ::errors::Result<()>;
}

/// Snapshot of the capability facts of a matrix type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub order: StorageOrder,
    pub kind: TargetKind,
    pub is_expression: bool,
    pub returns_temporary: bool,
    pub smp_assignable: bool,
    pub is_resizable: bool,
    pub has_mutable_data_access: bool,
    pub static_rows: usize,
    pub static_columns: usize,
    pub structure: Structure,
}

pub fn capabilities<E: MatrixExpr>() -> Capabilities {
    Capabilities {
        order: <E::Order as Order>::ORDER,
        kind: <E::Kind as StorageKind>::KIND,
        is_expression: E::IS_EXPRESSION,
        returns_temporary: E::RETURNS_TEMPORARY,
        smp_assignable: E::SMP_ASSIGNABLE,
        is_resizable: E::IS_RESIZABLE,
        has_mutable_data_access: E::HAS_MUTABLE_DATA_ACCESS,
        static_rows: E::STATIC_ROWS,
        static_columns: E::STATIC_COLUMNS,
        structure: E::STRUCTURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        assert_eq!(StorageOrder::RowMajor.offset(1, 2, 3, 4), 6);
        assert_eq!(StorageOrder::ColumnMajor.offset(1, 2, 3, 4), 7);
        assert_eq!(StorageOrder::ColumnMajor.coordinates(2, 1), (1, 2));
        assert_eq!(StorageOrder::ColumnMajor.lines(3, 4), (4, 3));
        assert_eq!(<<RowMajor as Order>::Opposite as Order>::ORDER, StorageOrder::ColumnMajor);
    }

    #[test]
    fn test_flags() {
        assert!(RowVector::IS_ROW);
        assert!(!<<RowVector as TransposeFlag>::Opposite as TransposeFlag>::IS_ROW);
    }
}
