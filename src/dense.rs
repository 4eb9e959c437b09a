use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use rand::Rng;

use alias::{self, AliasKey, WriteGuard};
use config::Config;
use dispatch::{self, AssignMode, AssignTarget, DenseLines, TargetKind};
use element::Element;
use errors::*;
use structure::Structure;
use traits::{Dense, ElementMut, FromExpr, MatrixExpr, MatrixReader, Order, RowMajor,
    StorageOrder};

/// Storage shared by every handle onto the same dense buffer.
#[derive(Debug)]
pub struct MatrixData<T> {
    values: RwLock<Vec<T>>,
}
impl<T> MatrixData<T> {
    pub fn new(values: Vec<T>) -> MatrixData<T> {
        MatrixData { values: RwLock::new(values) }
    }
    pub fn values(&self) -> RwLockReadGuard<Vec<T>> {
        alias::read_lock(&self.values)
    }
    pub fn values_mut(&self) -> WriteGuard<Vec<T>> {
        alias::write_lock(&self.values)
    }
}

/// Dense, resizable matrix stored contiguously in `O` order.
///
/// A `DynamicMatrix` is a handle: [`share`](#method.share) and [`trans`](#method.trans) return
/// further handles onto the same buffer, which is what makes aliased assignments such as
/// `a = a.trans() - b` expressible. `clone` makes a deep copy.
#[derive(Debug)]
pub struct DynamicMatrix<T, O = RowMajor> {
    data: Arc<MatrixData<T>>,
    rows: usize,
    columns: usize,
    order: PhantomData<O>,
}

impl<T: Element, O: Order> DynamicMatrix<T, O> {
    /// Creates a matrix from values laid out in `O` order.
    ///
    /// # Panics
    /// Panics if `data` does not hold exactly `rows * columns` values; see
    /// [`try_from_vec`](#method.try_from_vec) for the checked form.
    pub fn from_vec(rows: usize, columns: usize, data: Vec<T>) -> DynamicMatrix<T, O> {
        assert_eq!(data.len(), rows * columns);
        DynamicMatrix::from_parts(rows, columns, data)
    }
    /// Creates a matrix from values laid out in `O` order, failing with `DimensionMismatch` if
    /// `data` does not hold exactly `rows * columns` values.
    pub fn try_from_vec(rows: usize, columns: usize, data: Vec<T>) -> Result<DynamicMatrix<T, O>> {
        if data.len() != rows * columns {
            return Err(Error::from_kind(ErrorKind::DimensionMismatch(format!(
                "Invalid number of values for a {}x{} matrix: {}", rows, columns, data.len()))));
        }
        Ok(DynamicMatrix::from_parts(rows, columns, data))
    }
    fn from_parts(rows: usize, columns: usize, data: Vec<T>) -> DynamicMatrix<T, O> {
        debug_assert_eq!(data.len(), rows * columns);
        DynamicMatrix {
            data: Arc::new(MatrixData::new(data)),
            rows: rows,
            columns: columns,
            order: PhantomData,
        }
    }
    pub fn zeros(rows: usize, columns: usize) -> DynamicMatrix<T, O> {
        DynamicMatrix::from_parts(rows, columns, vec![T::zero(); rows * columns])
    }
    pub fn ones(rows: usize, columns: usize) -> DynamicMatrix<T, O> {
        DynamicMatrix::from_parts(rows, columns, vec![T::one(); rows * columns])
    }
    pub fn from_fn<F>(rows: usize, columns: usize, f: F) -> DynamicMatrix<T, O>
            where F: Fn(usize, usize) -> T {
        let (major, minor) = O::ORDER.lines(rows, columns);
        let mut values = Vec::with_capacity(rows * columns);
        for a in 0..major {
            for b in 0..minor {
                let (i, j) = O::ORDER.coordinates(a, b);
                values.push(f(i, j));
            }
        }
        DynamicMatrix::from_parts(rows, columns, values)
    }
    pub fn diag(values: &[T]) -> DynamicMatrix<T, O> {
        DynamicMatrix::from_fn(values.len(), values.len(),
            |i, j| if i == j { values[i] } else { T::zero() })
    }
    pub fn eye(n: usize) -> DynamicMatrix<T, O> {
        DynamicMatrix::from_fn(n, n, |i, j| if i == j { T::one() } else { T::zero() })
    }
    /// Random matrix drawn from the given generator.
    pub fn rand_with<R: Rng>(rng: &mut R, rows: usize, columns: usize) -> DynamicMatrix<T, O> {
        let values = (0..rows * columns).map(|_| T::sample(rng)).collect();
        DynamicMatrix::from_parts(rows, columns, values)
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn columns(&self) -> usize { self.columns }
    pub fn dims(&self) -> (usize, usize) { (self.rows, self.columns) }
    pub fn is_square(&self) -> bool { self.rows == self.columns }
    /// Distance between the starts of two consecutive major lines.
    pub fn spacing(&self) -> usize { O::ORDER.lines(self.rows, self.columns).1 }

    pub fn get(&self, i: usize, j: usize) -> Result<T> {
        if i >= self.rows || j >= self.columns {
            return Err(Error::from_kind(ErrorKind::IndexError("index out of bounds")));
        }
        Ok(self.data.values()[self.index(i, j)])
    }
    pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        if i >= self.rows || j >= self.columns {
            return Err(Error::from_kind(ErrorKind::IndexError("index out of bounds")));
        }
        let index = self.index(i, j);
        self.data.values_mut()[index] = value;
        Ok(())
    }

    /// A second handle onto the same buffer.
    pub fn share(&self) -> DynamicMatrix<T, O> {
        DynamicMatrix {
            data: self.data.clone(),
            rows: self.rows,
            columns: self.columns,
            order: PhantomData,
        }
    }
    /// Transposed view onto the same buffer, in the opposite storage order.
    pub fn trans(&self) -> DynamicMatrix<T, O::Opposite> {
        DynamicMatrix {
            data: self.data.clone(),
            rows: self.columns,
            columns: self.rows,
            order: PhantomData,
        }
    }
    #[inline]
    pub fn t(&self) -> DynamicMatrix<T, O::Opposite> { self.trans() }

    pub fn alias_key(&self) -> AliasKey {
        AliasKey::new(&*self.data as *const MatrixData<T> as usize, self.rows, self.columns,
            O::ORDER)
    }

    /// Raw access to the contiguous buffer, in `O` order with leading dimension `spacing()`.
    pub fn with_data<R, F: FnOnce(&[T]) -> R>(&self, f: F) -> R {
        f(&self.data.values()[..])
    }
    pub fn with_data_mut<R, F: FnOnce(&mut [T]) -> R>(&mut self, f: F) -> R {
        f(&mut self.data.values_mut()[..])
    }
    pub fn to_vec(&self) -> Vec<T> {
        self.data.values().clone()
    }

    /// Changes the extents, keeping the overlapping elements. The matrix is detached from any
    /// other handle onto its old buffer.
    pub fn resize(&mut self, rows: usize, columns: usize) {
        if (rows, columns) == (self.rows, self.columns) {
            return;
        }
        let mut values = vec![T::zero(); rows * columns];
        {
            let old = self.data.values();
            for i in 0..rows.min(self.rows) {
                for j in 0..columns.min(self.columns) {
                    values[O::ORDER.offset(i, j, rows, columns)] = old[self.index(i, j)];
                }
            }
        }
        self.data = Arc::new(MatrixData::new(values));
        self.rows = rows;
        self.columns = columns;
    }

    /// `self = expr`, resizing if needed.
    pub fn assign<E: MatrixExpr<Elem = T>>(&mut self, expr: &E) -> Result<()> {
        self.assign_with(expr, &Config::default())
    }
    pub fn assign_with<E: MatrixExpr<Elem = T>>(&mut self, expr: &E, config: &Config)
            -> Result<()> {
        dispatch::assign_checked(self, expr, AssignMode::Assign, config)
    }
    /// `self += expr`; the shapes must agree.
    pub fn add_assign_expr<E: MatrixExpr<Elem = T>>(&mut self, expr: &E) -> Result<()> {
        self.add_assign_expr_with(expr, &Config::default())
    }
    pub fn add_assign_expr_with<E: MatrixExpr<Elem = T>>(&mut self, expr: &E, config: &Config)
            -> Result<()> {
        dispatch::assign_checked(self, expr, AssignMode::AddAssign, config)
    }
    /// `self -= expr`; the shapes must agree.
    pub fn sub_assign_expr<E: MatrixExpr<Elem = T>>(&mut self, expr: &E) -> Result<()> {
        self.sub_assign_expr_with(expr, &Config::default())
    }
    pub fn sub_assign_expr_with<E: MatrixExpr<Elem = T>>(&mut self, expr: &E, config: &Config)
            -> Result<()> {
        dispatch::assign_checked(self, expr, AssignMode::SubAssign, config)
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        O::ORDER.offset(i, j, self.rows, self.columns)
    }
}

/// Read access to a dense matrix for one evaluation.
pub struct DenseReader<'a, T: 'a, O> {
    values: RwLockReadGuard<'a, Vec<T>>,
    rows: usize,
    columns: usize,
    order: PhantomData<O>,
}

impl<'a, T: Element, O: Order> MatrixReader<T> for DenseReader<'a, T, O> {
    #[inline]
    fn get(&self, i: usize, j: usize) -> T {
        debug_assert!(i < self.rows && j < self.columns, "Invalid matrix access index");
        self.values[O::ORDER.offset(i, j, self.rows, self.columns)]
    }
}

impl<T: Element, O: Order> MatrixExpr for DynamicMatrix<T, O> {
    type Elem = T;
    type Order = O;
    type Kind = Dense;

    const IS_EXPRESSION: bool = false;
    const RETURNS_TEMPORARY: bool = false;
    const SMP_ASSIGNABLE: bool = true;
    const IS_RESIZABLE: bool = true;
    const HAS_MUTABLE_DATA_ACCESS: bool = true;
    const STRUCTURE: Structure = Structure::GENERAL;

    type Reader<'a> = DenseReader<'a, T, O> where Self: 'a;

    fn rows(&self) -> usize { self.rows }
    fn columns(&self) -> usize { self.columns }
    fn reader<'a>(&'a self) -> DenseReader<'a, T, O> {
        DenseReader {
            values: self.data.values(),
            rows: self.rows,
            columns: self.columns,
            order: PhantomData,
        }
    }

    fn can_alias(&self, key: &AliasKey) -> bool {
        self.is_aliased(key)
    }
    fn is_aliased(&self, key: &AliasKey) -> bool {
        self.alias_key().shares_buffer(key)
    }
    fn is_same(&self, key: &AliasKey) -> bool {
        self.alias_key() == *key
    }

    fn assign_to(&self, target: &mut DenseLines<T>, mode: AssignMode, parallel: bool) {
        if self.is_same(target.key()) {
            target.combine_with_self(mode);
            return;
        }
        let values = self.data.values();
        let source: &[T] = &values;
        let (rows, columns, order) = (self.rows, self.columns, target.order());
        dispatch::for_each_line(target, parallel, |major, line| {
            for (minor, slot) in line.iter_mut().enumerate() {
                let (i, j) = order.coordinates(major, minor);
                *slot = mode.combine(*slot, source[O::ORDER.offset(i, j, rows, columns)]);
            }
        });
    }
}

impl<T: Element, O: Order> AssignTarget for DynamicMatrix<T, O> {
    type Elem = T;
    const TARGET_KIND: TargetKind = TargetKind::Dense;
    const TARGET_SMP: bool = true;
    const TARGET_RESIZABLE: bool = true;

    fn shape(&self) -> (usize, usize) { (self.rows, self.columns) }
    fn target_key(&self) -> AliasKey { self.alias_key() }
    fn resize_to(&mut self, rows: usize, columns: usize) {
        self.resize(rows, columns)
    }
    fn with_lines<F: FnOnce(&mut DenseLines<T>)>(&mut self, f: F) {
        let key = self.alias_key();
        let (rows, columns) = (self.rows, self.columns);
        let mut values = self.data.values_mut();
        let mut lines = DenseLines::new(&mut values[..], rows, columns, O::ORDER, key);
        f(&mut lines);
    }
}

impl<T: Element, O: Order> FromExpr<T> for DynamicMatrix<T, O> {
    fn from_expr<E: MatrixExpr<Elem = T>>(expr: &E) -> DynamicMatrix<T, O> {
        let mut m = DynamicMatrix::zeros(expr.rows(), expr.columns());
        dispatch::dispatch(&mut m, expr, AssignMode::Assign, &Config::default());
        m
    }
}

impl<T: Element, O: Order> ElementMut for DynamicMatrix<T, O> {
    fn set_element(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        self.set(i, j, value)
    }
}

impl<T: Element, O: Order> Clone for DynamicMatrix<T, O> {
    fn clone(&self) -> DynamicMatrix<T, O> {
        DynamicMatrix::from_parts(self.rows, self.columns, self.to_vec())
    }
}

impl<T: Element, O: Order, O2: Order> PartialEq<DynamicMatrix<T, O2>> for DynamicMatrix<T, O> {
    fn eq(&self, other: &DynamicMatrix<T, O2>) -> bool {
        if self.dims() != other.dims() {
            return false;
        }
        if O::ORDER == O2::ORDER && Arc::ptr_eq(&self.data, &other.data) {
            return true;
        }
        let (a, b) = (self.reader(), other.reader());
        (0..self.rows).all(|i| (0..self.columns).all(|j| a.get(i, j) == b.get(i, j)))
    }
}

impl<T: Element, O: Order> fmt::Display for DynamicMatrix<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let values = self.reader();
        for i in 0..self.rows {
            for j in 0..self.columns {
                write!(f, "{} ", values.get(i, j))?;
            }
            write!(f, "\n")?;
        }
        Ok(())
    }
}

/// Storage order of a matrix value, for callers that only have the value.
pub fn storage_order<T: Element, O: Order>(_: &DynamicMatrix<T, O>) -> StorageOrder {
    O::ORDER
}
