use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use rand::Rng;
use rand::seq::index;

use alias::{read_lock, write_lock, AliasKey};
use config::Config;
use dispatch::{self, AssignMode, AssignTarget, DenseLines, TargetKind};
use element::Element;
use errors::*;
use structure::Structure;
use traits::{ElementMut, FromExpr, MatrixExpr, MatrixReader, Order, RowMajor, Sparse,
    StorageOrder};

/// Compressed lines: line `a` holds the minor indices `idx[ptr[a]..ptr[a + 1]]` (ascending)
/// with values `vals[ptr[a]..ptr[a + 1]]`.
#[derive(Debug, Clone)]
struct Compressed<T> {
    ptr: Vec<usize>,
    idx: Vec<usize>,
    vals: Vec<T>,
}

impl<T: Element> Compressed<T> {
    fn empty(major: usize) -> Compressed<T> {
        Compressed { ptr: vec![0; major + 1], idx: vec![], vals: vec![] }
    }

    fn from_dense(values: &[T], major: usize, minor: usize) -> Compressed<T> {
        let mut c = Compressed::empty(major);
        for a in 0..major {
            for b in 0..minor {
                let v = values[a * minor + b];
                if v != T::zero() {
                    c.idx.push(b);
                    c.vals.push(v);
                }
            }
            c.ptr[a + 1] = c.idx.len();
        }
        c
    }

    fn find(&self, major: usize, minor: usize) -> ::std::result::Result<usize, usize> {
        let (start, end) = (self.ptr[major], self.ptr[major + 1]);
        self.idx[start..end].binary_search(&minor).map(|k| start + k).map_err(|k| start + k)
    }

    fn get(&self, major: usize, minor: usize) -> T {
        match self.find(major, minor) {
            Ok(k) => self.vals[k],
            Err(_) => T::zero(),
        }
    }

    fn set(&mut self, major: usize, minor: usize, value: T) {
        match self.find(major, minor) {
            Ok(k) if value == T::zero() => {
                self.idx.remove(k);
                self.vals.remove(k);
                for p in self.ptr[major + 1..].iter_mut() {
                    *p -= 1;
                }
            }
            Ok(k) => self.vals[k] = value,
            Err(_) if value == T::zero() => {}
            Err(k) => {
                self.idx.insert(k, minor);
                self.vals.insert(k, value);
                for p in self.ptr[major + 1..].iter_mut() {
                    *p += 1;
                }
            }
        }
    }

    fn line(&self, major: usize) -> (&[usize], &[T]) {
        let (start, end) = (self.ptr[major], self.ptr[major + 1]);
        (&self.idx[start..end], &self.vals[start..end])
    }
}

/// (major, minor) position of element `(i, j)`.
#[inline]
fn position<O: Order>(i: usize, j: usize) -> (usize, usize) {
    match O::ORDER {
        StorageOrder::RowMajor => (i, j),
        StorageOrder::ColumnMajor => (j, i),
    }
}

/// Sparse matrix in compressed row (`RowMajor`) or compressed column (`ColumnMajor`) form.
///
/// Like `DynamicMatrix`, this is a handle onto shared storage; `share` and `trans` alias it and
/// `clone` copies.
#[derive(Debug)]
pub struct CompressedMatrix<T, O = RowMajor> {
    data: Arc<RwLock<Compressed<T>>>,
    rows: usize,
    columns: usize,
    order: PhantomData<O>,
}

impl<T: Element, O: Order> CompressedMatrix<T, O> {
    /// An all-zero `rows x columns` matrix.
    pub fn new(rows: usize, columns: usize) -> CompressedMatrix<T, O> {
        let major = O::ORDER.lines(rows, columns).0;
        CompressedMatrix::from_parts(Compressed::empty(major), rows, columns)
    }

    fn from_parts(data: Compressed<T>, rows: usize, columns: usize) -> CompressedMatrix<T, O> {
        CompressedMatrix {
            data: Arc::new(RwLock::new(data)),
            rows: rows,
            columns: columns,
            order: PhantomData,
        }
    }

    /// Builds a matrix from `(i, j, value)` triplets. Later triplets overwrite earlier ones at the
    /// same position; zero values are not stored.
    pub fn from_triplets(rows: usize, columns: usize, triplets: &[(usize, usize, T)])
            -> Result<CompressedMatrix<T, O>> {
        let mut m = CompressedMatrix::new(rows, columns);
        for &(i, j, v) in triplets {
            m.set(i, j, v)?;
        }
        Ok(m)
    }

    /// Random matrix with at most `nonzeros` non-zero elements at random positions.
    pub fn rand_with<R: Rng>(rng: &mut R, rows: usize, columns: usize, nonzeros: usize)
            -> CompressedMatrix<T, O> {
        let (major, minor) = O::ORDER.lines(rows, columns);
        let mut values = vec![T::zero(); rows * columns];
        let count = nonzeros.min(rows * columns);
        for k in index::sample(rng, rows * columns, count).into_vec() {
            values[k] = T::sample(rng);
        }
        CompressedMatrix::from_parts(Compressed::from_dense(&values, major, minor), rows,
            columns)
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn columns(&self) -> usize { self.columns }
    pub fn dims(&self) -> (usize, usize) { (self.rows, self.columns) }
    pub fn non_zeros(&self) -> usize { read_lock(&self.data).vals.len() }

    pub fn get(&self, i: usize, j: usize) -> Result<T> {
        if i >= self.rows || j >= self.columns {
            return Err(Error::from_kind(ErrorKind::IndexError("index out of bounds")));
        }
        let (a, b) = position::<O>(i, j);
        Ok(read_lock(&self.data).get(a, b))
    }
    /// Sets element `(i, j)`; writing zero removes the element from the sparsity pattern.
    pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        if i >= self.rows || j >= self.columns {
            return Err(Error::from_kind(ErrorKind::IndexError("index out of bounds")));
        }
        let (a, b) = position::<O>(i, j);
        write_lock(&self.data).set(a, b, value);
        Ok(())
    }

    pub fn share(&self) -> CompressedMatrix<T, O> {
        CompressedMatrix {
            data: self.data.clone(),
            rows: self.rows,
            columns: self.columns,
            order: PhantomData,
        }
    }
    /// Transposed view onto the same storage: a compressed row matrix read as compressed columns.
    pub fn trans(&self) -> CompressedMatrix<T, O::Opposite> {
        CompressedMatrix {
            data: self.data.clone(),
            rows: self.columns,
            columns: self.rows,
            order: PhantomData,
        }
    }

    pub fn alias_key(&self) -> AliasKey {
        AliasKey::new(&*self.data as *const RwLock<Compressed<T>> as usize, self.rows,
            self.columns, O::ORDER)
    }

    pub fn resize(&mut self, rows: usize, columns: usize) {
        if (rows, columns) == (self.rows, self.columns) {
            return;
        }
        let (major, minor) = O::ORDER.lines(rows, columns);
        let mut resized = Compressed::empty(major);
        {
            let old = read_lock(&self.data);
            let old_major = O::ORDER.lines(self.rows, self.columns).0;
            for a in 0..major.min(old_major) {
                let (idx, vals) = old.line(a);
                for (&b, &v) in idx.iter().zip(vals.iter()) {
                    if b < minor {
                        resized.idx.push(b);
                        resized.vals.push(v);
                    }
                }
                resized.ptr[a + 1] = resized.idx.len();
            }
            for a in major.min(old_major)..major {
                resized.ptr[a + 1] = resized.idx.len();
            }
        }
        self.data = Arc::new(RwLock::new(resized));
        self.rows = rows;
        self.columns = columns;
    }

    pub fn assign<E: MatrixExpr<Elem = T>>(&mut self, expr: &E) -> Result<()> {
        self.assign_with(expr, &Config::default())
    }
    pub fn assign_with<E: MatrixExpr<Elem = T>>(&mut self, expr: &E, config: &Config)
            -> Result<()> {
        dispatch::assign_checked(self, expr, AssignMode::Assign, config)
    }
    pub fn add_assign_expr<E: MatrixExpr<Elem = T>>(&mut self, expr: &E) -> Result<()> {
        self.add_assign_expr_with(expr, &Config::default())
    }
    pub fn add_assign_expr_with<E: MatrixExpr<Elem = T>>(&mut self, expr: &E, config: &Config)
            -> Result<()> {
        dispatch::assign_checked(self, expr, AssignMode::AddAssign, config)
    }
    pub fn sub_assign_expr<E: MatrixExpr<Elem = T>>(&mut self, expr: &E) -> Result<()> {
        self.sub_assign_expr_with(expr, &Config::default())
    }
    pub fn sub_assign_expr_with<E: MatrixExpr<Elem = T>>(&mut self, expr: &E, config: &Config)
            -> Result<()> {
        dispatch::assign_checked(self, expr, AssignMode::SubAssign, config)
    }
}

pub struct SparseReader<'a, T: 'a, O> {
    data: RwLockReadGuard<'a, Compressed<T>>,
    order: PhantomData<O>,
}

impl<'a, T: Element, O: Order> MatrixReader<T> for SparseReader<'a, T, O> {
    #[inline]
    fn get(&self, i: usize, j: usize) -> T {
        let (a, b) = position::<O>(i, j);
        self.data.get(a, b)
    }
}

impl<T: Element, O: Order> MatrixExpr for CompressedMatrix<T, O> {
    type Elem = T;
    type Order = O;
    type Kind = Sparse;

    const IS_EXPRESSION: bool = false;
    const RETURNS_TEMPORARY: bool = false;
    const SMP_ASSIGNABLE: bool = true;
    const IS_RESIZABLE: bool = true;
    const STRUCTURE: Structure = Structure::GENERAL;

    type Reader<'a> = SparseReader<'a, T, O> where Self: 'a;

    fn rows(&self) -> usize { self.rows }
    fn columns(&self) -> usize { self.columns }
    fn reader<'a>(&'a self) -> SparseReader<'a, T, O> {
        SparseReader { data: read_lock(&self.data), order: PhantomData }
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

    fn for_each_nonzero<F: FnMut(usize, usize, T)>(&self, mut f: F) {
        let data = read_lock(&self.data);
        for a in 0..data.ptr.len() - 1 {
            let (idx, vals) = data.line(a);
            for (&b, &v) in idx.iter().zip(vals.iter()) {
                let (i, j) = O::ORDER.coordinates(a, b);
                f(i, j, v);
            }
        }
    }

    /// Plain assignment clears the target and scatters the non-zeros; compound assignment only
    /// touches the non-zero positions.
    fn assign_to(&self, target: &mut DenseLines<T>, mode: AssignMode, parallel: bool) {
        if self.is_same(target.key()) {
            target.combine_with_self(mode);
            return;
        }
        if mode == AssignMode::Assign {
            target.fill(T::zero());
        }
        let data = read_lock(&self.data);
        if target.order() == O::ORDER {
            let data: &Compressed<T> = &data;
            dispatch::for_each_line(target, parallel, |major, line| {
                let (idx, vals) = data.line(major);
                for (&b, &v) in idx.iter().zip(vals.iter()) {
                    line[b] = mode.combine(line[b], v);
                }
            });
        } else {
            for a in 0..data.ptr.len() - 1 {
                let (idx, vals) = data.line(a);
                for (&b, &v) in idx.iter().zip(vals.iter()) {
                    let (i, j) = O::ORDER.coordinates(a, b);
                    let slot = target.get_mut(i, j);
                    *slot = mode.combine(*slot, v);
                }
            }
        }
    }
}

impl<T: Element, O: Order> AssignTarget for CompressedMatrix<T, O> {
    type Elem = T;
    const TARGET_KIND: TargetKind = TargetKind::Sparse;
    const TARGET_SMP: bool = true;
    const TARGET_RESIZABLE: bool = true;

    fn shape(&self) -> (usize, usize) { (self.rows, self.columns) }
    fn target_key(&self) -> AliasKey { self.alias_key() }
    fn resize_to(&mut self, rows: usize, columns: usize) {
        self.resize(rows, columns)
    }
    /// The dense temporary is a buffer of its own: operands viewing the sparse storage keep
    /// reading the old values until the result is compressed back.
    fn with_lines<F: FnOnce(&mut DenseLines<T>)>(&mut self, f: F) {
        let (rows, columns) = (self.rows, self.columns);
        let (major, minor) = O::ORDER.lines(rows, columns);
        let mut values = vec![T::zero(); rows * columns];
        let key = AliasKey::new(values.as_ptr() as usize, rows, columns, O::ORDER);
        {
            let data = read_lock(&self.data);
            for a in 0..major {
                let (idx, vals) = data.line(a);
                for (&b, &v) in idx.iter().zip(vals.iter()) {
                    values[a * minor + b] = v;
                }
            }
        }
        {
            let mut lines = DenseLines::new(&mut values, rows, columns, O::ORDER, key);
            f(&mut lines);
        }
        let compressed = Compressed::from_dense(&values, major, minor);
        trace!("compressed sparse target: {} non-zeros", compressed.vals.len());
        *write_lock(&self.data) = compressed;
    }
}

impl<T: Element, O: Order> FromExpr<T> for CompressedMatrix<T, O> {
    fn from_expr<E: MatrixExpr<Elem = T>>(expr: &E) -> CompressedMatrix<T, O> {
        let mut m = CompressedMatrix::new(expr.rows(), expr.columns());
        dispatch::dispatch(&mut m, expr, AssignMode::Assign, &Config::default());
        m
    }
}

impl<T: Element, O: Order> ElementMut for CompressedMatrix<T, O> {
    fn set_element(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        self.set(i, j, value)
    }
}

impl<T: Element, O: Order> Clone for CompressedMatrix<T, O> {
    fn clone(&self) -> CompressedMatrix<T, O> {
        CompressedMatrix::from_parts(read_lock(&self.data).clone(), self.rows, self.columns)
    }
}

impl<T: Element, O: Order, O2: Order> PartialEq<CompressedMatrix<T, O2>>
        for CompressedMatrix<T, O> {
    fn eq(&self, other: &CompressedMatrix<T, O2>) -> bool {
        if self.dims() != other.dims() {
            return false;
        }
        let (a, b) = (self.reader(), other.reader());
        (0..self.rows).all(|i| (0..self.columns).all(|j| a.get(i, j) == b.get(i, j)))
    }
}

impl<T: Element, O: Order> fmt::Display for CompressedMatrix<T, O> {
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
