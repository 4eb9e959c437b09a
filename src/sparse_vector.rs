use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use rand::Rng;
use rand::seq::index;

use alias::{read_lock, write_lock, AliasKey};
use config::Config;
use dispatch::{self, AssignMode, VectorTarget};
use element::Element;
use errors::*;
use traits::{ColumnVector, StorageOrder, TransposeFlag, VectorExpr, VectorReader};

/// Non-zero elements: indices ascending, values alongside.
#[derive(Debug, Clone, PartialEq)]
struct Entries<T> {
    idx: Vec<usize>,
    vals: Vec<T>,
}

impl<T: Element> Entries<T> {
    fn empty() -> Entries<T> {
        Entries { idx: vec![], vals: vec![] }
    }

    fn from_dense(values: &[T]) -> Entries<T> {
        let mut e = Entries::empty();
        for (i, &v) in values.iter().enumerate() {
            if v != T::zero() {
                e.idx.push(i);
                e.vals.push(v);
            }
        }
        e
    }

    fn get(&self, i: usize) -> T {
        match self.idx.binary_search(&i) {
            Ok(k) => self.vals[k],
            Err(_) => T::zero(),
        }
    }

    fn set(&mut self, i: usize, value: T) {
        match self.idx.binary_search(&i) {
            Ok(k) if value == T::zero() => {
                self.idx.remove(k);
                self.vals.remove(k);
            }
            Ok(k) => self.vals[k] = value,
            Err(_) if value == T::zero() => {}
            Err(k) => {
                self.idx.insert(k, i);
                self.vals.insert(k, value);
            }
        }
    }

    fn scatter(&self, size: usize) -> Vec<T> {
        let mut values = vec![T::zero(); size];
        for (&i, &v) in self.idx.iter().zip(self.vals.iter()) {
            values[i] = v;
        }
        values
    }
}

/// Sparse vector storing only its non-zero elements; `F` marks it as a column or row vector.
///
/// A handle onto shared storage like the other containers: `share` and `trans` alias it,
/// `clone` copies.
#[derive(Debug)]
pub struct CompressedVector<T, F = ColumnVector> {
    data: Arc<RwLock<Entries<T>>>,
    size: usize,
    flag: PhantomData<F>,
}

impl<T: Element, F: TransposeFlag> CompressedVector<T, F> {
    /// An all-zero vector of the given size.
    pub fn new(size: usize) -> CompressedVector<T, F> {
        CompressedVector::from_entries(Entries::empty(), size)
    }

    fn from_entries(entries: Entries<T>, size: usize) -> CompressedVector<T, F> {
        CompressedVector { data: Arc::new(RwLock::new(entries)), size, flag: PhantomData }
    }

    /// Builds a vector from `(index, value)` pairs. Later pairs overwrite earlier ones; zero
    /// values are not stored.
    pub fn from_pairs(size: usize, pairs: &[(usize, T)]) -> Result<CompressedVector<T, F>> {
        let mut v = CompressedVector::new(size);
        for &(i, value) in pairs {
            v.set(i, value)?;
        }
        Ok(v)
    }

    /// Random vector with `nonzeros` non-zero elements (at most `size`) at random positions.
    pub fn rand_with<R: Rng>(rng: &mut R, size: usize, nonzeros: usize)
            -> CompressedVector<T, F> {
        let mut positions = index::sample(rng, size, nonzeros.min(size)).into_vec();
        positions.sort();
        let mut entries = Entries::empty();
        for i in positions {
            let mut v = T::sample(rng);
            while v == T::zero() {
                v = T::sample(rng);
            }
            entries.idx.push(i);
            entries.vals.push(v);
        }
        CompressedVector::from_entries(entries, size)
    }

    pub fn size(&self) -> usize { self.size }
    pub fn non_zeros(&self) -> usize { read_lock(&self.data).vals.len() }

    pub fn get(&self, i: usize) -> Result<T> {
        if i >= self.size {
            return Err(Error::from_kind(ErrorKind::IndexError("index out of bounds")));
        }
        Ok(read_lock(&self.data).get(i))
    }
    /// Sets element `i`; writing zero removes it from the sparsity pattern.
    pub fn set(&mut self, i: usize, value: T) -> Result<()> {
        if i >= self.size {
            return Err(Error::from_kind(ErrorKind::IndexError("index out of bounds")));
        }
        write_lock(&self.data).set(i, value);
        Ok(())
    }

    pub fn share(&self) -> CompressedVector<T, F> {
        CompressedVector { data: self.data.clone(), size: self.size, flag: PhantomData }
    }
    /// The same storage viewed with the opposite orientation.
    pub fn trans(&self) -> CompressedVector<T, F::Opposite> {
        CompressedVector { data: self.data.clone(), size: self.size, flag: PhantomData }
    }

    pub fn alias_key(&self) -> AliasKey {
        let (rows, columns) = if F::IS_ROW { (1, self.size) } else { (self.size, 1) };
        AliasKey::new(&*self.data as *const RwLock<Entries<T>> as usize, rows, columns,
            StorageOrder::RowMajor)
    }

    /// All elements, zeros included.
    pub fn to_vec(&self) -> Vec<T> {
        read_lock(&self.data).scatter(self.size)
    }

    /// Changes the size, dropping elements past the new end. Detaches from shared storage.
    pub fn resize(&mut self, size: usize) {
        let mut entries = read_lock(&self.data).clone();
        let keep = entries.idx.iter().take_while(|&&i| i < size).count();
        entries.idx.truncate(keep);
        entries.vals.truncate(keep);
        self.data = Arc::new(RwLock::new(entries));
        self.size = size;
    }

    pub fn assign<V: VectorExpr<Elem = T, Flag = F>>(&mut self, expr: &V) -> Result<()> {
        self.assign_with(expr, &Config::default())
    }
    pub fn assign_with<V: VectorExpr<Elem = T, Flag = F>>(&mut self, expr: &V, config: &Config)
            -> Result<()> {
        dispatch::assign_vector_checked(self, expr, AssignMode::Assign, config)
    }
    pub fn add_assign_expr<V: VectorExpr<Elem = T, Flag = F>>(&mut self, expr: &V) -> Result<()> {
        dispatch::assign_vector_checked(self, expr, AssignMode::AddAssign, &Config::default())
    }
    pub fn sub_assign_expr<V: VectorExpr<Elem = T, Flag = F>>(&mut self, expr: &V) -> Result<()> {
        dispatch::assign_vector_checked(self, expr, AssignMode::SubAssign, &Config::default())
    }
}

pub struct SparseVectorReader<'a, T: 'a>(RwLockReadGuard<'a, Entries<T>>);

impl<'a, T: Element> VectorReader<T> for SparseVectorReader<'a, T> {
    #[inline]
    fn get(&self, i: usize) -> T { self.0.get(i) }
}

impl<T: Element, F: TransposeFlag> VectorExpr for CompressedVector<T, F> {
    type Elem = T;
    type Flag = F;

    const IS_EXPRESSION: bool = false;
    const SMP_ASSIGNABLE: bool = true;

    type Reader<'a> = SparseVectorReader<'a, T> where Self: 'a;

    fn size(&self) -> usize { self.size }
    fn reader<'a>(&'a self) -> SparseVectorReader<'a, T> {
        SparseVectorReader(read_lock(&self.data))
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

    fn for_each_nonzero<G: FnMut(usize, T)>(&self, mut f: G) {
        let data = read_lock(&self.data);
        for (&i, &v) in data.idx.iter().zip(data.vals.iter()) {
            f(i, v);
        }
    }

    /// Plain assignment clears the target first; compound assignment only touches the non-zero
    /// positions.
    fn assign_to(&self, target: &mut [T], key: &AliasKey, mode: AssignMode, _parallel: bool) {
        if self.is_same(key) {
            if mode != AssignMode::Assign {
                for slot in target.iter_mut() {
                    *slot = mode.combine(*slot, *slot);
                }
            }
            return;
        }
        if mode == AssignMode::Assign {
            for slot in target.iter_mut() {
                *slot = T::zero();
            }
        }
        self.for_each_nonzero(|i, v| target[i] = mode.combine(target[i], v));
    }
}

impl<T: Element, F: TransposeFlag> VectorTarget for CompressedVector<T, F> {
    type Elem = T;
    const TARGET_SMP: bool = true;
    const TARGET_RESIZABLE: bool = true;

    fn target_size(&self) -> usize { self.size }
    fn target_key(&self) -> AliasKey { self.alias_key() }
    fn resize_to(&mut self, size: usize) {
        self.resize(size)
    }
    /// Expands into a dense temporary with a key of its own, so operands viewing this storage
    /// read the old values, then compresses the result back.
    fn with_slice<G: FnOnce(&mut [T], &AliasKey)>(&mut self, f: G) {
        let mut values = self.to_vec();
        let (rows, columns) = if F::IS_ROW { (1, self.size) } else { (self.size, 1) };
        let key = AliasKey::new(values.as_ptr() as usize, rows, columns, StorageOrder::RowMajor);
        f(&mut values[..], &key);
        let entries = Entries::from_dense(&values);
        trace!("compressed sparse vector target: {} non-zeros", entries.vals.len());
        *write_lock(&self.data) = entries;
    }
}

impl<T: Element, F: TransposeFlag> Clone for CompressedVector<T, F> {
    fn clone(&self) -> CompressedVector<T, F> {
        CompressedVector::from_entries(read_lock(&self.data).clone(), self.size)
    }
}

impl<T: Element, F: TransposeFlag> PartialEq for CompressedVector<T, F> {
    fn eq(&self, other: &CompressedVector<T, F>) -> bool {
        self.size == other.size && (Arc::ptr_eq(&self.data, &other.data)
            || *read_lock(&self.data) == *read_lock(&other.data))
    }
}

impl<T: Element, F: TransposeFlag> fmt::Display for CompressedVector<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sep = if F::IS_ROW { " " } else { "\n" };
        for v in self.to_vec() {
            write!(f, "{}{}", v, sep)?;
        }
        Ok(())
    }
}
