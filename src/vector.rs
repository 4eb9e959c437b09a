use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use rand::Rng;

use alias::{read_lock, write_lock, AliasKey};
use config::Config;
use dispatch::{self, AssignMode, VectorTarget};
use element::Element;
use errors::*;
use traits::{ColumnVector, StorageOrder, TransposeFlag, VectorExpr, VectorReader};

/// Dense, resizable vector; `F` marks it as a column or row vector.
#[derive(Debug)]
pub struct DynamicVector<T, F = ColumnVector> {
    data: Arc<RwLock<Vec<T>>>,
    size: usize,
    flag: PhantomData<F>,
}

impl<T: Element, F: TransposeFlag> DynamicVector<T, F> {
    pub fn from_vec(data: Vec<T>) -> DynamicVector<T, F> {
        DynamicVector { size: data.len(), data: Arc::new(RwLock::new(data)), flag: PhantomData }
    }
    pub fn zeros(size: usize) -> DynamicVector<T, F> {
        DynamicVector::from_vec(vec![T::zero(); size])
    }
    pub fn from_fn<G: Fn(usize) -> T>(size: usize, f: G) -> DynamicVector<T, F> {
        DynamicVector::from_vec((0..size).map(f).collect())
    }
    pub fn rand_with<R: Rng>(rng: &mut R, size: usize) -> DynamicVector<T, F> {
        DynamicVector::from_vec((0..size).map(|_| T::sample(rng)).collect())
    }

    pub fn size(&self) -> usize { self.size }

    pub fn get(&self, i: usize) -> Result<T> {
        read_lock(&self.data).get(i).cloned()
            .ok_or_else(|| Error::from_kind(ErrorKind::IndexError("index out of bounds")))
    }
    pub fn set(&mut self, i: usize, value: T) -> Result<()> {
        match write_lock(&self.data).get_mut(i) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::from_kind(ErrorKind::IndexError("index out of bounds"))),
        }
    }

    pub fn share(&self) -> DynamicVector<T, F> {
        DynamicVector { data: self.data.clone(), size: self.size, flag: PhantomData }
    }
    /// The same storage viewed with the opposite orientation.
    pub fn trans(&self) -> DynamicVector<T, F::Opposite> {
        DynamicVector { data: self.data.clone(), size: self.size, flag: PhantomData }
    }

    pub fn alias_key(&self) -> AliasKey {
        let (rows, columns) = if F::IS_ROW { (1, self.size) } else { (self.size, 1) };
        AliasKey::new(&*self.data as *const RwLock<Vec<T>> as usize, rows, columns,
            StorageOrder::RowMajor)
    }

    pub fn with_data<R, G: FnOnce(&[T]) -> R>(&self, f: G) -> R {
        f(&read_lock(&self.data)[..])
    }
    pub fn with_data_mut<R, G: FnOnce(&mut [T]) -> R>(&mut self, f: G) -> R {
        f(&mut write_lock(&self.data)[..])
    }
    pub fn to_vec(&self) -> Vec<T> {
        read_lock(&self.data).clone()
    }

    /// Changes the size, keeping the leading elements. Detaches from shared storage.
    pub fn resize(&mut self, size: usize) {
        let mut values = self.to_vec();
        values.resize(size, T::zero());
        self.data = Arc::new(RwLock::new(values));
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

pub struct DenseVectorReader<'a, T: 'a>(RwLockReadGuard<'a, Vec<T>>);

impl<'a, T: Element> VectorReader<T> for DenseVectorReader<'a, T> {
    #[inline]
    fn get(&self, i: usize) -> T { self.0[i] }
}

impl<T: Element, F: TransposeFlag> VectorExpr for DynamicVector<T, F> {
    type Elem = T;
    type Flag = F;

    const IS_EXPRESSION: bool = false;
    const SMP_ASSIGNABLE: bool = true;

    type Reader<'a> = DenseVectorReader<'a, T> where Self: 'a;

    fn size(&self) -> usize { self.size }
    fn reader<'a>(&'a self) -> DenseVectorReader<'a, T> {
        DenseVectorReader(read_lock(&self.data))
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

    fn assign_to(&self, target: &mut [T], key: &AliasKey, mode: AssignMode, parallel: bool) {
        if self.is_same(key) {
            if mode != AssignMode::Assign {
                for slot in target.iter_mut() {
                    *slot = mode.combine(*slot, *slot);
                }
            }
            return;
        }
        let values = read_lock(&self.data);
        dispatch::combine_slice(&values, target, mode, parallel);
    }
}

impl<T: Element, F: TransposeFlag> VectorTarget for DynamicVector<T, F> {
    type Elem = T;
    const TARGET_SMP: bool = true;
    const TARGET_RESIZABLE: bool = true;

    fn target_size(&self) -> usize { self.size() }
    fn target_key(&self) -> AliasKey { self.alias_key() }
    fn resize_to(&mut self, size: usize) {
        self.resize(size)
    }
    fn with_slice<G: FnOnce(&mut [T], &AliasKey)>(&mut self, f: G) {
        let key = self.alias_key();
        let mut values = write_lock(&self.data);
        f(&mut values[..], &key);
    }
}

impl<T: Element, F: TransposeFlag> Clone for DynamicVector<T, F> {
    fn clone(&self) -> DynamicVector<T, F> {
        DynamicVector::from_vec(self.to_vec())
    }
}

impl<T: Element, F: TransposeFlag> PartialEq for DynamicVector<T, F> {
    fn eq(&self, other: &DynamicVector<T, F>) -> bool {
        Arc::ptr_eq(&self.data, &other.data) || *read_lock(&self.data) == *read_lock(&other.data)
    }
}

impl<T: Element, F: TransposeFlag> fmt::Display for DynamicVector<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sep = if F::IS_ROW { " " } else { "\n" };
        for v in read_lock(&self.data).iter() {
            write!(f, "{}{}", v, sep)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traits::RowVector;

    #[test]
    fn test_get_set() {
        let mut v = DynamicVector::<f64>::from_vec(vec![1.0, 2.0, 3.0]);
        v.set(1, 5.0).unwrap();
        assert_eq!(v.get(1).unwrap(), 5.0);
        assert!(v.get(3).is_err());
        assert!(v.set(3, 0.0).is_err());
    }

    #[test]
    fn test_trans_shares() {
        let mut v = DynamicVector::<i32>::from_vec(vec![1, 2]);
        let t: DynamicVector<i32, RowVector> = v.trans();
        v.set(0, 7).unwrap();
        assert_eq!(t.at(0), 7);
        assert!(t.is_aliased(&v.alias_key()));
        assert!(!t.is_same(&v.alias_key()));
    }

    #[test]
    fn test_resize() {
        let mut v = DynamicVector::<f64>::from_vec(vec![1.0, 2.0]);
        let shared = v.share();
        v.resize(3);
        assert_eq!(v.to_vec(), vec![1.0, 2.0, 0.0]);
        assert_eq!(shared.size(), 2);
    }

    #[test]
    fn test_assign_and_self_assign() {
        let a = DynamicVector::<f64>::from_vec(vec![1.0, 2.0]);
        let mut b = DynamicVector::<f64>::zeros(0);
        b.assign(&a).unwrap();
        assert_eq!(b, a);
        let alias = b.share();
        b.add_assign_expr(&alias).unwrap();
        assert_eq!(b.to_vec(), vec![2.0, 4.0]);
        assert!(b.sub_assign_expr(&DynamicVector::<f64>::zeros(3)).is_err());
    }
}
