use std::fmt;
use std::marker::PhantomData;

use rand::Rng;

use alias::AliasKey;
use config::Config;
use dispatch::{self, AssignMode, VectorTarget};
use element::Element;
use errors::*;
use traits::{ColumnVector, StorageOrder, TransposeFlag, VectorExpr, VectorReader};

/// Fixed-size vector with inline storage. The size is part of the type and the vector is never
/// split across threads.
#[derive(Debug, Clone, Copy)]
pub struct StaticVector<T, const N: usize, F = ColumnVector> {
    data: [T; N],
    flag: PhantomData<F>,
}

impl<T: Element, const N: usize, F: TransposeFlag> StaticVector<T, N, F> {
    pub fn new(data: [T; N]) -> StaticVector<T, N, F> {
        StaticVector { data, flag: PhantomData }
    }
    pub fn zeros() -> StaticVector<T, N, F> {
        StaticVector::new([T::zero(); N])
    }
    pub fn from_fn<G: Fn(usize) -> T>(f: G) -> StaticVector<T, N, F> {
        let mut v = StaticVector::zeros();
        for (i, slot) in v.data.iter_mut().enumerate() {
            *slot = f(i);
        }
        v
    }
    pub fn rand_with<R: Rng>(rng: &mut R) -> StaticVector<T, N, F> {
        let mut v = StaticVector::zeros();
        for slot in v.data.iter_mut() {
            *slot = T::sample(rng);
        }
        v
    }

    pub fn size(&self) -> usize { N }
    pub fn as_slice(&self) -> &[T] { &self.data }

    pub fn get(&self, i: usize) -> Result<T> {
        self.data.get(i).cloned()
            .ok_or_else(|| Error::from_kind(ErrorKind::IndexError("index out of bounds")))
    }
    pub fn set(&mut self, i: usize, value: T) -> Result<()> {
        match self.data.get_mut(i) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::from_kind(ErrorKind::IndexError("index out of bounds"))),
        }
    }

    /// A copy with the opposite orientation; inline storage cannot be shared.
    pub fn trans(&self) -> StaticVector<T, N, F::Opposite> {
        StaticVector::new(self.data)
    }

    pub fn alias_key(&self) -> AliasKey {
        let (rows, columns) = if F::IS_ROW { (1, N) } else { (N, 1) };
        AliasKey::new(&self.data as *const [T; N] as usize, rows, columns,
            StorageOrder::RowMajor)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.data.to_vec()
    }

    /// `self = expr`. The size is fixed, so a mismatch is an error.
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

pub struct StaticVectorReader<'a, T: 'a>(&'a [T]);

impl<'a, T: Element> VectorReader<T> for StaticVectorReader<'a, T> {
    #[inline]
    fn get(&self, i: usize) -> T { self.0[i] }
}

impl<T: Element, const N: usize, F: TransposeFlag> VectorExpr for StaticVector<T, N, F> {
    type Elem = T;
    type Flag = F;

    const IS_EXPRESSION: bool = false;
    const SMP_ASSIGNABLE: bool = false;
    const STATIC_SIZE: usize = N;

    type Reader<'a> = StaticVectorReader<'a, T> where Self: 'a;

    fn size(&self) -> usize { N }
    fn reader<'a>(&'a self) -> StaticVectorReader<'a, T> { StaticVectorReader(&self.data) }
    #[inline]
    fn at(&self, i: usize) -> T { self.data[i] }

    fn can_alias(&self, key: &AliasKey) -> bool {
        self.is_aliased(key)
    }
    fn is_aliased(&self, key: &AliasKey) -> bool {
        self.alias_key().shares_buffer(key)
    }
    fn is_same(&self, key: &AliasKey) -> bool {
        self.alias_key() == *key
    }

    fn assign_to(&self, target: &mut [T], _key: &AliasKey, mode: AssignMode, _parallel: bool) {
        dispatch::combine_slice(&self.data, target, mode, false);
    }
}

impl<T: Element, const N: usize, F: TransposeFlag> VectorTarget for StaticVector<T, N, F> {
    type Elem = T;
    const TARGET_SMP: bool = false;
    const TARGET_RESIZABLE: bool = false;

    fn target_size(&self) -> usize { N }
    fn target_key(&self) -> AliasKey { self.alias_key() }
    fn with_slice<G: FnOnce(&mut [T], &AliasKey)>(&mut self, f: G) {
        let key = self.alias_key();
        f(&mut self.data[..], &key);
    }
}

impl<T: Element, const N: usize, F: TransposeFlag> PartialEq for StaticVector<T, N, F> {
    fn eq(&self, other: &StaticVector<T, N, F>) -> bool {
        self.data[..] == other.data[..]
    }
}

impl<T: Element, const N: usize, F: TransposeFlag> fmt::Display for StaticVector<T, N, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let sep = if F::IS_ROW { " " } else { "\n" };
        for v in self.data.iter() {
            write!(f, "{}{}", v, sep)?;
        }
        Ok(())
    }
}
