//! Adaptors that wrap a matrix and guarantee a structural property of its values.
//!
//! The guaranteed structure is a compile-time fact (`MatrixExpr::STRUCTURE`) that flows into
//! every expression built from the adaptor. Updates through the adaptor are checked: an
//! assignment whose result would violate the property fails with `InvalidArgument` and leaves
//! the matrix unchanged.

use std::fmt;
use std::marker::PhantomData;

use num::{One, Zero};
use rand::Rng;

use alias::AliasKey;
use config::Config;
use dense::DynamicMatrix;
use dispatch::{self, AssignMode, AssignTarget, DenseLines};
use element::Element;
use errors::*;
use structure::{OpKind, Structure};
use traits::{ElementMut, FromExpr, MatrixExpr, MatrixReader, Order};

pub trait AdaptorKind: fmt::Debug + Clone + Copy + Default + Send + Sync + 'static {
    const STRUCTURE: Structure;
    const NAME: &'static str;
}

macro_rules! adaptor_kinds {
    ($( $kind:ident, $alias:ident, $structure:expr, $name:expr; )*) => {
        $(
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $kind;
            impl AdaptorKind for $kind {
                const STRUCTURE: Structure = $structure;
                const NAME: &'static str = $name;
            }
            pub type $alias<M> = Adaptor<M, $kind>;
        )*
    }
}
adaptor_kinds!(
    Symmetric, SymmetricMatrix, Structure::SYMMETRIC, "symmetric";
    Hermitian, HermitianMatrix, Structure::HERMITIAN, "Hermitian";
    Lower, LowerMatrix, Structure::LOWER, "lower";
    UniLower, UniLowerMatrix, Structure::UNI_LOWER, "unilower";
    StrictlyLower, StrictlyLowerMatrix, Structure::STRICTLY_LOWER, "strictly lower";
    Upper, UpperMatrix, Structure::UPPER, "upper";
    UniUpper, UniUpperMatrix, Structure::UNI_UPPER, "uniupper";
    StrictlyUpper, StrictlyUpperMatrix, Structure::STRICTLY_UPPER, "strictly upper";
    Diagonal, DiagonalMatrix, Structure::DIAGONAL, "diagonal";
    Identity, IdentityMatrix, Structure::IDENTITY, "identity";
);

fn invalid<K: AdaptorKind>(what: &str) -> Error {
    Error::from_kind(ErrorKind::InvalidArgument(format!("Invalid {} for {} matrix", what,
        K::NAME)))
}

/// A square matrix `M` whose values satisfy the structure of `K`.
#[derive(Debug, Clone)]
pub struct Adaptor<M, K> {
    matrix: M,
    kind: PhantomData<K>,
}

impl<M: MatrixExpr, K: AdaptorKind> Adaptor<M, K> {
    /// Wraps `matrix` after checking that it is square and satisfies the structure.
    pub fn new(matrix: M) -> Result<Adaptor<M, K>> {
        if matrix.rows() != matrix.columns() {
            return Err(Error::from_kind(ErrorKind::InvalidArgument(
                "Invalid non-square matrix provided".to_string())));
        }
        if !K::STRUCTURE.verify(&matrix) {
            return Err(Error::from_kind(ErrorKind::InvalidArgument(format!(
                "Invalid setup of {} matrix", K::NAME))));
        }
        Ok(Adaptor { matrix, kind: PhantomData })
    }

    pub fn matrix(&self) -> &M { &self.matrix }
    pub fn into_inner(self) -> M { self.matrix }
}

impl<M, K> Adaptor<M, K> where M: ElementMut, K: AdaptorKind {
    /// Sets element `(i, j)`. Symmetric and Hermitian adaptors also update `(j, i)`; triangular
    /// and diagonal adaptors reject values that break their pattern.
    pub fn set(&mut self, i: usize, j: usize, value: M::Elem) -> Result<()> {
        let s = K::STRUCTURE.normalized();
        let zero = M::Elem::zero();
        if (s.lower && j > i || s.upper && i > j) && value != zero {
            return Err(invalid::<K>("assignment to restricted element"));
        }
        if i == j {
            if (s.uni_lower || s.uni_upper) && value != M::Elem::one() {
                return Err(invalid::<K>("assignment to diagonal element"));
            }
            if (s.strictly_lower || s.strictly_upper) && value != zero {
                return Err(invalid::<K>("assignment to diagonal element"));
            }
            if s.hermitian && value != value.conjugate() {
                return Err(invalid::<K>("assignment to diagonal element"));
            }
        }
        self.matrix.set_element(i, j, value)?;
        if i != j {
            if s.hermitian {
                self.matrix.set_element(j, i, value.conjugate())?;
            } else if s.symmetric {
                self.matrix.set_element(j, i, value)?;
            }
        }
        Ok(())
    }

    /// Mutable view of row `i`. Writes go through `set`, so the view cannot break the structure.
    pub fn row(&mut self, i: usize) -> Result<AdaptorRow<M, K>> {
        if i >= self.matrix.rows() {
            return Err(Error::from_kind(ErrorKind::IndexError("row index out of bounds")));
        }
        Ok(AdaptorRow { adaptor: self, row: i })
    }
}

/// A single row of an adaptor.
#[derive(Debug)]
pub struct AdaptorRow<'a, M: 'a, K: 'a> {
    adaptor: &'a mut Adaptor<M, K>,
    row: usize,
}

impl<'a, M, K> AdaptorRow<'a, M, K> where M: ElementMut, K: AdaptorKind {
    pub fn index(&self) -> usize { self.row }
    pub fn size(&self) -> usize { self.adaptor.matrix.columns() }

    pub fn get(&self, j: usize) -> Result<M::Elem> {
        if j >= self.size() {
            return Err(Error::from_kind(ErrorKind::IndexError("index out of bounds")));
        }
        Ok(self.adaptor.matrix.at(self.row, j))
    }
    pub fn set(&mut self, j: usize, value: M::Elem) -> Result<()> {
        if j >= self.size() {
            return Err(Error::from_kind(ErrorKind::IndexError("index out of bounds")));
        }
        self.adaptor.set(self.row, j, value)
    }
    pub fn to_vec(&self) -> Vec<M::Elem> {
        let reader = self.adaptor.matrix.reader();
        (0..self.size()).map(|j| reader.get(self.row, j)).collect()
    }
}

impl<M, K, T> Adaptor<M, K>
        where T: Element, M: MatrixExpr<Elem = T> + AssignTarget<Elem = T>, K: AdaptorKind {
    pub fn assign<E: MatrixExpr<Elem = T>>(&mut self, expr: &E) -> Result<()> {
        self.assign_mode(expr, AssignMode::Assign, &Config::default())
    }
    pub fn add_assign_expr<E: MatrixExpr<Elem = T>>(&mut self, expr: &E) -> Result<()> {
        self.assign_mode(expr, AssignMode::AddAssign, &Config::default())
    }
    pub fn sub_assign_expr<E: MatrixExpr<Elem = T>>(&mut self, expr: &E) -> Result<()> {
        self.assign_mode(expr, AssignMode::SubAssign, &Config::default())
    }

    /// Assigns directly when the expression's structure already guarantees the result conforms;
    /// otherwise evaluates the result into a temporary and checks it first.
    pub fn assign_mode<E: MatrixExpr<Elem = T>>(&mut self, expr: &E, mode: AssignMode,
            config: &Config) -> Result<()> {
        if expr.rows() != expr.columns() {
            return Err(Error::from_kind(ErrorKind::InvalidArgument(
                "Invalid non-square matrix provided".to_string())));
        }
        let result = match mode {
            AssignMode::Assign => E::STRUCTURE,
            AssignMode::AddAssign => Structure::elementwise(OpKind::Plus, K::STRUCTURE,
                E::STRUCTURE),
            AssignMode::SubAssign => Structure::elementwise(OpKind::Minus, K::STRUCTURE,
                E::STRUCTURE),
        };
        if result.implies(K::STRUCTURE) {
            return dispatch::assign_checked(&mut self.matrix, expr, mode, config);
        }

        let mut tmp = DynamicMatrix::<T, M::Order>::from_expr(&self.matrix);
        dispatch::assign_checked(&mut tmp, expr, mode, config)?;
        if !K::STRUCTURE.verify(&tmp) {
            debug!("rejected assignment to {} matrix", K::NAME);
            return Err(invalid::<K>("assignment"));
        }
        dispatch::assign_checked(&mut self.matrix, &tmp, AssignMode::Assign, config)
    }
}

impl<T: Element, O: Order, K: AdaptorKind> Adaptor<DynamicMatrix<T, O>, K> {
    /// Random `n x n` matrix satisfying the structure.
    pub fn rand_with<R: Rng>(rng: &mut R, n: usize) -> Adaptor<DynamicMatrix<T, O>, K> {
        let s = K::STRUCTURE.normalized();
        let mirrored = s.symmetric || s.hermitian;
        let mut values = vec![T::zero(); n * n];
        for i in 0..n {
            for j in 0..n {
                let v = if i == j {
                    if s.uni_lower || s.uni_upper {
                        T::one()
                    } else if s.strictly_lower || s.strictly_upper {
                        T::zero()
                    } else if s.hermitian {
                        T::sample(rng).real_part()
                    } else {
                        T::sample(rng)
                    }
                } else if s.lower && j > i || s.upper && i > j || mirrored && j < i {
                    continue;
                } else {
                    T::sample(rng)
                };
                values[O::ORDER.offset(i, j, n, n)] = v;
            }
        }
        if mirrored {
            for i in 0..n {
                for j in 0..i {
                    let v = values[O::ORDER.offset(j, i, n, n)];
                    values[O::ORDER.offset(i, j, n, n)] =
                        if s.hermitian { v.conjugate() } else { v };
                }
            }
        }
        Adaptor { matrix: DynamicMatrix::from_vec(n, n, values), kind: PhantomData }
    }
}

impl<M: MatrixExpr, K: AdaptorKind> MatrixExpr for Adaptor<M, K> {
    type Elem = M::Elem;
    type Order = M::Order;
    type Kind = M::Kind;

    const IS_EXPRESSION: bool = M::IS_EXPRESSION;
    const RETURNS_TEMPORARY: bool = M::RETURNS_TEMPORARY;
    const SMP_ASSIGNABLE: bool = M::SMP_ASSIGNABLE;
    const IS_RESIZABLE: bool = false;
    const HAS_MUTABLE_DATA_ACCESS: bool = false;
    const STATIC_ROWS: usize = M::STATIC_ROWS;
    const STATIC_COLUMNS: usize = M::STATIC_COLUMNS;
    const STRUCTURE: Structure = K::STRUCTURE.normalized();

    type Reader<'a> = M::Reader<'a> where Self: 'a;

    fn rows(&self) -> usize { self.matrix.rows() }
    fn columns(&self) -> usize { self.matrix.columns() }
    fn reader<'a>(&'a self) -> M::Reader<'a> { self.matrix.reader() }
    #[inline]
    fn at(&self, i: usize, j: usize) -> M::Elem { self.matrix.at(i, j) }

    fn can_alias(&self, key: &AliasKey) -> bool { self.matrix.can_alias(key) }
    fn is_aliased(&self, key: &AliasKey) -> bool { self.matrix.is_aliased(key) }
    fn is_same(&self, key: &AliasKey) -> bool { self.matrix.is_same(key) }

    fn for_each_nonzero<F: FnMut(usize, usize, M::Elem)>(&self, f: F) {
        self.matrix.for_each_nonzero(f)
    }
    fn assign_to(&self, target: &mut DenseLines<M::Elem>, mode: AssignMode, parallel: bool) {
        self.matrix.assign_to(target, mode, parallel)
    }
}

impl<M: fmt::Display, K> fmt::Display for Adaptor<M, K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.matrix, f)
    }
}
