use alias::AliasKey;
use dispatch::{self, AssignMode, DenseLines};
use element::Element;
use errors::*;
use structure::Structure;
use traits::{MatrixExpr, MatrixReader, Order, VectorReader};

/// Reader of a scaled matrix or vector.
pub struct ScaleReader<A, T> {
    operand: A,
    scalar: T,
}

impl<A, T> ScaleReader<A, T> {
    pub fn new(operand: A, scalar: T) -> ScaleReader<A, T> {
        ScaleReader { operand, scalar }
    }
}

impl<A: MatrixReader<T>, T: Element> MatrixReader<T> for ScaleReader<A, T> {
    #[inline]
    fn get(&self, i: usize, j: usize) -> T { self.scalar * self.operand.get(i, j) }
}
impl<A: VectorReader<T>, T: Element> VectorReader<T> for ScaleReader<A, T> {
    #[inline]
    fn get(&self, i: usize) -> T { self.scalar * self.operand.get(i) }
}

/// Lazy `scalar * operand`; negation is scaling by `-1`.
#[derive(Debug, Clone)]
pub struct ScaleExpr<E, T> {
    operand: E,
    scalar: T,
}

impl<E: MatrixExpr<Elem = T>, T: Element> ScaleExpr<E, T> {
    pub fn new(operand: E, scalar: T) -> ScaleExpr<E, T> {
        ScaleExpr { operand, scalar }
    }
    pub fn operand(&self) -> &E { &self.operand }
    pub fn scalar(&self) -> T { self.scalar }
}

impl<E: MatrixExpr<Elem = T>, T: Element> MatrixExpr for ScaleExpr<E, T> {
    type Elem = T;
    type Order = E::Order;
    type Kind = E::Kind;

    const IS_EXPRESSION: bool = true;
    const RETURNS_TEMPORARY: bool = true;
    const SMP_ASSIGNABLE: bool = E::SMP_ASSIGNABLE;
    const STATIC_ROWS: usize = E::STATIC_ROWS;
    const STATIC_COLUMNS: usize = E::STATIC_COLUMNS;
    const STRUCTURE: Structure = Structure::scale(E::STRUCTURE, T::IS_COMPLEX);

    type Reader<'a> = ScaleReader<E::Reader<'a>, T> where Self: 'a;

    fn rows(&self) -> usize { self.operand.rows() }
    fn columns(&self) -> usize { self.operand.columns() }
    fn reader<'a>(&'a self) -> Self::Reader<'a> {
        ScaleReader::new(self.operand.reader(), self.scalar)
    }

    fn can_alias(&self, key: &AliasKey) -> bool { self.operand.is_aliased(key) }
    fn is_aliased(&self, key: &AliasKey) -> bool { self.operand.is_aliased(key) }

    fn assign_to(&self, target: &mut DenseLines<T>, mode: AssignMode, parallel: bool) {
        if mode == AssignMode::Assign {
            self.operand.assign_to(target, mode, parallel);
            target.scale(self.scalar, parallel);
        } else {
            dispatch::kernel(self, target, mode, parallel);
        }
    }
}

pub struct TransReader<A>(A);

impl<A: MatrixReader<T>, T> MatrixReader<T> for TransReader<A> {
    #[inline]
    fn get(&self, i: usize, j: usize) -> T { self.0.get(j, i) }
}

/// Lazy transpose of any matrix expression. Stored in the opposite order of its operand.
#[derive(Debug, Clone)]
pub struct TransExpr<E> {
    operand: E,
}

impl<E: MatrixExpr> TransExpr<E> {
    pub fn operand(&self) -> &E { &self.operand }
}

pub fn trans<E: MatrixExpr>(operand: E) -> TransExpr<E> {
    TransExpr { operand }
}

impl<E: MatrixExpr> MatrixExpr for TransExpr<E> {
    type Elem = E::Elem;
    type Order = <E::Order as Order>::Opposite;
    type Kind = E::Kind;

    const IS_EXPRESSION: bool = true;
    const RETURNS_TEMPORARY: bool = E::RETURNS_TEMPORARY;
    const SMP_ASSIGNABLE: bool = E::SMP_ASSIGNABLE;
    const STATIC_ROWS: usize = E::STATIC_COLUMNS;
    const STATIC_COLUMNS: usize = E::STATIC_ROWS;
    const STRUCTURE: Structure = Structure::trans(E::STRUCTURE);

    type Reader<'a> = TransReader<E::Reader<'a>> where Self: 'a;

    fn rows(&self) -> usize { self.operand.columns() }
    fn columns(&self) -> usize { self.operand.rows() }
    fn reader<'a>(&'a self) -> Self::Reader<'a> { TransReader(self.operand.reader()) }

    fn can_alias(&self, key: &AliasKey) -> bool { self.operand.is_aliased(key) }
    fn is_aliased(&self, key: &AliasKey) -> bool { self.operand.is_aliased(key) }

    fn for_each_nonzero<F: FnMut(usize, usize, E::Elem)>(&self, mut f: F) {
        self.operand.for_each_nonzero(|i, j, v| f(j, i, v))
    }
}

/// An operand declared symmetric. Nothing is checked beyond squareness: the declaration lets
/// symmetric adaptors accept the result without evaluating it into a temporary first.
#[derive(Debug, Clone)]
pub struct DeclSymExpr<E> {
    operand: E,
}

impl<E: MatrixExpr> DeclSymExpr<E> {
    pub fn operand(&self) -> &E { &self.operand }
}

pub fn declsym<E: MatrixExpr>(operand: E) -> Result<DeclSymExpr<E>> {
    if operand.rows() != operand.columns() {
        return Err(Error::from_kind(ErrorKind::InvalidArgument(
            "Invalid symmetric matrix specification".to_string())));
    }
    Ok(DeclSymExpr { operand })
}

impl<E: MatrixExpr> MatrixExpr for DeclSymExpr<E> {
    type Elem = E::Elem;
    type Order = E::Order;
    type Kind = E::Kind;

    const IS_EXPRESSION: bool = true;
    const RETURNS_TEMPORARY: bool = E::RETURNS_TEMPORARY;
    const SMP_ASSIGNABLE: bool = E::SMP_ASSIGNABLE;
    const STATIC_ROWS: usize = E::STATIC_ROWS;
    const STATIC_COLUMNS: usize = E::STATIC_COLUMNS;
    const STRUCTURE: Structure = Structure::declsym(E::STRUCTURE);

    type Reader<'a> = E::Reader<'a> where Self: 'a;

    fn rows(&self) -> usize { self.operand.rows() }
    fn columns(&self) -> usize { self.operand.columns() }
    fn reader<'a>(&'a self) -> E::Reader<'a> { self.operand.reader() }

    fn can_alias(&self, key: &AliasKey) -> bool { self.operand.can_alias(key) }
    fn is_aliased(&self, key: &AliasKey) -> bool { self.operand.is_aliased(key) }
    fn is_same(&self, key: &AliasKey) -> bool { self.operand.is_same(key) }

    fn for_each_nonzero<F: FnMut(usize, usize, E::Elem)>(&self, f: F) {
        self.operand.for_each_nonzero(f)
    }
    fn assign_to(&self, target: &mut DenseLines<E::Elem>, mode: AssignMode, parallel: bool) {
        self.operand.assign_to(target, mode, parallel)
    }
}
