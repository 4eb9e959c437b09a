//! Element-wise binary matrix expressions: addition, subtraction and the Schur product.

use std::fmt::Debug;
use std::marker::PhantomData;

use alias::AliasKey;
use dispatch::{self, AssignMode, DenseLines};
use element::Element;
use errors::*;
use structure::{max_extent, OpKind, Structure};
use traits::{Dense, KindRule, MatrixExpr, MatrixReader, Sparse, VectorReader};

/// An element-wise binary operation.
pub trait ElementwiseOp: Debug + Clone + Copy + Default + Send + Sync + 'static {
    const KIND: OpKind;
    fn apply<T: Element>(l: T, r: T) -> T;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plus;
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Minus;
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Schur;
/// Marker for matrix-matrix and matrix-vector products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mult;

impl ElementwiseOp for Plus {
    const KIND: OpKind = OpKind::Plus;
    #[inline]
    fn apply<T: Element>(l: T, r: T) -> T { l + r }
}
impl ElementwiseOp for Minus {
    const KIND: OpKind = OpKind::Minus;
    #[inline]
    fn apply<T: Element>(l: T, r: T) -> T { l - r }
}
impl ElementwiseOp for Schur {
    const KIND: OpKind = OpKind::Schur;
    #[inline]
    fn apply<T: Element>(l: T, r: T) -> T { l * r }
}

/// Operations that reassociate with addition and subtraction: `(l op r) op2 x` equals
/// `(l op2 x) op r`.
pub trait Reassociable: ElementwiseOp {}
impl Reassociable for Plus {}
impl Reassociable for Minus {}

macro_rules! kind_rules {
    ($op:ty: $( $l:ty, $r:ty => $out:ty; )*) => {
        $(
            impl KindRule<$l, $r> for $op {
                type Output = $out;
            }
        )*
    }
}
kind_rules!(Plus: Dense, Dense => Dense; Dense, Sparse => Dense; Sparse, Dense => Dense;
    Sparse, Sparse => Sparse;);
kind_rules!(Minus: Dense, Dense => Dense; Dense, Sparse => Dense; Sparse, Dense => Dense;
    Sparse, Sparse => Sparse;);
kind_rules!(Mult: Dense, Dense => Dense; Dense, Sparse => Dense; Sparse, Dense => Dense;
    Sparse, Sparse => Sparse;);
kind_rules!(Schur: Dense, Dense => Dense; Dense, Sparse => Sparse; Sparse, Dense => Sparse;
    Sparse, Sparse => Sparse;);

/// Lazy `lhs op rhs`. Concrete operands are held by reference, expressions by value.
#[derive(Debug, Clone)]
pub struct BinaryExpr<L, R, Op> {
    lhs: L,
    rhs: R,
    op: PhantomData<Op>,
}

pub type AddExpr<L, R> = BinaryExpr<L, R, Plus>;
pub type SubExpr<L, R> = BinaryExpr<L, R, Minus>;
pub type SchurExpr<L, R> = BinaryExpr<L, R, Schur>;

impl<L, R, Op> BinaryExpr<L, R, Op>
        where L: MatrixExpr, R: MatrixExpr<Elem = L::Elem>, Op: ElementwiseOp {
    pub fn new(lhs: L, rhs: R) -> Result<BinaryExpr<L, R, Op>> {
        if lhs.rows() != rhs.rows() || lhs.columns() != rhs.columns() {
            return Err(Error::from_kind(ErrorKind::DimensionMismatch(format!(
                "Matrix sizes do not match: {}x{} {:?} {}x{}", lhs.rows(), lhs.columns(),
                Op::KIND, rhs.rows(), rhs.columns()))));
        }
        Ok(BinaryExpr { lhs: lhs, rhs: rhs, op: PhantomData })
    }

    pub fn lhs(&self) -> &L { &self.lhs }
    pub fn rhs(&self) -> &R { &self.rhs }
    pub fn into_operands(self) -> (L, R) { (self.lhs, self.rhs) }
}

impl<L, R, Op> MatrixExpr for BinaryExpr<L, R, Op>
        where L: MatrixExpr,
              R: MatrixExpr<Elem = L::Elem>,
              Op: ElementwiseOp + KindRule<L::Kind, R::Kind> {
    type Elem = L::Elem;
    type Order = L::Order;
    type Kind = <Op as KindRule<L::Kind, R::Kind>>::Output;

    const IS_EXPRESSION: bool = true;
    const RETURNS_TEMPORARY: bool = true;
    const SMP_ASSIGNABLE: bool = L::SMP_ASSIGNABLE && R::SMP_ASSIGNABLE;
    const STATIC_ROWS: usize = max_extent(L::STATIC_ROWS, R::STATIC_ROWS);
    const STATIC_COLUMNS: usize = max_extent(L::STATIC_COLUMNS, R::STATIC_COLUMNS);
    const STRUCTURE: Structure = Structure::elementwise(Op::KIND, L::STRUCTURE, R::STRUCTURE);

    type Reader<'a> = BinaryReader<L::Reader<'a>, R::Reader<'a>, Op> where Self: 'a;

    fn rows(&self) -> usize { self.lhs.rows() }
    fn columns(&self) -> usize { self.lhs.columns() }
    fn reader<'a>(&'a self) -> Self::Reader<'a> {
        BinaryReader::new(self.lhs.reader(), self.rhs.reader())
    }

    /// The left operand is evaluated first, so it may be the target itself; anything the right
    /// operand shares with the target has been overwritten by then.
    fn can_alias(&self, key: &AliasKey) -> bool {
        match Op::KIND {
            OpKind::Plus | OpKind::Minus => {
                (self.lhs.can_alias(key) && !(!L::IS_EXPRESSION && self.lhs.is_same(key)))
                    || self.rhs.is_aliased(key)
            }
            OpKind::Schur => self.is_aliased(key),
        }
    }
    fn is_aliased(&self, key: &AliasKey) -> bool {
        self.lhs.is_aliased(key) || self.rhs.is_aliased(key)
    }

    fn assign_to(&self, target: &mut DenseLines<L::Elem>, mode: AssignMode, parallel: bool) {
        match Op::KIND {
            OpKind::Plus | OpKind::Minus => {
                self.lhs.assign_to(target, mode, parallel);
                self.rhs.assign_to(target, mode.compose(Op::KIND), parallel);
            }
            OpKind::Schur => dispatch::kernel(self, target, mode, parallel),
        }
    }
}

/// Reader of an element-wise node, over the readers of its operands. Serves matrix and vector
/// nodes alike.
pub struct BinaryReader<A, B, Op> {
    lhs: A,
    rhs: B,
    op: PhantomData<Op>,
}

impl<A, B, Op> BinaryReader<A, B, Op> {
    pub fn new(lhs: A, rhs: B) -> BinaryReader<A, B, Op> {
        BinaryReader { lhs, rhs, op: PhantomData }
    }
}

impl<T, A, B, Op> MatrixReader<T> for BinaryReader<A, B, Op>
        where T: Element, A: MatrixReader<T>, B: MatrixReader<T>, Op: ElementwiseOp {
    #[inline]
    fn get(&self, i: usize, j: usize) -> T {
        Op::apply(self.lhs.get(i, j), self.rhs.get(i, j))
    }
}

impl<T, A, B, Op> VectorReader<T> for BinaryReader<A, B, Op>
        where T: Element, A: VectorReader<T>, B: VectorReader<T>, Op: ElementwiseOp {
    #[inline]
    fn get(&self, i: usize) -> T {
        Op::apply(self.lhs.get(i), self.rhs.get(i))
    }
}

/// Element-wise product of two matrices of the same shape.
pub fn schur<L, R>(lhs: L, rhs: R) -> Result<SchurExpr<L, R>>
        where L: MatrixExpr, R: MatrixExpr<Elem = L::Elem> {
    BinaryExpr::new(lhs, rhs)
}
