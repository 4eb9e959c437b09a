//! Operator overloads that build expression nodes.
//!
//! Every operand carries a type-level tag (`Operand::Tag`) naming its shape (matrix, vector
//! of a given orientation, scalar) and its node class. The operators forward to a dispatch trait
//! implemented per pair of tags, which keeps the impls coherent and lets the tree be restructured
//! at construction time: when the left operand is a `+`/`-` node and the right operand a dense
//! container, `(l op1 r) op2 x` is built as `(l op2 x) op1 r` so that the container is evaluated
//! straight into the target before the remaining operand.
//!
//! Products and element-wise binary operations check shapes and return `Result`s; scaling,
//! negation and outer products cannot fail.

use std::marker::PhantomData;
use std::ops::{Add, Mul, Neg, Rem, Sub};

use num::{Complex, One};

use adaptor::Adaptor;
use binary::{BinaryExpr, Minus, Plus, Reassociable, Schur};
use dense::DynamicMatrix;
use element::Element;
use errors::*;
use map::MapExpr;
use product::{inner, MatVecExpr, MultExpr, OuterExpr};
use sparse::CompressedMatrix;
use sparse_vector::CompressedVector;
use static_matrix::StaticMatrix;
use static_vector::StaticVector;
use traits::{ColumnVector, KindRule, MatrixExpr, Order, RowVector, TransposeFlag, VectorExpr};
use unary::{DeclSymExpr, ScaleExpr, TransExpr};
use vecexpr::{CrossExpr, VecBinaryExpr, VecScaleExpr};
use vector::DynamicVector;

/// Dense container.
#[derive(Debug)]
pub struct DenseLeaf;
/// Sparse container.
#[derive(Debug)]
pub struct SparseLeaf;
/// Addition or subtraction node.
#[derive(Debug)]
pub struct Binary;
/// Any other expression node.
#[derive(Debug)]
pub struct Composite;

#[derive(Debug)]
pub struct Mat<N>(PhantomData<N>);
#[derive(Debug)]
pub struct Vector<F, N>(PhantomData<(F, N)>);
#[derive(Debug)]
pub struct Scalar;

pub trait Operand {
    type Tag;
}
impl<'a, X: Operand> Operand for &'a X {
    type Tag = X::Tag;
}

/// Node class of an element-wise operation.
pub trait OpNode {
    type Node;
}
impl OpNode for Plus { type Node = Binary; }
impl OpNode for Minus { type Node = Binary; }
impl OpNode for Schur { type Node = Composite; }

impl<T, O> Operand for DynamicMatrix<T, O> { type Tag = Mat<DenseLeaf>; }
impl<T, const M: usize, const N: usize> Operand for StaticMatrix<T, M, N> {
    type Tag = Mat<DenseLeaf>;
}
impl<T, O> Operand for CompressedMatrix<T, O> { type Tag = Mat<SparseLeaf>; }
impl<M: Operand, K> Operand for Adaptor<M, K> { type Tag = M::Tag; }
impl<L, R, Op: OpNode> Operand for BinaryExpr<L, R, Op> { type Tag = Mat<Op::Node>; }
impl<E, T> Operand for ScaleExpr<E, T> { type Tag = Mat<Composite>; }
impl<E> Operand for TransExpr<E> { type Tag = Mat<Composite>; }
impl<E> Operand for DeclSymExpr<E> { type Tag = Mat<Composite>; }
impl<E, F> Operand for MapExpr<E, F> { type Tag = Mat<Composite>; }
impl<L, R> Operand for MultExpr<L, R> { type Tag = Mat<Composite>; }
impl<A, B> Operand for OuterExpr<A, B> { type Tag = Mat<Composite>; }

impl<T, F> Operand for DynamicVector<T, F> { type Tag = Vector<F, DenseLeaf>; }
impl<T, const N: usize, F> Operand for StaticVector<T, N, F> { type Tag = Vector<F, DenseLeaf>; }
impl<T, F> Operand for CompressedVector<T, F> { type Tag = Vector<F, SparseLeaf>; }
impl<L: VectorExpr, R, Op: OpNode> Operand for VecBinaryExpr<L, R, Op> {
    type Tag = Vector<L::Flag, Op::Node>;
}
impl<V: VectorExpr, T> Operand for VecScaleExpr<V, T> { type Tag = Vector<V::Flag, Composite>; }
impl<M, V> Operand for MatVecExpr<M, V> { type Tag = Vector<ColumnVector, Composite>; }
impl<A: VectorExpr, B> Operand for CrossExpr<A, B> { type Tag = Vector<A::Flag, Composite>; }

macro_rules! scalar_operands {
    ($( $s:ty ),*) => { $( impl Operand for $s { type Tag = Scalar; } )* }
}
scalar_operands!(f32, f64, i32, i64, Complex<f32>, Complex<f64>);

pub trait AddDispatch<Rhs, LT, RT> {
    type Output;
    fn dispatch_add(self, rhs: Rhs) -> Self::Output;
}
pub trait SubDispatch<Rhs, LT, RT> {
    type Output;
    fn dispatch_sub(self, rhs: Rhs) -> Self::Output;
}
pub trait MulDispatch<Rhs, LT, RT> {
    type Output;
    fn dispatch_mul(self, rhs: Rhs) -> Self::Output;
}

// `l op r` built as written
macro_rules! plain_matrix_dispatch {
    ($dispatch:ident, $method:ident, $op:ty; $( ($ln:ty, $rn:ty) ),*) => {
        $(
            impl<L, R> $dispatch<R, Mat<$ln>, Mat<$rn>> for L
                    where L: MatrixExpr, R: MatrixExpr<Elem = L::Elem> {
                type Output = Result<BinaryExpr<L, R, $op>>;
                fn $method(self, rhs: R) -> Self::Output {
                    BinaryExpr::new(self, rhs)
                }
            }
        )*
    }
}
macro_rules! matrix_dispatch {
    ($dispatch:ident, $method:ident, $op:ty) => {
        plain_matrix_dispatch!($dispatch, $method, $op;
            (DenseLeaf, DenseLeaf), (DenseLeaf, SparseLeaf), (DenseLeaf, Binary),
            (DenseLeaf, Composite),
            (SparseLeaf, DenseLeaf), (SparseLeaf, SparseLeaf), (SparseLeaf, Binary),
            (SparseLeaf, Composite),
            (Composite, DenseLeaf), (Composite, SparseLeaf), (Composite, Binary),
            (Composite, Composite),
            (Binary, SparseLeaf), (Binary, Binary), (Binary, Composite));

        // `(l op1 r) op2 x` built as `(l op2 x) op1 r`
        impl<L, R, Op, X> $dispatch<X, Mat<Binary>, Mat<DenseLeaf>> for BinaryExpr<L, R, Op>
                where L: MatrixExpr,
                      R: MatrixExpr<Elem = L::Elem>,
                      X: MatrixExpr<Elem = L::Elem>,
                      Op: Reassociable,
                      $op: KindRule<L::Kind, X::Kind> {
            type Output = Result<BinaryExpr<BinaryExpr<L, X, $op>, R, Op>>;
            fn $method(self, rhs: X) -> Self::Output {
                trace!("restructuring (l {:?} r) {} x", Op::KIND, stringify!($method));
                let (l, r) = self.into_operands();
                BinaryExpr::new(BinaryExpr::new(l, rhs)?, r)
            }
        }
    }
}
matrix_dispatch!(AddDispatch, dispatch_add, Plus);
matrix_dispatch!(SubDispatch, dispatch_sub, Minus);

macro_rules! plain_vector_dispatch {
    ($dispatch:ident, $method:ident, $op:ty; $( ($ln:ty, $rn:ty) ),*) => {
        $(
            impl<L, R, F> $dispatch<R, Vector<F, $ln>, Vector<F, $rn>> for L
                    where F: TransposeFlag,
                          L: VectorExpr<Flag = F>,
                          R: VectorExpr<Elem = L::Elem, Flag = F> {
                type Output = Result<VecBinaryExpr<L, R, $op>>;
                fn $method(self, rhs: R) -> Self::Output {
                    VecBinaryExpr::new(self, rhs)
                }
            }
        )*
    }
}
macro_rules! vector_dispatch {
    ($dispatch:ident, $method:ident, $op:ty) => {
        plain_vector_dispatch!($dispatch, $method, $op;
            (DenseLeaf, DenseLeaf), (DenseLeaf, SparseLeaf), (DenseLeaf, Binary),
            (DenseLeaf, Composite),
            (SparseLeaf, DenseLeaf), (SparseLeaf, SparseLeaf), (SparseLeaf, Binary),
            (SparseLeaf, Composite),
            (Composite, DenseLeaf), (Composite, SparseLeaf), (Composite, Binary),
            (Composite, Composite),
            (Binary, SparseLeaf), (Binary, Binary), (Binary, Composite));

        impl<L, R, Op, X, F> $dispatch<X, Vector<F, Binary>, Vector<F, DenseLeaf>>
                for VecBinaryExpr<L, R, Op>
                where F: TransposeFlag,
                      L: VectorExpr<Flag = F>,
                      R: VectorExpr<Elem = L::Elem, Flag = F>,
                      X: VectorExpr<Elem = L::Elem, Flag = F>,
                      Op: Reassociable {
            type Output = Result<VecBinaryExpr<VecBinaryExpr<L, X, $op>, R, Op>>;
            fn $method(self, rhs: X) -> Self::Output {
                trace!("restructuring vector (l {:?} r) {} x", Op::KIND, stringify!($method));
                let (l, r) = self.into_operands();
                VecBinaryExpr::new(VecBinaryExpr::new(l, rhs)?, r)
            }
        }
    }
}
vector_dispatch!(AddDispatch, dispatch_add, Plus);
vector_dispatch!(SubDispatch, dispatch_sub, Minus);

impl<L, R, LN, RN> MulDispatch<R, Mat<LN>, Mat<RN>> for L
        where L: MatrixExpr, R: MatrixExpr<Elem = L::Elem> {
    type Output = Result<MultExpr<L, R>>;
    fn dispatch_mul(self, rhs: R) -> Self::Output {
        MultExpr::new(self, rhs)
    }
}
impl<L, R, LN, RN> MulDispatch<R, Mat<LN>, Vector<ColumnVector, RN>> for L
        where L: MatrixExpr, R: VectorExpr<Elem = L::Elem, Flag = ColumnVector> {
    type Output = Result<MatVecExpr<L, R>>;
    fn dispatch_mul(self, rhs: R) -> Self::Output {
        MatVecExpr::new(self, rhs)
    }
}
impl<L, S, LN> MulDispatch<S, Mat<LN>, Scalar> for L
        where S: Element, L: MatrixExpr<Elem = S> {
    type Output = ScaleExpr<L, S>;
    fn dispatch_mul(self, rhs: S) -> Self::Output {
        ScaleExpr::new(self, rhs)
    }
}
impl<L, R, LN, RN> MulDispatch<R, Vector<ColumnVector, LN>, Vector<RowVector, RN>> for L
        where L: VectorExpr<Flag = ColumnVector>, R: VectorExpr<Elem = L::Elem, Flag = RowVector> {
    type Output = OuterExpr<L, R>;
    fn dispatch_mul(self, rhs: R) -> Self::Output {
        OuterExpr::new(self, rhs)
    }
}
impl<L, R, LN, RN> MulDispatch<R, Vector<RowVector, LN>, Vector<ColumnVector, RN>> for L
        where L: VectorExpr<Flag = RowVector>, R: VectorExpr<Elem = L::Elem, Flag = ColumnVector> {
    type Output = Result<L::Elem>;
    fn dispatch_mul(self, rhs: R) -> Self::Output {
        inner(&self, &rhs)
    }
}
impl<L, R, F, LN, RN> MulDispatch<R, Vector<F, LN>, Vector<F, RN>> for L
        where F: TransposeFlag, L: VectorExpr<Flag = F>, R: VectorExpr<Elem = L::Elem, Flag = F> {
    type Output = Result<VecBinaryExpr<L, R, Schur>>;
    fn dispatch_mul(self, rhs: R) -> Self::Output {
        VecBinaryExpr::new(self, rhs)
    }
}
impl<L, S, F, LN> MulDispatch<S, Vector<F, LN>, Scalar> for L
        where S: Element, L: VectorExpr<Elem = S> {
    type Output = VecScaleExpr<L, S>;
    fn dispatch_mul(self, rhs: S) -> Self::Output {
        VecScaleExpr::new(self, rhs)
    }
}

macro_rules! binary_operators {
    ([$( $gen:tt )*] $lhs:ty) => {
        impl<$( $gen )*, Rhs> Add<Rhs> for $lhs
                where Rhs: Operand,
                      $lhs: Operand + AddDispatch<Rhs, <$lhs as Operand>::Tag, Rhs::Tag> {
            type Output = <$lhs as AddDispatch<Rhs, <$lhs as Operand>::Tag, Rhs::Tag>>::Output;
            fn add(self, rhs: Rhs) -> Self::Output {
                <$lhs as AddDispatch<Rhs, <$lhs as Operand>::Tag, Rhs::Tag>>::dispatch_add(self,
                    rhs)
            }
        }
        impl<$( $gen )*, Rhs> Sub<Rhs> for $lhs
                where Rhs: Operand,
                      $lhs: Operand + SubDispatch<Rhs, <$lhs as Operand>::Tag, Rhs::Tag> {
            type Output = <$lhs as SubDispatch<Rhs, <$lhs as Operand>::Tag, Rhs::Tag>>::Output;
            fn sub(self, rhs: Rhs) -> Self::Output {
                <$lhs as SubDispatch<Rhs, <$lhs as Operand>::Tag, Rhs::Tag>>::dispatch_sub(self,
                    rhs)
            }
        }
        impl<$( $gen )*, Rhs> Mul<Rhs> for $lhs
                where Rhs: Operand,
                      $lhs: Operand + MulDispatch<Rhs, <$lhs as Operand>::Tag, Rhs::Tag> {
            type Output = <$lhs as MulDispatch<Rhs, <$lhs as Operand>::Tag, Rhs::Tag>>::Output;
            fn mul(self, rhs: Rhs) -> Self::Output {
                <$lhs as MulDispatch<Rhs, <$lhs as Operand>::Tag, Rhs::Tag>>::dispatch_mul(self,
                    rhs)
            }
        }
    }
}
macro_rules! matrix_operators {
    ([$( $gen:tt )*] $lhs:ty) => {
        binary_operators!([$( $gen )*] $lhs);

        impl<$( $gen )*> Neg for $lhs where $lhs: MatrixExpr {
            type Output = ScaleExpr<$lhs, <$lhs as MatrixExpr>::Elem>;
            fn neg(self) -> Self::Output {
                ScaleExpr::new(self, -<<$lhs as MatrixExpr>::Elem as One>::one())
            }
        }
    }
}
macro_rules! vector_operators {
    ([$( $gen:tt )*] $lhs:ty) => {
        binary_operators!([$( $gen )*] $lhs);

        impl<$( $gen )*> Neg for $lhs where $lhs: VectorExpr {
            type Output = VecScaleExpr<$lhs, <$lhs as VectorExpr>::Elem>;
            fn neg(self) -> Self::Output {
                VecScaleExpr::new(self, -<<$lhs as VectorExpr>::Elem as One>::one())
            }
        }

        /// Cross product.
        impl<$( $gen )*, Rhs> Rem<Rhs> for $lhs
                where $lhs: VectorExpr,
                      Rhs: VectorExpr<Elem = <$lhs as VectorExpr>::Elem,
                                      Flag = <$lhs as VectorExpr>::Flag> {
            type Output = Result<CrossExpr<$lhs, Rhs>>;
            fn rem(self, rhs: Rhs) -> Self::Output {
                CrossExpr::new(self, rhs)
            }
        }
    }
}

matrix_operators!(['a, T, O] &'a DynamicMatrix<T, O>);
matrix_operators!(['a, T, const M: usize, const N: usize] &'a StaticMatrix<T, M, N>);
matrix_operators!(['a, T, O] &'a CompressedMatrix<T, O>);
matrix_operators!(['a, M, K] &'a Adaptor<M, K>);
matrix_operators!([L, R, Op] BinaryExpr<L, R, Op>);
matrix_operators!([E, T] ScaleExpr<E, T>);
matrix_operators!([E] TransExpr<E>);
matrix_operators!([E] DeclSymExpr<E>);
matrix_operators!([E, F] MapExpr<E, F>);
matrix_operators!([L, R] MultExpr<L, R>);
matrix_operators!([A, B] OuterExpr<A, B>);

vector_operators!(['a, T, F] &'a DynamicVector<T, F>);
vector_operators!(['a, T, const N: usize, F] &'a StaticVector<T, N, F>);
vector_operators!(['a, T, F] &'a CompressedVector<T, F>);
vector_operators!([L, R, Op] VecBinaryExpr<L, R, Op>);
vector_operators!([V, T] VecScaleExpr<V, T>);
vector_operators!([M, V] MatVecExpr<M, V>);
vector_operators!([A, B] CrossExpr<A, B>);

// `s * x` for the built-in element types
macro_rules! scalar_left_mul {
    ($( $s:ty ),*) => {
        $(
            impl<'a, O: Order> Mul<&'a DynamicMatrix<$s, O>> for $s {
                type Output = ScaleExpr<&'a DynamicMatrix<$s, O>, $s>;
                fn mul(self, rhs: &'a DynamicMatrix<$s, O>) -> Self::Output {
                    ScaleExpr::new(rhs, self)
                }
            }
            impl<'a, O: Order> Mul<&'a CompressedMatrix<$s, O>> for $s {
                type Output = ScaleExpr<&'a CompressedMatrix<$s, O>, $s>;
                fn mul(self, rhs: &'a CompressedMatrix<$s, O>) -> Self::Output {
                    ScaleExpr::new(rhs, self)
                }
            }
            impl<'a, F: TransposeFlag> Mul<&'a DynamicVector<$s, F>> for $s {
                type Output = VecScaleExpr<&'a DynamicVector<$s, F>, $s>;
                fn mul(self, rhs: &'a DynamicVector<$s, F>) -> Self::Output {
                    VecScaleExpr::new(rhs, self)
                }
            }
            impl<'a, F: TransposeFlag> Mul<&'a CompressedVector<$s, F>> for $s {
                type Output = VecScaleExpr<&'a CompressedVector<$s, F>, $s>;
                fn mul(self, rhs: &'a CompressedVector<$s, F>) -> Self::Output {
                    VecScaleExpr::new(rhs, self)
                }
            }
            impl<L, R, Op> Mul<BinaryExpr<L, R, Op>> for $s
                    where BinaryExpr<L, R, Op>: MatrixExpr<Elem = $s> {
                type Output = ScaleExpr<BinaryExpr<L, R, Op>, $s>;
                fn mul(self, rhs: BinaryExpr<L, R, Op>) -> Self::Output {
                    ScaleExpr::new(rhs, self)
                }
            }
        )*
    }
}
scalar_left_mul!(f32, f64, i32, i64, Complex<f32>, Complex<f64>);

#[cfg(test)]
mod tests {
    use super::*;
    use binary::{AddExpr, SubExpr};
    use traits::{evaluate, ColumnMajor};

    #[test]
    fn test_matrix_add_ref_ref() {
        let a = DynamicMatrix::<f64>::from_vec(2, 4, vec![2.0, 6.0, 0.0, 4.0, 7.0, 2.0, 7.0, 2.0]);
        let b = DynamicMatrix::<f64>::from_vec(2, 4,
            vec![38.0, 44.0, 50.0, 56.0, 83.0, 98.0, 113.0, 128.0]);

        let out = evaluate(&(&a + &b).unwrap());

        assert_eq!(out.to_vec(), vec![40.0, 50.0, 50.0, 60.0, 90.0, 100.0, 120.0, 130.0]);
    }

    #[test]
    fn test_matrix_sub_ref_ref() {
        let a = DynamicMatrix::<f64>::from_vec(2, 4,
            vec![40.0, 50.0, 50.0, 60.0, 90.0, 100.0, 120.0, 130.0]);
        let b = DynamicMatrix::<f64, ColumnMajor>::from_vec(2, 4,
            vec![38.0, 83.0, 44.0, 98.0, 50.0, 113.0, 56.0, 128.0]);

        let out = evaluate(&(&a - &b).unwrap());

        assert_eq!(out.to_vec(), vec![2.0, 6.0, 0.0, 4.0, 7.0, 2.0, 7.0, 2.0]);
    }

    #[test]
    fn test_matrix_mul_ref_ref() {
        let a = DynamicMatrix::<f64, ColumnMajor>::from_vec(2, 3,
            vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        let b = DynamicMatrix::<f64, ColumnMajor>::from_vec(3, 4,
            vec![1.0, 5.0, 9.0, 2.0, 6.0, 10.0, 3.0, 7.0, 11.0, 4.0, 8.0, 12.0]);

        let out = evaluate(&(&a * &b).unwrap());

        assert_eq!(out.dims(), (2, 4));
        assert_eq!(out.to_vec(), vec![38.0, 83.0, 44.0, 98.0, 50.0, 113.0, 56.0, 128.0]);
    }

    #[test]
    fn test_scalar_mul() {
        let a = DynamicMatrix::<f64>::from_vec(2, 4, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let expected = vec![2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0];

        assert_eq!(evaluate(&(&a * 2.0)).to_vec(), expected);
        assert_eq!(evaluate(&(2.0 * &a)).to_vec(), expected);
        assert_eq!(evaluate(&-&a).to_vec(), vec![-1.0, -2.0, -3.0, -4.0, -5.0, -6.0, -7.0, -8.0]);
    }

    #[test]
    fn test_chained() {
        let a = mat![1, 2; 3, 4];
        let b = mat![1, 0; 0, 1];
        let c = mat![2, 2; 2, 2];

        // a*b - c
        let e = ((&a * &b).unwrap() - &c).unwrap();
        assert_eq!(evaluate(&e), mat![-1, 0; 1, 2]);

        // -(a + b) * 2
        let e = -((&a + &b).unwrap()) * 2.0;
        assert_eq!(evaluate(&e), mat![-4, -4; -6, -10]);
    }

    #[test]
    fn test_rewrite_type() {
        let a = mat![1, 2; 3, 4];
        let b = mat![1, 1; 1, 1];
        let c = mat![5, 0; 0, 5];

        let e: SubExpr<AddExpr<&DynamicMatrix<f64>, &DynamicMatrix<f64>>, &DynamicMatrix<f64>> =
            ((&a - &b).unwrap() + &c).unwrap();
        assert_eq!(evaluate(&e), mat![5, 1; 2, 8]);

        let e: AddExpr<SubExpr<&DynamicMatrix<f64>, &DynamicMatrix<f64>>, &DynamicMatrix<f64>> =
            ((&a + &b).unwrap() - &c).unwrap();
        assert_eq!(evaluate(&e), mat![-3, 3; 4, 0]);
    }

    #[test]
    fn test_no_rewrite_for_sparse_or_expressions() {
        let a = mat![1, 2; 3, 4];
        let b = mat![1, 1; 1, 1];
        let s = CompressedMatrix::<f64>::from_triplets(2, 2, &[(0, 0, 1.0)]).unwrap();

        let e: SubExpr<SubExpr<&DynamicMatrix<f64>, &DynamicMatrix<f64>>,
            &CompressedMatrix<f64>> = ((&a - &b).unwrap() - &s).unwrap();
        assert_eq!(evaluate(&e), mat![-1, 1; 2, 3]);

        let e: AddExpr<SubExpr<&DynamicMatrix<f64>, &DynamicMatrix<f64>>,
            ScaleExpr<&DynamicMatrix<f64>, f64>> = ((&a - &b).unwrap() + &a * 2.0).unwrap();
        assert_eq!(evaluate(&e), mat![2, 5; 8, 11]);
    }

    #[test]
    fn test_mismatch_errors() {
        let a = DynamicMatrix::<f64>::zeros(3, 3);
        let b = DynamicMatrix::<f64>::zeros(2, 2);
        assert!((&a - &b).unwrap_err().is_invalid_argument());
        assert!((&a * &b).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_vector_operators() {
        let x = DynamicVector::<f64>::from_vec(vec![1.0, 2.0, 3.0]);
        let y = DynamicVector::<f64>::from_vec(vec![0.0, 1.0, 0.0]);
        let a = mat![1, 0, 0; 0, 2, 0; 0, 0, 3];

        let mut z = DynamicVector::<f64>::zeros(3);
        z.assign(&((&x - &y).unwrap() + &x).unwrap()).unwrap();
        assert_eq!(z.to_vec(), vec![2.0, 3.0, 6.0]);

        z.assign(&(&a * &x).unwrap()).unwrap();
        assert_eq!(z.to_vec(), vec![1.0, 4.0, 9.0]);

        z.assign(&(&x % &y).unwrap()).unwrap();
        assert_eq!(z.to_vec(), vec![-3.0, 0.0, 1.0]);

        z.assign(&(&x * &y).unwrap()).unwrap();
        assert_eq!(z.to_vec(), vec![0.0, 2.0, 0.0]);

        z.assign(&(2.0 * &x)).unwrap();
        assert_eq!(z.to_vec(), vec![2.0, 4.0, 6.0]);

        let xt = x.trans();
        assert_eq!((&xt * &y).unwrap(), 2.0);
        let outer = evaluate(&(&x * &xt));
        assert_eq!(outer.at(2, 1), 6.0);
    }

    #[test]
    fn test_sparse_and_static_vector_operators() {
        let s = CompressedVector::<f64>::from_pairs(3, &[(0, 2.0), (2, -1.0)]).unwrap();
        let v = StaticVector::<f64, 3>::new([1.0, 2.0, 3.0]);
        let d = DynamicVector::<f64>::from_vec(vec![1.0, 1.0, 1.0]);

        let mut z = DynamicVector::<f64>::zeros(3);
        z.assign(&(&s + &v).unwrap()).unwrap();
        assert_eq!(z.to_vec(), vec![3.0, 2.0, 2.0]);

        // (d - s) + v is rebuilt as (d + v) - s
        let e: VecBinaryExpr<VecBinaryExpr<&DynamicVector<f64>, &StaticVector<f64, 3>, Plus>,
            &CompressedVector<f64>, Minus> = ((&d - &s).unwrap() + &v).unwrap();
        z.assign(&e).unwrap();
        assert_eq!(z.to_vec(), vec![0.0, 3.0, 5.0]);

        let mut t = CompressedVector::<f64>::new(3);
        t.assign(&(&s * &v).unwrap()).unwrap();
        assert_eq!(t.to_vec(), vec![2.0, 0.0, -3.0]);
        assert_eq!(t.non_zeros(), 2);

        t.assign(&(2.0 * &s)).unwrap();
        assert_eq!(t.to_vec(), vec![4.0, 0.0, -2.0]);
        assert_eq!((&s.trans() * &v).unwrap(), -1.0);
        assert_eq!((&v.trans() * &s).unwrap(), -1.0);

        let outer = evaluate(&(&s * &v.trans()));
        assert_eq!(outer.dims(), (3, 3));
        assert_eq!(outer.at(2, 1), -2.0);
        assert_eq!(outer.at(1, 2), 0.0);

        let a = mat![1, 0, 0; 0, 2, 0; 0, 0, 3];
        z.assign(&(&a * &s).unwrap()).unwrap();
        assert_eq!(z.to_vec(), vec![2.0, 0.0, -3.0]);
    }
}
