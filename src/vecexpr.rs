//! Vector expressions.

use std::marker::PhantomData;

use alias::AliasKey;
use binary::{BinaryReader, ElementwiseOp, Minus, Plus, Schur};
use dispatch::{self, AssignMode};
use element::Element;
use errors::*;
use structure::{max_extent, OpKind};
use traits::{VectorExpr, VectorReader};
use unary::ScaleReader;

/// Lazy element-wise `lhs op rhs` of two vectors with the same orientation.
#[derive(Debug, Clone)]
pub struct VecBinaryExpr<L, R, Op> {
    lhs: L,
    rhs: R,
    op: PhantomData<Op>,
}

pub type VecAddExpr<L, R> = VecBinaryExpr<L, R, Plus>;
pub type VecSubExpr<L, R> = VecBinaryExpr<L, R, Minus>;
pub type VecSchurExpr<L, R> = VecBinaryExpr<L, R, Schur>;

impl<L, R, Op> VecBinaryExpr<L, R, Op>
        where L: VectorExpr, R: VectorExpr<Elem = L::Elem, Flag = L::Flag>, Op: ElementwiseOp {
    pub fn new(lhs: L, rhs: R) -> Result<VecBinaryExpr<L, R, Op>> {
        if lhs.size() != rhs.size() {
            return Err(Error::from_kind(ErrorKind::DimensionMismatch(format!(
                "Vector sizes do not match: {} {:?} {}", lhs.size(), Op::KIND, rhs.size()))));
        }
        Ok(VecBinaryExpr { lhs, rhs, op: PhantomData })
    }
    pub fn into_operands(self) -> (L, R) { (self.lhs, self.rhs) }
}

impl<L, R, Op> VectorExpr for VecBinaryExpr<L, R, Op>
        where L: VectorExpr, R: VectorExpr<Elem = L::Elem, Flag = L::Flag>, Op: ElementwiseOp {
    type Elem = L::Elem;
    type Flag = L::Flag;

    const IS_EXPRESSION: bool = true;
    const SMP_ASSIGNABLE: bool = L::SMP_ASSIGNABLE && R::SMP_ASSIGNABLE;
    const STATIC_SIZE: usize = max_extent(L::STATIC_SIZE, R::STATIC_SIZE);

    type Reader<'a> = BinaryReader<L::Reader<'a>, R::Reader<'a>, Op> where Self: 'a;

    fn size(&self) -> usize { self.lhs.size() }
    fn reader<'a>(&'a self) -> Self::Reader<'a> {
        BinaryReader::new(self.lhs.reader(), self.rhs.reader())
    }

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

    fn assign_to(&self, target: &mut [L::Elem], key: &AliasKey, mode: AssignMode,
            parallel: bool) {
        match Op::KIND {
            OpKind::Plus | OpKind::Minus => {
                self.lhs.assign_to(target, key, mode, parallel);
                self.rhs.assign_to(target, key, mode.compose(Op::KIND), parallel);
            }
            OpKind::Schur => dispatch::vector_kernel(self, target, mode, parallel),
        }
    }
}

/// Lazy `scalar * vector`.
#[derive(Debug, Clone)]
pub struct VecScaleExpr<V, T> {
    operand: V,
    scalar: T,
}

impl<V: VectorExpr<Elem = T>, T: Element> VecScaleExpr<V, T> {
    pub fn new(operand: V, scalar: T) -> VecScaleExpr<V, T> {
        VecScaleExpr { operand, scalar }
    }
}

impl<V: VectorExpr<Elem = T>, T: Element> VectorExpr for VecScaleExpr<V, T> {
    type Elem = T;
    type Flag = V::Flag;

    const IS_EXPRESSION: bool = true;
    const SMP_ASSIGNABLE: bool = V::SMP_ASSIGNABLE;
    const STATIC_SIZE: usize = V::STATIC_SIZE;

    type Reader<'a> = ScaleReader<V::Reader<'a>, T> where Self: 'a;

    fn size(&self) -> usize { self.operand.size() }
    fn reader<'a>(&'a self) -> Self::Reader<'a> {
        ScaleReader::new(self.operand.reader(), self.scalar)
    }

    fn can_alias(&self, key: &AliasKey) -> bool { self.operand.is_aliased(key) }
    fn is_aliased(&self, key: &AliasKey) -> bool { self.operand.is_aliased(key) }

    fn assign_to(&self, target: &mut [T], key: &AliasKey, mode: AssignMode, parallel: bool) {
        if mode == AssignMode::Assign {
            self.operand.assign_to(target, key, mode, parallel);
            for slot in target.iter_mut() {
                *slot = *slot * self.scalar;
            }
        } else {
            dispatch::vector_kernel(self, target, mode, parallel);
        }
    }
}

/// Lazy cross product of two 3-vectors.
#[derive(Debug, Clone)]
pub struct CrossExpr<A, B> {
    lhs: A,
    rhs: B,
}

impl<A, B> CrossExpr<A, B>
        where A: VectorExpr, B: VectorExpr<Elem = A::Elem, Flag = A::Flag> {
    pub fn new(lhs: A, rhs: B) -> Result<CrossExpr<A, B>> {
        if lhs.size() != 3 || rhs.size() != 3 {
            return Err(Error::from_kind(ErrorKind::InvalidArgument(format!(
                "Invalid vector size for cross product: {} and {}", lhs.size(), rhs.size()))));
        }
        Ok(CrossExpr { lhs, rhs })
    }
}

pub struct CrossReader<A, B> {
    lhs: A,
    rhs: B,
}

impl<T: Element, A: VectorReader<T>, B: VectorReader<T>> VectorReader<T> for CrossReader<A, B> {
    fn get(&self, i: usize) -> T {
        let (a, b) = (&self.lhs, &self.rhs);
        match i {
            0 => a.get(1) * b.get(2) - a.get(2) * b.get(1),
            1 => a.get(2) * b.get(0) - a.get(0) * b.get(2),
            _ => a.get(0) * b.get(1) - a.get(1) * b.get(0),
        }
    }
}

impl<A, B> VectorExpr for CrossExpr<A, B>
        where A: VectorExpr, B: VectorExpr<Elem = A::Elem, Flag = A::Flag> {
    type Elem = A::Elem;
    type Flag = A::Flag;

    const IS_EXPRESSION: bool = true;
    const SMP_ASSIGNABLE: bool = false;
    const STATIC_SIZE: usize = 3;

    type Reader<'a> = CrossReader<A::Reader<'a>, B::Reader<'a>> where Self: 'a;

    fn size(&self) -> usize { 3 }
    fn reader<'a>(&'a self) -> Self::Reader<'a> {
        CrossReader { lhs: self.lhs.reader(), rhs: self.rhs.reader() }
    }

    fn can_alias(&self, key: &AliasKey) -> bool { self.is_aliased(key) }
    fn is_aliased(&self, key: &AliasKey) -> bool {
        self.lhs.is_aliased(key) || self.rhs.is_aliased(key)
    }
}

pub fn cross<A, B>(lhs: A, rhs: B) -> Result<CrossExpr<A, B>>
        where A: VectorExpr, B: VectorExpr<Elem = A::Elem, Flag = A::Flag> {
    CrossExpr::new(lhs, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Config;
    use vector::DynamicVector;

    fn v(values: &[f64]) -> DynamicVector<f64> {
        DynamicVector::from_vec(values.to_vec())
    }

    #[test]
    fn test_add_sub() {
        let (a, b) = (v(&[1.0, 2.0, 3.0]), v(&[1.0, 1.0, 1.0]));
        let mut t = v(&[0.0; 3]);
        t.assign(&VecSubExpr::new(&a, &b).unwrap()).unwrap();
        assert_eq!(t.to_vec(), vec![0.0, 1.0, 2.0]);
        t.sub_assign_expr(&VecAddExpr::new(&a, &b).unwrap()).unwrap();
        assert_eq!(t.to_vec(), vec![-2.0, -2.0, -2.0]);
        assert!(VecAddExpr::new(&a, &v(&[1.0])).is_err());
    }

    #[test]
    fn test_rhs_alias() {
        let mut t = v(&[1.0, 2.0]);
        let r = v(&[10.0, 10.0]);
        let alias = t.share();
        let e = VecSubExpr::new(&r, &alias).unwrap();
        assert!(e.can_alias(&t.alias_key()));
        t.assign_with(&e, &Config::serial()).unwrap();
        assert_eq!(t.to_vec(), vec![9.0, 8.0]);
    }

    #[test]
    fn test_scale() {
        let a = v(&[1.0, -2.0]);
        let mut t = v(&[1.0, 1.0]);
        t.add_assign_expr(&VecScaleExpr::new(&a, 3.0)).unwrap();
        assert_eq!(t.to_vec(), vec![4.0, -5.0]);
        t.assign(&VecScaleExpr::new(&a, -1.0)).unwrap();
        assert_eq!(t.to_vec(), vec![-1.0, 2.0]);
    }

    #[test]
    fn test_cross() {
        let x = v(&[1.0, 0.0, 0.0]);
        let y = v(&[0.0, 1.0, 0.0]);
        let mut z = v(&[]);
        z.assign(&cross(&x, &y).unwrap()).unwrap();
        assert_eq!(z.to_vec(), vec![0.0, 0.0, 1.0]);

        let e = cross(&x, &v(&[1.0, 2.0])).unwrap_err();
        assert!(e.is_invalid_argument());
    }

    #[test]
    fn test_cross_aliased() {
        let mut a = v(&[1.0, 2.0, 3.0]);
        let b = v(&[4.0, 5.0, 6.0]);
        let alias = a.share();
        a.assign(&cross(&alias, &b).unwrap()).unwrap();
        assert_eq!(a.to_vec(), vec![-3.0, 6.0, -3.0]);
    }
}
