use std::fmt;

use alias::AliasKey;
use dense::DynamicMatrix;
use element::Element;
use structure::Structure;
use traits::{Dense, MatrixExpr, MatrixReader, Order};

/// Lazy element-wise application of `f`.
#[derive(Clone)]
pub struct MapExpr<E, F> {
    operand: E,
    f: F,
}

pub fn map<E, F>(operand: E, f: F) -> MapExpr<E, F>
        where E: MatrixExpr, F: Fn(E::Elem) -> E::Elem + Sync {
    MapExpr { operand, f }
}

impl<E: fmt::Debug, F> fmt::Debug for MapExpr<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MapExpr").field("operand", &self.operand).finish()
    }
}

pub struct MapReader<'a, A, F: 'a> {
    operand: A,
    f: &'a F,
}

impl<'a, T, A, F> MatrixReader<T> for MapReader<'a, A, F>
        where A: MatrixReader<T>, F: Fn(T) -> T + Sync {
    #[inline]
    fn get(&self, i: usize, j: usize) -> T { (self.f)(self.operand.get(i, j)) }
}

impl<E, F> MatrixExpr for MapExpr<E, F>
        where E: MatrixExpr, F: Fn(E::Elem) -> E::Elem + Sync {
    type Elem = E::Elem;
    type Order = E::Order;
    type Kind = Dense;

    const IS_EXPRESSION: bool = true;
    const RETURNS_TEMPORARY: bool = true;
    const SMP_ASSIGNABLE: bool = E::SMP_ASSIGNABLE;
    const STATIC_ROWS: usize = E::STATIC_ROWS;
    const STATIC_COLUMNS: usize = E::STATIC_COLUMNS;
    const STRUCTURE: Structure = Structure::GENERAL;

    type Reader<'a> = MapReader<'a, E::Reader<'a>, F> where Self: 'a;

    fn rows(&self) -> usize { self.operand.rows() }
    fn columns(&self) -> usize { self.operand.columns() }
    fn reader<'a>(&'a self) -> Self::Reader<'a> {
        MapReader { operand: self.operand.reader(), f: &self.f }
    }

    fn can_alias(&self, key: &AliasKey) -> bool { self.operand.is_aliased(key) }
    fn is_aliased(&self, key: &AliasKey) -> bool { self.operand.is_aliased(key) }
}

impl<T: Element, O: Order> DynamicMatrix<T, O> {
    pub fn map<F>(&self, f: F) -> MapExpr<&DynamicMatrix<T, O>, F> where F: Fn(T) -> T + Sync {
        map(self, f)
    }
}
