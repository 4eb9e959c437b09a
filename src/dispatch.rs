//! Assignment dispatch: chooses how an expression is evaluated into a target and runs the
//! evaluation kernels.
//!
//! The decision itself is the pure function [`plan`](fn.plan.html) over a set of
//! [`Facts`](struct.Facts.html); [`dispatch`](fn.dispatch.html) gathers the facts from the
//! target and expression types, logs the decision and carries it out.

use num::Zero;
use rayon::prelude::*;

use alias::{self, AliasKey, AliasVerdict};
use config::{Concurrency, Config};
use dense::DynamicMatrix;
use element::Element;
use errors::*;
use structure::OpKind;
use traits::{MatrixExpr, MatrixReader, StorageOrder, VectorExpr, VectorReader};

/// How evaluated values are combined with the target's current values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignMode {
    Assign,
    AddAssign,
    SubAssign,
}
impl AssignMode {
    #[inline]
    pub fn combine<T: Element>(self, current: T, value: T) -> T {
        match self {
            AssignMode::Assign => value,
            AssignMode::AddAssign => current + value,
            AssignMode::SubAssign => current - value,
        }
    }

    /// Mode for the right operand of `l op r` when the whole expression is evaluated with
    /// `self` and the left operand has already been evaluated with `self`.
    pub fn compose(self, op: OpKind) -> AssignMode {
        match (op, self) {
            (OpKind::Plus, AssignMode::SubAssign) => AssignMode::SubAssign,
            (OpKind::Plus, _) => AssignMode::AddAssign,
            (OpKind::Minus, AssignMode::SubAssign) => AssignMode::AddAssign,
            (OpKind::Minus, _) => AssignMode::SubAssign,
            (OpKind::Schur, mode) => mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Dense,
    Sparse,
}

/// Everything the dispatcher needs to know to choose an evaluation route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facts {
    pub target: TargetKind,
    pub verdict: AliasVerdict,
    pub concurrency: Concurrency,
    pub target_smp: bool,
    pub expr_smp: bool,
    pub elements: usize,
    pub smp_threshold: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Evaluate operand by operand straight into the target.
    Direct,
    /// Evaluate into a fresh dense temporary, then combine it into the target.
    Temporary,
    /// Expand the sparse target into a dense temporary of the same storage order, evaluate into
    /// it, then compress it back.
    SparseTemporary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub route: Route,
    pub parallel: bool,
}

pub fn plan(facts: &Facts) -> Plan {
    let parallel = facts.concurrency == Concurrency::Smp
        && facts.target_smp
        && facts.expr_smp
        && facts.elements >= facts.smp_threshold;
    let route = match (facts.target, facts.verdict) {
        (TargetKind::Sparse, _) => Route::SparseTemporary,
        (TargetKind::Dense, AliasVerdict::Overlapping) => Route::Temporary,
        (TargetKind::Dense, _) => Route::Direct,
    };
    Plan { route, parallel }
}

/// Mutable view of a dense target, split into its major lines (rows for row-major storage,
/// columns for column-major storage).
pub struct DenseLines<'a, T: 'a> {
    lines: Vec<&'a mut [T]>,
    rows: usize,
    columns: usize,
    order: StorageOrder,
    key: AliasKey,
}

impl<'a, T: Element> DenseLines<'a, T> {
    /// Splits a contiguous buffer laid out in `order`.
    pub fn new(data: &'a mut [T], rows: usize, columns: usize, order: StorageOrder, key: AliasKey)
            -> DenseLines<'a, T> {
        let (major, minor) = order.lines(rows, columns);
        debug_assert_eq!(data.len(), rows * columns);
        let lines: Vec<&'a mut [T]> = if minor == 0 {
            (0..major).map(|_| <&mut [T]>::default()).collect()
        } else {
            data.chunks_mut(minor).collect()
        };
        DenseLines::from_lines(lines, rows, columns, order, key)
    }

    pub fn from_lines(lines: Vec<&'a mut [T]>, rows: usize, columns: usize, order: StorageOrder,
            key: AliasKey) -> DenseLines<'a, T> {
        debug_assert_eq!(lines.len(), order.lines(rows, columns).0);
        DenseLines { lines, rows, columns, order, key }
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn columns(&self) -> usize { self.columns }
    pub fn order(&self) -> StorageOrder { self.order }
    pub fn key(&self) -> &AliasKey { &self.key }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        let (major, minor) = match self.order {
            StorageOrder::RowMajor => (i, j),
            StorageOrder::ColumnMajor => (j, i),
        };
        self.lines[major][minor]
    }
    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        let (major, minor) = match self.order {
            StorageOrder::RowMajor => (i, j),
            StorageOrder::ColumnMajor => (j, i),
        };
        &mut self.lines[major][minor]
    }

    pub fn fill(&mut self, value: T) {
        for line in self.lines.iter_mut() {
            for slot in line.iter_mut() {
                *slot = value;
            }
        }
    }

    /// Combines the target with itself, for expressions that are the target.
    pub fn combine_with_self(&mut self, mode: AssignMode) {
        if mode == AssignMode::Assign {
            return;
        }
        for line in self.lines.iter_mut() {
            for slot in line.iter_mut() {
                *slot = mode.combine(*slot, *slot);
            }
        }
    }

    pub fn scale(&mut self, scalar: T, parallel: bool) {
        for_each_line(self, parallel, |_, line| {
            for slot in line.iter_mut() {
                *slot = *slot * scalar;
            }
        });
    }
}

/// Runs `f(major, line)` over every major line of the target, in parallel if requested. Each
/// line is handed to exactly one invocation.
pub fn for_each_line<T, F>(target: &mut DenseLines<T>, parallel: bool, f: F)
        where T: Element, F: Fn(usize, &mut [T]) + Sync + Send {
    if parallel {
        target.lines.par_iter_mut().enumerate().for_each(|(major, line)| f(major, line));
    } else {
        for (major, line) in target.lines.iter_mut().enumerate() {
            f(major, line);
        }
    }
}

/// Element-wise evaluation kernel. The operands are locked once, on the calling thread, before
/// the lines are handed out.
pub fn kernel<E: MatrixExpr>(expr: &E, target: &mut DenseLines<E::Elem>, mode: AssignMode,
        parallel: bool) {
    let order = target.order();
    let reader = expr.reader();
    let reader = &reader;
    for_each_line(target, parallel, |major, line| {
        for (minor, slot) in line.iter_mut().enumerate() {
            let (i, j) = order.coordinates(major, minor);
            *slot = mode.combine(*slot, reader.get(i, j));
        }
    });
}

/// Writes a row-major `values` buffer with the expression's shape into the target.
pub fn combine_row_major<T: Element>(values: &[T], target: &mut DenseLines<T>, mode: AssignMode,
        parallel: bool) {
    let (order, columns) = (target.order(), target.columns());
    for_each_line(target, parallel, |major, line| {
        for (minor, slot) in line.iter_mut().enumerate() {
            let (i, j) = order.coordinates(major, minor);
            *slot = mode.combine(*slot, values[i * columns + j]);
        }
    });
}

pub fn vector_kernel<V: VectorExpr>(expr: &V, target: &mut [V::Elem], mode: AssignMode,
        parallel: bool) {
    let reader = expr.reader();
    let reader = &reader;
    if parallel {
        target.par_iter_mut().enumerate().for_each(|(i, slot)| {
            *slot = mode.combine(*slot, reader.get(i));
        });
    } else {
        for (i, slot) in target.iter_mut().enumerate() {
            *slot = mode.combine(*slot, reader.get(i));
        }
    }
}

pub fn combine_slice<T: Element>(values: &[T], target: &mut [T], mode: AssignMode,
        parallel: bool) {
    debug_assert_eq!(values.len(), target.len());
    if parallel {
        target.par_iter_mut().zip(values.par_iter()).for_each(|(slot, &v)| {
            *slot = mode.combine(*slot, v);
        });
    } else {
        for (slot, &v) in target.iter_mut().zip(values.iter()) {
            *slot = mode.combine(*slot, v);
        }
    }
}

/// Containers that expressions can be assigned into.
pub trait AssignTarget {
    type Elem: Element;
    const TARGET_KIND: TargetKind;
    const TARGET_SMP: bool;
    const TARGET_RESIZABLE: bool;

    fn shape(&self) -> (usize, usize);
    fn target_key(&self) -> AliasKey;
    fn resize_to(&mut self, _rows: usize, _columns: usize) {}
    /// Hands a dense line view of the target to `f`; sparse targets expand into a dense
    /// temporary and compress the result afterwards.
    fn with_lines<F: FnOnce(&mut DenseLines<Self::Elem>)>(&mut self, f: F);
}

/// Vector containers that expressions can be assigned into.
pub trait VectorTarget {
    type Elem: Element;
    const TARGET_SMP: bool;
    const TARGET_RESIZABLE: bool;

    fn target_size(&self) -> usize;
    fn target_key(&self) -> AliasKey;
    fn resize_to(&mut self, _size: usize) {}
    fn with_slice<F: FnOnce(&mut [Self::Elem], &AliasKey)>(&mut self, f: F);
}

/// Evaluates `expr` into a fresh dense matrix in the expression's own storage order.
pub fn evaluate_dense<E: MatrixExpr>(expr: &E, parallel: bool)
        -> DynamicMatrix<E::Elem, E::Order> {
    let mut tmp = DynamicMatrix::zeros(expr.rows(), expr.columns());
    tmp.with_lines(|lines| expr.assign_to(lines, AssignMode::Assign, parallel));
    tmp
}

/// Evaluates `expr` into `target`. Shapes must already agree; a mismatch is an internal error.
pub fn dispatch<Tgt, E>(target: &mut Tgt, expr: &E, mode: AssignMode, config: &Config)
        where Tgt: AssignTarget, E: MatrixExpr<Elem = Tgt::Elem> {
    let (rows, columns) = target.shape();
    debug_assert_eq!(rows, expr.rows(), "Invalid number of rows");
    debug_assert_eq!(columns, expr.columns(), "Invalid number of columns");

    let key = target.target_key();
    let facts = Facts {
        target: Tgt::TARGET_KIND,
        verdict: alias::analyze(&key, expr),
        concurrency: config.concurrency,
        target_smp: Tgt::TARGET_SMP,
        expr_smp: E::SMP_ASSIGNABLE,
        elements: rows * columns,
        smp_threshold: config.smp_threshold,
    };
    let plan = plan(&facts);
    debug!("{:?} into {}x{} {:?} target: {:?}, {:?}", mode, rows, columns, facts.target,
        facts.verdict, plan);
    if config.concurrency == Concurrency::Smp && !plan.parallel && !(facts.target_smp
            && facts.expr_smp) {
        trace!("operands not SMP assignable, assigning serially");
    }

    match plan.route {
        Route::Direct | Route::SparseTemporary => {
            target.with_lines(|lines| expr.assign_to(lines, mode, plan.parallel));
        }
        Route::Temporary => {
            let tmp = evaluate_dense(expr, plan.parallel);
            target.with_lines(|lines| tmp.assign_to(lines, mode, plan.parallel));
        }
    }
}

/// Checked entry point behind the containers' `assign`, `add_assign_expr` and
/// `sub_assign_expr`: resizes resizable targets on plain assignment and reports any other shape
/// mismatch as an error.
pub fn assign_checked<Tgt, E>(target: &mut Tgt, expr: &E, mode: AssignMode, config: &Config)
        -> Result<()> where Tgt: AssignTarget, E: MatrixExpr<Elem = Tgt::Elem> {
    let (rows, columns) = target.shape();
    if (rows, columns) != (expr.rows(), expr.columns()) {
        if mode == AssignMode::Assign && Tgt::TARGET_RESIZABLE {
            target.resize_to(expr.rows(), expr.columns());
        } else {
            return Err(Error::from_kind(ErrorKind::DimensionMismatch(format!(
                "Matrix sizes do not match: target is {}x{}, expression is {}x{}",
                rows, columns, expr.rows(), expr.columns()))));
        }
    }
    dispatch(target, expr, mode, config);
    Ok(())
}

pub fn dispatch_vector<Tgt, V>(target: &mut Tgt, expr: &V, mode: AssignMode, config: &Config)
        where Tgt: VectorTarget, V: VectorExpr<Elem = Tgt::Elem> {
    let size = target.target_size();
    debug_assert_eq!(size, expr.size(), "Invalid vector sizes");

    let key = target.target_key();
    let facts = Facts {
        target: TargetKind::Dense,
        verdict: alias::analyze_vector(&key, expr),
        concurrency: config.concurrency,
        target_smp: Tgt::TARGET_SMP,
        expr_smp: V::SMP_ASSIGNABLE,
        elements: size,
        smp_threshold: config.smp_threshold,
    };
    let plan = plan(&facts);
    debug!("{:?} into vector of size {}: {:?}, {:?}", mode, size, facts.verdict, plan);

    match plan.route {
        Route::Temporary => {
            let mut tmp = vec![V::Elem::zero(); size];
            let tmp_key = AliasKey::new(tmp.as_ptr() as usize, size, 1, key.order);
            expr.assign_to(&mut tmp, &tmp_key, AssignMode::Assign, plan.parallel);
            target.with_slice(|slice, _| combine_slice(&tmp, slice, mode, plan.parallel));
        }
        _ => {
            target.with_slice(|slice, key| expr.assign_to(slice, key, mode, plan.parallel));
        }
    }
}

pub fn assign_vector_checked<Tgt, V>(target: &mut Tgt, expr: &V, mode: AssignMode,
        config: &Config) -> Result<()> where Tgt: VectorTarget, V: VectorExpr<Elem = Tgt::Elem> {
    let size = target.target_size();
    if size != expr.size() {
        if mode == AssignMode::Assign && Tgt::TARGET_RESIZABLE {
            target.resize_to(expr.size());
        } else {
            return Err(Error::from_kind(ErrorKind::DimensionMismatch(format!(
                "Vector sizes do not match: target has {} elements, expression has {}",
                size, expr.size()))));
        }
    }
    dispatch_vector(target, expr, mode, config);
    Ok(())
}
